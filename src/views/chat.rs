use crate::chat::{
    ChatState, Composer, create_local_thread, drive_exchange, load_threads, select_thread,
    start_exchange,
};
use crate::types::NEW_THREAD_TITLE;
use crate::ui::{AppContext, Screen};
use crate::views::shared::initials;
use crate::views::{ComposerBar, MessageBubble, Sidebar};
use dioxus::prelude::*;

/// Chat page. Owns the conversation state and is the only view that
/// reaches the chat API.
#[component]
pub fn ChatView(app: AppContext) -> Element {
    let mut chat = use_signal(ChatState::new);
    let mut composer = use_signal(Composer::new);

    use_hook(move || {
        spawn(async move {
            let client = app.client();
            let mut store = chat;
            if let Err(err) = load_threads(&client, &mut store).await {
                tracing::error!(%err, "failed to load threads");
                app.report_chat_error("Failed to load conversations", &err);
            }
        })
    });

    let on_select = move |thread_id: String| {
        spawn(async move {
            let client = app.client();
            let mut store = chat;
            if let Err(err) = select_thread(&client, &mut store, &thread_id).await {
                tracing::error!(%err, %thread_id, "failed to open thread");
                app.report_chat_error("Failed to load conversation", &err);
            }
        });
    };

    let on_new = move |_| {
        let mut store = chat;
        create_local_thread(&mut store);
    };

    let on_rename = move |(thread_id, title): (String, String)| {
        chat.with_mut(|state| state.rename_thread(&thread_id, &title));
    };

    let on_delete = move |thread_id: String| {
        chat.with_mut(|state| state.remove_thread(&thread_id));
    };

    let on_send = move |text: String| {
        let mut store = chat;
        let exchange = match start_exchange(&mut store, &text) {
            Ok(exchange) => exchange,
            Err(err) => {
                composer.with_mut(|c| c.restore(&text));
                app.report_chat_error("Cannot send message", &err);
                return;
            }
        };
        spawn(async move {
            let client = app.client();
            let mut store = chat;
            if let Err(err) = drive_exchange(&client, &mut store, exchange).await {
                composer.with_mut(|c| c.restore(&text));
                app.report_chat_error("Error", &err);
            }
        });
    };

    let state = chat.read();
    let threads = state.threads().to_vec();
    let sidebar_open = state.sidebar_open();
    let in_flight = state.is_sending();
    let title = state
        .active_thread()
        .map(|thread| thread.title.clone())
        .unwrap_or_else(|| NEW_THREAD_TITLE.to_string());
    let messages = state
        .active_thread()
        .map(|thread| thread.messages.clone())
        .unwrap_or_default();
    let streaming_id = state.streaming_id().map(str::to_string);
    drop(state);

    let user_badge = app
        .session
        .read()
        .user()
        .map(|user| initials(&user.name));

    rsx! {
        div { class: "chat-page",
            Sidebar {
                threads,
                open: sidebar_open,
                on_new,
                on_select,
                on_rename,
                on_delete,
                on_close: move |_| chat.with_mut(|state| state.set_sidebar_open(false)),
            }
            div { class: "chat-main",
                div { class: "chat-header",
                    div { class: "hstack",
                        button {
                            class: "action-btn menu-toggle",
                            r#type: "button",
                            title: "Conversations",
                            onclick: move |_| chat.with_mut(|state| state.set_sidebar_open(true)),
                            "☰"
                        }
                        button {
                            class: "btn",
                            r#type: "button",
                            onclick: move |_| app.navigate(Screen::Dashboard),
                            "Dashboard"
                        }
                        div { class: "chat-title",
                            h1 { "{title}" }
                            p { class: "text-muted", "AI Assistant" }
                        }
                    }
                    div { class: "hstack",
                        if let Some(badge) = user_badge {
                            span { class: "avatar user", "{badge}" }
                        }
                        button {
                            class: "btn",
                            r#type: "button",
                            title: "Log out",
                            onclick: move |_| app.sign_out(),
                            "Log out"
                        }
                    }
                }
                div { class: "chat-wrap",
                    div { id: "chat-list", class: "chat-list",
                        if messages.is_empty() {
                            EmptyConversation {}
                        }
                        for message in messages.iter().cloned() {
                            MessageBubble {
                                key: "{message.id}",
                                streaming: streaming_id.as_deref() == Some(message.id.as_str()),
                                message: message.clone(),
                            }
                        }
                    }
                }
                ComposerBar { composer, in_flight, on_send }
            }
        }
    }
}

#[component]
fn EmptyConversation() -> Element {
    rsx! {
        div { class: "empty-state",
            div { class: "avatar assistant large", "AI" }
            h2 { "Start a conversation" }
            p { class: "text-muted", "I'm here to help! Ask me anything or start with a simple \"Hello\"" }
        }
    }
}
