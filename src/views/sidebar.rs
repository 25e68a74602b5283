use crate::types::Thread;
use dioxus::events::Key;
use dioxus::prelude::*;

const PREVIEW_CHARS: usize = 60;

fn preview(text: &str) -> String {
    let mut short: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        short.push('…');
    }
    short
}

fn thread_class(active: bool) -> &'static str {
    if active { "thread-item active" } else { "thread-item" }
}

/// Thread list. Emits intents only; the chat page applies them.
#[component]
pub fn Sidebar(
    threads: Vec<Thread>,
    open: bool,
    on_new: EventHandler<()>,
    on_select: EventHandler<String>,
    on_rename: EventHandler<(String, String)>,
    on_delete: EventHandler<String>,
    on_close: EventHandler<()>,
) -> Element {
    let mut editing = use_signal(|| Option::<String>::None);
    let mut draft_title = use_signal(String::new);

    let mut commit_rename = move |id: String| {
        on_rename.call((id, draft_title()));
        editing.set(None);
    };

    let class = if open { "sidebar open" } else { "sidebar" };

    rsx! {
        if open {
            div { class: "sidebar-backdrop", onclick: move |_| on_close.call(()) }
        }
        aside { class: "{class}",
            div { class: "sidebar-header",
                button {
                    class: "btn btn-primary new-chat",
                    r#type: "button",
                    onclick: move |_| on_new.call(()),
                    "+ New chat"
                }
            }
            if threads.is_empty() {
                p { class: "text-muted sidebar-empty", "No conversations yet" }
            }
            ul { class: "thread-list",
                for thread in threads.iter().cloned() {
                    li {
                        key: "{thread.id}",
                        class: thread_class(thread.is_active),
                        if editing().as_deref() == Some(thread.id.as_str()) {
                            input {
                                class: "thread-rename",
                                value: "{draft_title}",
                                autofocus: true,
                                oninput: move |ev| draft_title.set(ev.value()),
                                onkeydown: {
                                    let id = thread.id.clone();
                                    move |ev: KeyboardEvent| {
                                        if ev.key() == Key::Enter {
                                            ev.prevent_default();
                                            commit_rename(id.clone());
                                        } else if ev.key() == Key::Escape {
                                            editing.set(None);
                                        }
                                    }
                                },
                                onblur: {
                                    let id = thread.id.clone();
                                    move |_| commit_rename(id.clone())
                                },
                            }
                        } else {
                            button {
                                class: "thread-select",
                                r#type: "button",
                                onclick: {
                                    let id = thread.id.clone();
                                    move |_| on_select.call(id.clone())
                                },
                                div { class: "thread-title", "{thread.title}" }
                                if !thread.last_message.is_empty() {
                                    div { class: "thread-preview", "{preview(&thread.last_message)}" }
                                }
                                div { class: "thread-timestamp", "{thread.timestamp}" }
                            }
                            div { class: "thread-actions",
                                button {
                                    class: "action-btn",
                                    r#type: "button",
                                    title: "Rename",
                                    onclick: {
                                        let id = thread.id.clone();
                                        let title = thread.title.clone();
                                        move |_| {
                                            draft_title.set(title.clone());
                                            editing.set(Some(id.clone()));
                                        }
                                    },
                                    "Rename"
                                }
                                button {
                                    class: "action-btn danger",
                                    r#type: "button",
                                    title: "Delete",
                                    onclick: {
                                        let id = thread.id.clone();
                                        move |_| on_delete.call(id.clone())
                                    },
                                    "Delete"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
