use crate::types::{Message, Role};
use crate::views::shared::markdown_to_html;
use dioxus::prelude::*;

const PENDING_CUE: &str = "Thinking…";

fn bubble_class(role: Role, streaming: bool) -> String {
    let mut class = format!("bubble {}", role.css_class());
    if streaming && role == Role::Assistant {
        class.push_str(" pulse");
    }
    class
}

fn shows_pending_cue(message: &Message, streaming: bool) -> bool {
    streaming && message.role == Role::Assistant && message.content.is_empty()
}

#[component]
pub fn MessageBubble(message: Message, streaming: bool) -> Element {
    let class = bubble_class(message.role, streaming);
    let row_class = format!("message-row {}", message.role.css_class());
    let meta_class = match message.role {
        Role::User => "message-meta align-end",
        Role::Assistant => "message-meta align-start",
    };

    rsx! {
        div { class: "{row_class}",
            if message.role == Role::Assistant {
                div { class: "avatar assistant", "AI" }
            }
            div { class: "message-stack",
                div { class: "{class}",
                    if shows_pending_cue(&message, streaming) {
                        div { class: "shimmer-line",
                            span { class: "shimmer-text", "{PENDING_CUE}" }
                        }
                    } else if message.role == Role::Assistant {
                        div { class: "md", dangerous_inner_html: markdown_to_html(&message.content) }
                    } else {
                        pre { class: "user-text", "{message.content}" }
                    }
                }
                if !message.timestamp.is_empty() {
                    div { class: "{meta_class}",
                        span { class: "message-timestamp", "{message.timestamp}" }
                    }
                }
            }
        }
    }
}
