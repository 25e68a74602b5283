use dioxus::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastVariant {
    Info,
    Success,
    Error,
}

impl ToastVariant {
    fn class(self) -> &'static str {
        match self {
            ToastVariant::Info => "toast",
            ToastVariant::Success => "toast success",
            ToastVariant::Error => "toast destructive",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

#[component]
pub fn ToastStack(toasts: Signal<Vec<Toast>>) -> Element {
    let snapshot = toasts();
    rsx! {
        div { class: "toast-stack", role: "status",
            for toast in snapshot.into_iter() {
                div { key: "{toast.id}", class: "{toast.variant.class()}",
                    div { class: "toast-body",
                        div { class: "toast-title", "{toast.title}" }
                        if !toast.description.is_empty() {
                            div { class: "toast-description", "{toast.description}" }
                        }
                    }
                    button {
                        class: "action-btn",
                        r#type: "button",
                        title: "Dismiss",
                        onclick: move |_| toasts.with_mut(|list| list.retain(|t| t.id != toast.id)),
                        "×"
                    }
                }
            }
        }
    }
}
