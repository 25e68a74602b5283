use crate::ui::{AppContext, Screen};
use dioxus::prelude::*;

const FEATURES: &[(&str, &str)] = &[
    (
        "Intelligent Conversations",
        "Ask questions and get streamed answers with formatted code and tables.",
    ),
    (
        "Student Records",
        "See enrolment totals and department breakdowns at a glance.",
    ),
    (
        "Secure Sessions",
        "Every request carries your own token; sign out ends it everywhere.",
    ),
];

#[component]
pub fn HomeView(app: AppContext) -> Element {
    let signed_in = app.session.read().is_authenticated();
    let greeting = app
        .session
        .read()
        .user()
        .map(|user| format!("Welcome back, {}", user.name));

    rsx! {
        div { class: "main-container home",
            section { class: "hero",
                h1 { class: "hero-title", "Your AI study assistant" }
                p { class: "text-muted",
                    "Chat with an assistant that knows your student records, and keep every conversation in one place."
                }
                if let Some(greeting) = greeting {
                    p { class: "hero-greeting", "{greeting}" }
                }
                div { class: "hstack hero-actions",
                    if signed_in {
                        button {
                            class: "btn btn-primary",
                            r#type: "button",
                            onclick: move |_| app.navigate(Screen::Chat),
                            "Open chat"
                        }
                        button {
                            class: "btn",
                            r#type: "button",
                            onclick: move |_| app.navigate(Screen::Dashboard),
                            "Dashboard"
                        }
                    } else {
                        button {
                            class: "btn btn-primary",
                            r#type: "button",
                            onclick: move |_| app.navigate(Screen::Signup),
                            "Get started"
                        }
                        button {
                            class: "btn",
                            r#type: "button",
                            onclick: move |_| app.navigate(Screen::Login),
                            "Log in"
                        }
                    }
                }
            }
            section { class: "feature-grid",
                for (title, body) in FEATURES.iter() {
                    div { class: "card feature",
                        h3 { class: "section-title", "{title}" }
                        p { class: "text-muted", "{body}" }
                    }
                }
            }
        }
    }
}
