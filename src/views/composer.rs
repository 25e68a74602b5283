use crate::chat::{Composer, KeyIntent, key_intent};
use dioxus::events::Key;
use dioxus::prelude::*;

/// Message input. Emits the trimmed text through `on_send`; the parent
/// decides whether the send goes ahead.
#[component]
pub fn ComposerBar(
    composer: Signal<Composer>,
    in_flight: bool,
    on_send: EventHandler<String>,
) -> Element {
    let mut composer = composer;
    let mut submit = move || {
        if let Some(text) = composer.with_mut(|c| c.take_submission(in_flight)) {
            on_send.call(text);
        }
    };
    let draft = composer.read().draft().to_string();
    let can_submit = composer.read().can_submit(in_flight);

    rsx! {
        form { class: "composer no-divider",
            onsubmit: move |ev: FormEvent| ev.prevent_default(),
            div { class: "composer-inner",
                div { class: "hstack", style: "gap: 0.5rem; width: 100%; align-items: flex-end;",
                    textarea {
                        rows: "1",
                        placeholder: "Type your message…",
                        value: "{draft}",
                        oninput: move |ev| composer.with_mut(|c| c.set_draft(ev.value())),
                        onkeydown: move |ev| {
                            let intent = key_intent(ev.key() == Key::Enter, ev.modifiers().shift());
                            if intent == KeyIntent::Submit {
                                ev.prevent_default();
                                submit();
                            }
                        },
                        autofocus: true,
                    }
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        disabled: !can_submit,
                        onclick: move |_| submit(),
                        if in_flight { "Sending…" } else { "Send" }
                    }
                }
            }
        }
    }
}
