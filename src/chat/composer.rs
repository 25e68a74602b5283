//! Draft handling for the message input.

/// What a key press in the composer should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyIntent {
    Submit,
    NewLine,
    Other,
}

/// Enter submits; Shift+Enter falls through to the textarea as a newline.
pub fn key_intent(is_enter: bool, shift: bool) -> KeyIntent {
    match (is_enter, shift) {
        (true, false) => KeyIntent::Submit,
        (true, true) => KeyIntent::NewLine,
        _ => KeyIntent::Other,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Composer {
    draft: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn can_submit(&self, in_flight: bool) -> bool {
        !in_flight && !self.draft.trim().is_empty()
    }

    /// Takes the trimmed draft, leaving the input empty. Returns `None` and
    /// keeps the draft when nothing may be sent.
    pub fn take_submission(&mut self, in_flight: bool) -> Option<String> {
        if !self.can_submit(in_flight) {
            return None;
        }
        let text = self.draft.trim().to_string();
        self.draft.clear();
        Some(text)
    }

    /// Puts a failed submission back, unless the user has started typing again.
    pub fn restore(&mut self, text: &str) {
        if self.draft.trim().is_empty() {
            self.draft = text.to_string();
        }
    }
}
