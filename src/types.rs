use serde::{Deserialize, Serialize};

/// Prefix of thread ids minted locally before the server assigns one.
pub const TEMP_THREAD_PREFIX: &str = "temp-";

pub const NEW_THREAD_TITLE: &str = "New Conversation";
pub const UNTITLED_THREAD_TITLE: &str = "Untitled Conversation";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// The API only distinguishes `"user"`; every other role is shown as the assistant.
    pub fn from_wire(role: &str) -> Self {
        if role == "user" {
            Role::User
        } else {
            Role::Assistant
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub role: Role,
    pub timestamp: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Thread {
    pub id: String,
    pub title: String,
    pub last_message: String,
    pub timestamp: String,
    pub is_active: bool,
    pub messages: Vec<Message>,
}

impl Thread {
    pub fn is_temporary(&self) -> bool {
        is_temporary_id(&self.id)
    }
}

pub fn is_temporary_id(id: &str) -> bool {
    id.starts_with(TEMP_THREAD_PREFIX)
}

/// Lifecycle of a single send: `Idle → Sending → Streaming → {Completed | Failed}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExchangePhase {
    #[default]
    Idle,
    Sending,
    Streaming,
    Completed,
    Failed,
}

impl ExchangePhase {
    pub fn is_in_flight(self) -> bool {
        matches!(self, ExchangePhase::Sending | ExchangePhase::Streaming)
    }
}
