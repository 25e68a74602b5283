use crate::api::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Raised by an `error` frame from the server.
    #[error("{0}")]
    Application(String),

    #[error("Start or select a conversation first")]
    NoActiveThread,

    #[error("A reply is still streaming")]
    SendInFlight,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("The response ended before a reply arrived")]
    StreamTruncated,
}

impl ChatError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ChatError::Api(err) if err.is_unauthorized())
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
