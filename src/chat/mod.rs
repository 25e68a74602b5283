/// Chat page logic, independent of any UI toolkit.
///
/// - `state` - threads, messages and the streaming cursor
/// - `controller` - async operations against a `ChatBackend`
/// - `composer` - message draft and key handling
mod composer;
mod controller;
mod error;
mod state;

pub use composer::{Composer, KeyIntent, key_intent};
pub use controller::{
    ChatStore, ExchangeOutcome, create_local_thread, drive_exchange, load_threads,
    refresh_threads, select_thread, send_message, start_exchange,
};
pub use error::{ChatError, ChatResult};
pub use state::{ChatState, EventOutcome, Exchange, title_from_prompt};
