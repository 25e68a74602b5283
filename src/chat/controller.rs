//! Async operations of the chat page.
//!
//! Each operation reads from a [`ChatBackend`] and writes into a
//! [`ChatStore`]. State is only touched between awaits, so the UI sees a
//! consistent [`ChatState`] on every render.

use super::error::{ChatError, ChatResult};
use super::state::{ChatState, EventOutcome, Exchange};
use crate::api::ChatBackend;
use crate::stream::{FrameDecoder, StreamEvent, decode_line};
use crate::types::is_temporary_id;
use futures::StreamExt;

/// Somewhere a [`ChatState`] lives: a plain value in tests, a signal in the UI.
pub trait ChatStore {
    fn view<R>(&self, f: impl FnOnce(&ChatState) -> R) -> R;

    fn update<R>(&mut self, f: impl FnOnce(&mut ChatState) -> R) -> R;
}

impl ChatStore for ChatState {
    fn view<R>(&self, f: impl FnOnce(&ChatState) -> R) -> R {
        f(self)
    }

    fn update<R>(&mut self, f: impl FnOnce(&mut ChatState) -> R) -> R {
        f(self)
    }
}

/// What a finished exchange produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeOutcome {
    /// Final id of the thread, after any server assignment.
    pub thread_id: String,
    pub reply: String,
    pub thread_assigned: bool,
}

/// Replaces the thread list with the server's and, when nothing is
/// selected yet, opens the first thread.
pub async fn load_threads<B, S>(backend: &B, store: &mut S) -> ChatResult<()>
where
    B: ChatBackend + ?Sized,
    S: ChatStore,
{
    let threads = backend.list_threads().await?;
    tracing::info!(count = threads.len(), "loaded threads");
    let first = store.update(|state| {
        state.replace_threads(threads);
        match state.active_id() {
            Some(_) => None,
            None => state.threads().first().map(|thread| thread.id.clone()),
        }
    });
    if let Some(thread_id) = first {
        select_thread(backend, store, &thread_id).await?;
    }
    Ok(())
}

/// Makes `thread_id` active. Server threads have their history fetched;
/// local threads and the thread currently receiving a reply keep what they
/// already hold.
pub async fn select_thread<B, S>(backend: &B, store: &mut S, thread_id: &str) -> ChatResult<()>
where
    B: ChatBackend + ?Sized,
    S: ChatStore,
{
    let keep_local = is_temporary_id(thread_id)
        || store.view(|state| state.is_streaming_into(thread_id));
    if keep_local {
        store.update(|state| state.focus_thread(thread_id));
        return Ok(());
    }

    let messages = backend.thread_messages(thread_id).await?;
    tracing::debug!(thread_id, count = messages.len(), "loaded thread history");
    if !store.update(|state| state.open_thread(thread_id, messages)) {
        tracing::warn!(thread_id, "selected thread disappeared while loading");
    }
    Ok(())
}

pub fn create_local_thread<S: ChatStore>(store: &mut S) -> String {
    let id = store.update(ChatState::create_local_thread);
    tracing::debug!(thread_id = %id, "created local thread");
    id
}

/// Merges a fresh listing into local state. Failures are logged and
/// otherwise ignored; the current list stays as it is.
pub async fn refresh_threads<B, S>(backend: &B, store: &mut S)
where
    B: ChatBackend + ?Sized,
    S: ChatStore,
{
    match backend.list_threads().await {
        Ok(threads) => store.update(|state| state.merge_thread_list(threads)),
        Err(err) => tracing::warn!(%err, "failed to refresh thread list"),
    }
}

/// Synchronous half of a send. Call it before spawning [`drive_exchange`]
/// so a second submit in the same frame is rejected.
pub fn start_exchange<S: ChatStore>(store: &mut S, text: &str) -> ChatResult<Exchange> {
    store.update(|state| state.begin_exchange(text))
}

/// Opens the stream for `exchange` and applies its events until it ends.
pub async fn drive_exchange<B, S>(
    backend: &B,
    store: &mut S,
    mut exchange: Exchange,
) -> ChatResult<ExchangeOutcome>
where
    B: ChatBackend + ?Sized,
    S: ChatStore,
{
    let request = exchange.request();
    let mut body = match backend.open_stream(&request).await {
        Ok(body) => body,
        Err(err) => {
            tracing::error!(%err, "failed to open chat stream");
            store.update(|state| state.fail_exchange(&exchange));
            return Err(err.into());
        }
    };

    let mut decoder = FrameDecoder::new();
    let mut thread_assigned = false;

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                tracing::error!(%err, "chat stream interrupted");
                store.update(|state| state.fail_exchange(&exchange));
                return Err(err.into());
            }
        };

        for event in decoder.push(&chunk) {
            match apply(store, &mut exchange, event) {
                EventOutcome::Continue => {}
                EventOutcome::ThreadAssigned => {
                    thread_assigned = true;
                    refresh_threads(backend, store).await;
                }
                EventOutcome::Completed => {
                    return Ok(finish(store, exchange, thread_assigned));
                }
                EventOutcome::Failed(message) => {
                    tracing::warn!(error = %message, "server reported a stream error");
                    return Err(ChatError::Application(message));
                }
            }
        }
    }

    // The last line may arrive without its newline.
    if !decoder.remainder().is_empty() {
        tracing::debug!(bytes = decoder.remainder().len(), "decoding unterminated tail");
        if let Some(event) = decode_line(decoder.remainder()) {
            match apply(store, &mut exchange, event) {
                EventOutcome::Completed => {
                    return Ok(finish(store, exchange, thread_assigned));
                }
                EventOutcome::Failed(message) => return Err(ChatError::Application(message)),
                EventOutcome::ThreadAssigned => {
                    thread_assigned = true;
                    refresh_threads(backend, store).await;
                }
                EventOutcome::Continue => {}
            }
        }
    }

    if store.update(|state| state.finish_truncated(&exchange)) {
        tracing::warn!(
            thread_id = exchange.thread_id(),
            "stream ended without done; keeping partial reply"
        );
        Ok(finish(store, exchange, thread_assigned))
    } else {
        tracing::warn!(thread_id = exchange.thread_id(), "stream ended before any reply");
        Err(ChatError::StreamTruncated)
    }
}

/// [`start_exchange`] followed by [`drive_exchange`].
pub async fn send_message<B, S>(
    backend: &B,
    store: &mut S,
    text: &str,
) -> ChatResult<ExchangeOutcome>
where
    B: ChatBackend + ?Sized,
    S: ChatStore,
{
    let exchange = start_exchange(store, text)?;
    drive_exchange(backend, store, exchange).await
}

fn apply<S: ChatStore>(store: &mut S, exchange: &mut Exchange, event: StreamEvent) -> EventOutcome {
    store.update(|state| state.apply_event(exchange, event))
}

fn finish<S: ChatStore>(store: &S, exchange: Exchange, thread_assigned: bool) -> ExchangeOutcome {
    let thread_id = exchange.thread_id().to_string();
    let reply = store.view(|state| {
        state
            .thread(&thread_id)
            .and_then(|thread| {
                thread
                    .messages
                    .iter()
                    .find(|message| message.id == exchange.message_id())
            })
            .map(|message| message.content.clone())
            .unwrap_or_default()
    });
    tracing::info!(%thread_id, chars = reply.chars().count(), "exchange completed");
    ExchangeOutcome {
        thread_id,
        reply,
        thread_assigned,
    }
}
