//! In-memory thread and message state for the chat page.
//!
//! Every mutation goes through a method here so the invariants hold in one
//! place: at most one active thread, at most one streaming message, and
//! messages kept in insertion order.

use super::error::{ChatError, ChatResult};
use crate::api::{RemoteMessage, RemoteThread, StreamRequest};
use crate::format::{JUST_NOW, current_message_time, message_timestamp, thread_timestamp};
use crate::stream::StreamEvent;
use crate::types::{
    ExchangePhase, Message, NEW_THREAD_TITLE, Role, TEMP_THREAD_PREFIX, Thread,
    UNTITLED_THREAD_TITLE, is_temporary_id,
};
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

const TITLE_PREVIEW_CHARS: usize = 50;

static LOCAL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_local_seq() -> u64 {
    LOCAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

fn next_temp_thread_id() -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    format!("{TEMP_THREAD_PREFIX}{millis}-{}", next_local_seq())
}

fn next_message_id() -> String {
    format!("msg-{}", next_local_seq())
}

/// First 50 characters of the prompt, marked with `...` when cut.
pub fn title_from_prompt(prompt: &str) -> String {
    let mut title: String = prompt.chars().take(TITLE_PREVIEW_CHARS).collect();
    if prompt.chars().count() > TITLE_PREVIEW_CHARS {
        title.push_str("...");
    }
    title
}

pub fn thread_from_remote(remote: RemoteThread) -> Thread {
    Thread {
        timestamp: thread_timestamp(remote.created_at.as_deref()),
        title: remote
            .title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| UNTITLED_THREAD_TITLE.to_string()),
        last_message: remote.last_message.unwrap_or_default(),
        id: remote.id,
        is_active: false,
        messages: Vec::new(),
    }
}

pub fn message_from_remote(remote: RemoteMessage) -> Message {
    Message {
        timestamp: message_timestamp(remote.timestamp.as_deref()),
        role: Role::from_wire(&remote.role),
        id: remote.id,
        content: remote.content,
    }
}

/// One in-flight send. Events are applied to the thread and message named
/// here, whichever thread happens to be active.
#[derive(Clone, Debug, PartialEq)]
pub struct Exchange {
    thread_id: String,
    message_id: String,
    user_input: String,
    was_temporary: bool,
    accumulated: String,
}

impl Exchange {
    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// Concatenation of every delta received so far.
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// A temporary thread is sent as `null` so the server creates one.
    pub fn request(&self) -> StreamRequest {
        StreamRequest {
            user_input: self.user_input.clone(),
            thread_id: (!self.was_temporary).then(|| self.thread_id.clone()),
            stream: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    Continue,
    /// A temporary thread was renamed to its server id; the list should be refreshed.
    ThreadAssigned,
    Completed,
    Failed(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatState {
    threads: Vec<Thread>,
    active_id: Option<String>,
    streaming_id: Option<String>,
    phase: ExchangePhase,
    sidebar_open: bool,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn thread(&self, id: &str) -> Option<&Thread> {
        self.threads.iter().find(|thread| thread.id == id)
    }

    fn thread_mut(&mut self, id: &str) -> Option<&mut Thread> {
        self.threads.iter_mut().find(|thread| thread.id == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active_thread(&self) -> Option<&Thread> {
        self.active_id.as_deref().and_then(|id| self.thread(id))
    }

    pub fn streaming_id(&self) -> Option<&str> {
        self.streaming_id.as_deref()
    }

    pub fn is_streaming(&self, message_id: &str) -> bool {
        self.streaming_id.as_deref() == Some(message_id)
    }

    pub fn phase(&self) -> ExchangePhase {
        self.phase
    }

    pub fn is_sending(&self) -> bool {
        self.phase.is_in_flight()
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn set_sidebar_open(&mut self, open: bool) {
        self.sidebar_open = open;
    }

    fn activate(&mut self, id: &str) {
        for thread in &mut self.threads {
            thread.is_active = thread.id == id;
        }
        self.active_id = Some(id.to_string());
    }

    fn deactivate_all(&mut self) {
        for thread in &mut self.threads {
            thread.is_active = false;
        }
        self.active_id = None;
    }

    /// Replaces the list with a fresh server listing. The active flag
    /// survives only if the active thread is still listed.
    pub fn replace_threads(&mut self, remote: Vec<RemoteThread>) {
        self.threads = remote.into_iter().map(thread_from_remote).collect();
        match self.active_id.clone() {
            Some(id) if self.thread(&id).is_some() => self.activate(&id),
            _ => self.deactivate_all(),
        }
    }

    /// Folds a server listing into the current list without losing loaded
    /// messages. Server order wins; a local thread missing from the listing
    /// is kept while it is active, temporary, or holds messages (a listing
    /// can lag behind a thread the server just created).
    pub fn merge_thread_list(&mut self, remote: Vec<RemoteThread>) {
        let mut previous = std::mem::take(&mut self.threads);
        let mut merged = Vec::with_capacity(remote.len());

        for record in remote {
            let fresh = thread_from_remote(record);
            match previous.iter().position(|thread| thread.id == fresh.id) {
                Some(pos) => {
                    let mut existing = previous.remove(pos);
                    existing.title = fresh.title;
                    if !fresh.last_message.is_empty() {
                        existing.last_message = fresh.last_message;
                    }
                    if existing.timestamp != JUST_NOW {
                        existing.timestamp = fresh.timestamp;
                    }
                    merged.push(existing);
                }
                None => merged.push(fresh),
            }
        }

        let active_id = self.active_id.clone();
        let survivors = previous.into_iter().filter(|thread| {
            thread.is_temporary()
                || !thread.messages.is_empty()
                || active_id.as_deref() == Some(thread.id.as_str())
        });
        for (offset, thread) in survivors.enumerate() {
            merged.insert(offset.min(merged.len()), thread);
        }

        self.threads = merged;
        match active_id {
            Some(id) if self.thread(&id).is_some() => self.activate(&id),
            _ => self.deactivate_all(),
        }
    }

    /// Installs a thread's history and makes it the active thread. Returns
    /// `false` if the thread is no longer listed.
    pub fn open_thread(&mut self, id: &str, messages: Vec<RemoteMessage>) -> bool {
        let Some(thread) = self.thread_mut(id) else {
            return false;
        };
        thread.messages = messages.into_iter().map(message_from_remote).collect();
        self.activate(id);
        self.sidebar_open = false;
        true
    }

    /// Activates a thread without touching its messages. Used for local
    /// threads and for the thread a reply is still streaming into.
    pub fn focus_thread(&mut self, id: &str) -> bool {
        if self.thread(id).is_none() {
            return false;
        }
        self.activate(id);
        self.sidebar_open = false;
        true
    }

    /// Whether the streaming placeholder lives in this thread.
    pub fn is_streaming_into(&self, id: &str) -> bool {
        match (self.streaming_id.as_deref(), self.thread(id)) {
            (Some(message_id), Some(thread)) => {
                thread.messages.iter().any(|message| message.id == message_id)
            }
            _ => false,
        }
    }

    /// Prepends a placeholder thread with a temporary id and activates it.
    pub fn create_local_thread(&mut self) -> String {
        let id = next_temp_thread_id();
        self.threads.insert(
            0,
            Thread {
                id: id.clone(),
                title: NEW_THREAD_TITLE.to_string(),
                last_message: String::new(),
                timestamp: JUST_NOW.to_string(),
                is_active: true,
                messages: Vec::new(),
            },
        );
        self.activate(&id);
        self.sidebar_open = false;
        id
    }

    pub fn rename_thread(&mut self, id: &str, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        match self.thread_mut(id) {
            Some(thread) => {
                thread.title = title.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove_thread(&mut self, id: &str) -> bool {
        let before = self.threads.len();
        self.threads.retain(|thread| thread.id != id);
        if self.active_id.as_deref() == Some(id) {
            self.active_id = None;
        }
        self.threads.len() != before
    }

    /// Appends the user message and an empty assistant placeholder to the
    /// active thread and moves the streaming cursor onto the placeholder.
    pub fn begin_exchange(&mut self, text: &str) -> ChatResult<Exchange> {
        let content = text.trim();
        if content.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if self.phase.is_in_flight() {
            return Err(ChatError::SendInFlight);
        }
        let thread_id = self
            .active_thread()
            .map(|thread| thread.id.clone())
            .ok_or(ChatError::NoActiveThread)?;

        let user_message_id = next_message_id();
        let message_id = next_message_id();
        let timestamp = current_message_time();
        let thread = self
            .thread_mut(&thread_id)
            .ok_or(ChatError::NoActiveThread)?;
        thread.messages.push(Message {
            id: user_message_id,
            content: content.to_string(),
            role: Role::User,
            timestamp: timestamp.clone(),
        });
        thread.messages.push(Message {
            id: message_id.clone(),
            content: String::new(),
            role: Role::Assistant,
            timestamp,
        });
        thread.last_message = content.to_string();
        thread.timestamp = JUST_NOW.to_string();

        self.streaming_id = Some(message_id.clone());
        self.phase = ExchangePhase::Sending;

        Ok(Exchange {
            was_temporary: is_temporary_id(&thread_id),
            thread_id,
            message_id,
            user_input: content.to_string(),
            accumulated: String::new(),
        })
    }

    pub fn apply_event(&mut self, exchange: &mut Exchange, event: StreamEvent) -> EventOutcome {
        if self.phase == ExchangePhase::Sending {
            self.phase = ExchangePhase::Streaming;
        }

        match event {
            StreamEvent::Start { thread_id } => {
                if !exchange.was_temporary
                    || !is_temporary_id(&exchange.thread_id)
                    || thread_id.is_empty()
                {
                    return EventOutcome::Continue;
                }
                let old_id = std::mem::replace(&mut exchange.thread_id, thread_id.clone());
                self.adopt_server_id(&old_id, &thread_id, &exchange.user_input);
                EventOutcome::ThreadAssigned
            }
            StreamEvent::Delta { content } => {
                exchange.accumulated.push_str(&content);
                let preview = exchange.accumulated.clone();
                if let Some(thread) = self.thread_mut(&exchange.thread_id) {
                    if let Some(message) = thread
                        .messages
                        .iter_mut()
                        .find(|message| message.id == exchange.message_id)
                    {
                        message.content.push_str(&content);
                    }
                    thread.last_message = preview;
                    thread.timestamp = JUST_NOW.to_string();
                }
                EventOutcome::Continue
            }
            StreamEvent::Done { full_response } => {
                if let Some(thread) = self.thread_mut(&exchange.thread_id) {
                    if let Some(message) = thread
                        .messages
                        .iter_mut()
                        .find(|message| message.id == exchange.message_id)
                    {
                        message.content = full_response.clone();
                    }
                    thread.last_message = full_response;
                    thread.timestamp = JUST_NOW.to_string();
                }
                self.clear_cursor(&exchange.message_id);
                self.phase = ExchangePhase::Completed;
                EventOutcome::Completed
            }
            StreamEvent::Error { error } => {
                self.fail_exchange(exchange);
                EventOutcome::Failed(error)
            }
        }
    }

    /// Renames the temporary entry in place. Any entry already carrying the
    /// server id is dropped so the id stays unique.
    fn adopt_server_id(&mut self, old_id: &str, new_id: &str, prompt: &str) {
        self.threads.retain(|thread| thread.id != new_id);
        if let Some(thread) = self.thread_mut(old_id) {
            thread.id = new_id.to_string();
            thread.title = title_from_prompt(prompt);
        }
        if self.active_id.as_deref() == Some(old_id) {
            self.activate(new_id);
        }
    }

    fn clear_cursor(&mut self, message_id: &str) {
        if self.streaming_id.as_deref() == Some(message_id) {
            self.streaming_id = None;
        }
    }

    /// Drops the assistant placeholder; the user message stays.
    pub fn fail_exchange(&mut self, exchange: &Exchange) {
        if let Some(thread) = self.thread_mut(&exchange.thread_id) {
            thread
                .messages
                .retain(|message| message.id != exchange.message_id);
        }
        self.clear_cursor(&exchange.message_id);
        self.phase = ExchangePhase::Failed;
    }

    /// Handles a body that ended without `done`: keeps the streamed text if
    /// any arrived, otherwise fails the exchange.
    pub fn finish_truncated(&mut self, exchange: &Exchange) -> bool {
        if exchange.accumulated.is_empty() {
            self.fail_exchange(exchange);
            return false;
        }
        self.clear_cursor(&exchange.message_id);
        self.phase = ExchangePhase::Completed;
        true
    }
}
