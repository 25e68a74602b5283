//! Incremental decoder for the `/chat/stream` response body.
//!
//! The body is a sequence of lines, each `data: <json>`, where the JSON
//! carries a `type` discriminator. Bytes arrive in arbitrary chunks; only
//! complete lines are decoded, and a trailing partial line waits for the
//! next chunk.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Start { thread_id: String },
    Delta { content: String },
    Done { full_response: String },
    Error { error: String },
}

#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns every event whose line is now complete.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = decode_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Bytes of an unterminated trailing line.
    pub fn remainder(&self) -> &[u8] {
        &self.buffer
    }
}

/// Decodes one line. Blank lines, non-`data:` lines and malformed payloads
/// yield `None`; the malformed ones are logged.
pub fn decode_line(raw: &[u8]) -> Option<StreamEvent> {
    let text = match std::str::from_utf8(raw) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(%err, "skipping stream line with invalid UTF-8");
            return None;
        }
    };

    let line = text.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() {
        return None;
    }

    let Some(rest) = line.strip_prefix("data:") else {
        tracing::debug!(line, "ignoring non-data stream line");
        return None;
    };
    let payload = rest.trim_start();

    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => {
            tracing::debug!(?event, "stream frame");
            Some(event)
        }
        Err(err) => {
            tracing::warn!(%err, payload, "skipping malformed stream frame");
            None
        }
    }
}
