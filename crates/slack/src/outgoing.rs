//! Outbound half of the live transport seam: answers to `chat.postMessage` bodies.

use sentinel_core::{Answer, IncomingMessage};
use serde::Serialize;

/// A `chat.postMessage` request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    pub channel: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
}

impl OutgoingMessage {
    /// Replies stay in the thread they were asked in. `InThread` answers to top-level channel
    /// messages start a thread on the asking message; direct messages are never threaded.
    pub fn render(message: &IncomingMessage, answer: &Answer) -> Self {
        let thread_ts = match (&message.thread_timestamp, answer.in_thread() && !message.direct) {
            (Some(thread), _) => Some(thread.clone()),
            (None, true) => Some(message.timestamp.clone()),
            (None, false) => None,
        };

        Self { channel: message.channel_id.clone(), text: answer.text.clone(), thread_ts }
    }

    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!(self)
    }
}
