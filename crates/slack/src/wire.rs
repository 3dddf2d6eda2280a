//! Inbound half of the live transport seam: raw Socket Mode frames to typed envelopes.

use serde::Deserialize;
use thiserror::Error;

use crate::events::{ChannelType, MessageEvent, SlackEnvelope, SlackEvent};

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("socket mode envelope is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("socket mode envelope is missing `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    envelope_id: Option<String>,
    #[serde(rename = "type")]
    envelope_type: String,
    payload: Option<RawPayload>,
}

#[derive(Debug, Deserialize)]
struct RawPayload {
    event: Option<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    subtype: Option<String>,
    channel: Option<String>,
    channel_type: Option<String>,
    #[serde(flatten)]
    body: RawMessage,
    message: Option<RawMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMessage {
    user: Option<String>,
    bot_id: Option<String>,
    #[serde(default)]
    text: String,
    ts: Option<String>,
    thread_ts: Option<String>,
}

/// Decodes a Socket Mode frame.
///
/// Only `events_api` envelopes carrying a `message` event become messages. Edits arrive as the
/// `message_changed` subtype, whose inner message keeps the original `ts`. Everything else is
/// surfaced as [`SlackEvent::Unsupported`] so it can still be acknowledged.
pub fn parse_envelope(raw: &str) -> Result<SlackEnvelope, EnvelopeError> {
    let envelope: RawEnvelope = serde_json::from_str(raw)?;
    let envelope_id = envelope.envelope_id.ok_or(EnvelopeError::MissingField("envelope_id"))?;

    if envelope.envelope_type != "events_api" {
        return Ok(SlackEnvelope {
            envelope_id,
            event: SlackEvent::Unsupported { event_type: envelope.envelope_type },
        });
    }

    let event = envelope
        .payload
        .and_then(|payload| payload.event)
        .ok_or(EnvelopeError::MissingField("payload.event"))?;

    Ok(SlackEnvelope { envelope_id, event: decode_event(event)? })
}

fn decode_event(event: RawEvent) -> Result<SlackEvent, EnvelopeError> {
    if event.event_type != "message" {
        return Ok(SlackEvent::Unsupported { event_type: event.event_type });
    }

    let channel_id = event.channel.ok_or(EnvelopeError::MissingField("event.channel"))?;
    let channel_type = event.channel_type.as_deref().map(ChannelType::parse).unwrap_or_default();

    match event.subtype.as_deref() {
        None | Some("bot_message") | Some("thread_broadcast") => {
            Ok(SlackEvent::Message(message_event(channel_id, channel_type, event.body)?))
        }
        Some("message_changed") => {
            let inner = event.message.ok_or(EnvelopeError::MissingField("event.message"))?;
            Ok(SlackEvent::MessageChanged(message_event(channel_id, channel_type, inner)?))
        }
        Some(other) => Ok(SlackEvent::Unsupported { event_type: format!("message.{other}") }),
    }
}

fn message_event(
    channel_id: String,
    channel_type: ChannelType,
    message: RawMessage,
) -> Result<MessageEvent, EnvelopeError> {
    let ts = message.ts.ok_or(EnvelopeError::MissingField("ts"))?;
    if message.user.is_none() && message.bot_id.is_none() {
        return Err(EnvelopeError::MissingField("user"));
    }

    Ok(MessageEvent {
        channel_id,
        channel_type,
        user_id: message.user,
        bot_id: message.bot_id,
        text: message.text,
        ts,
        thread_ts: message.thread_ts,
    })
}
