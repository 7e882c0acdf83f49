//! Shared frame model and JSON codec for the chat websocket transport.
//!
//! This crate owns the wire representation used by both the relay and the
//! `client` engine. Every frame travels as a single JSON text message.
//!
//! Two directions, two shapes:
//! - [`ClientFrame`]: client → relay, tagged by `type` (`join` / `message`).
//! - [`ChatFrame`]: relay → clients, the `{user, text, time}` broadcast record.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Error returned by the decode functions.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text frame is not valid JSON for the expected shape.
    #[error("failed to decode json frame: {0}")]
    Json(#[from] serde_json::Error),
}

/// Frame sent by a client to the relay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    /// Announces the sender's display name once the socket is open.
    Join {
        #[serde(default)]
        username: String,
    },
    /// A chat line typed by the sender.
    Message {
        #[serde(default)]
        username: String,
        #[serde(default)]
        text: String,
    },
    /// Any `type` this protocol version does not know about.
    #[serde(other)]
    Unknown,
}

impl ClientFrame {
    #[must_use]
    pub fn join(username: impl Into<String>) -> Self {
        Self::Join { username: username.into() }
    }

    #[must_use]
    pub fn message(username: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Message { username: username.into(), text: text.into() }
    }
}

/// Broadcast record the relay fans out to connected clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatFrame {
    /// Display name of the author, or `"system"` for relay announcements.
    pub user: String,
    /// Message body.
    pub text: String,
    /// Milliseconds since the Unix epoch, stamped by the relay.
    pub time: i64,
}

impl ChatFrame {
    /// Build a frame stamped with the current wall-clock time.
    #[must_use]
    pub fn now(user: impl Into<String>, text: impl Into<String>) -> Self {
        Self { user: user.into(), text: text.into(), time: now_ms() }
    }
}

/// Encode a client frame as JSON text.
#[must_use]
pub fn encode_client_frame(frame: &ClientFrame) -> String {
    // Serializing plain string fields cannot fail.
    serde_json::to_string(frame).unwrap_or_default()
}

/// Decode JSON text into a client frame.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed JSON or a missing `type` tag.
pub fn decode_client_frame(text: &str) -> Result<ClientFrame, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Encode a broadcast frame as JSON text.
#[must_use]
pub fn encode_chat_frame(frame: &ChatFrame) -> String {
    serde_json::to_string(frame).unwrap_or_default()
}

/// Decode JSON text into a broadcast frame.
///
/// # Errors
///
/// Returns [`CodecError::Json`] when any of `user`, `text`, `time` is missing
/// or mistyped. Clients that must tolerate partial payloads should work on
/// `serde_json::Value` instead.
pub fn decode_chat_frame(text: &str) -> Result<ChatFrame, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
