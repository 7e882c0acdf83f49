//! Inbound payload normalization.
//!
//! DESIGN
//! ======
//! Relay payloads are untrusted. Every inbound frame becomes exactly one
//! canonical [`ChatMessage`] unless it is our own message echoed back by the
//! relay, in which case it is dropped: the optimistic local copy already
//! represents it.
//!
//! Field defaults for JSON objects:
//! - `user`: `"unknown"`
//! - `text`: the whole payload re-serialized
//! - `time`: receive time
//!
//! Anything that is not a JSON object is rendered verbatim as a `"server"`
//! line.

#[cfg(test)]
#[path = "normalize_test.rs"]
mod normalize_test;

use serde_json::{Map, Value};

use crate::state::chat::ChatMessage;

pub const FALLBACK_USER: &str = "server";
pub const UNKNOWN_USER: &str = "unknown";

/// Outcome of normalizing one inbound payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    Accepted(ChatMessage),
    /// The payload's `user` equals our own username.
    SelfEcho,
}

/// Normalize one raw inbound frame received at `now_ms`.
#[must_use]
pub fn normalize_inbound(raw: &str, own_username: &str, now_ms: i64) -> Inbound {
    let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(raw) else {
        return Inbound::Accepted(ChatMessage::new(FALLBACK_USER, raw, now_ms));
    };

    // Strict equality on the raw field; no id or timestamp correlation.
    if fields.get("user").and_then(Value::as_str) == Some(own_username) {
        return Inbound::SelfEcho;
    }

    let user = field_text(&fields, "user").unwrap_or_else(|| UNKNOWN_USER.to_owned());
    let text = field_text(&fields, "text").unwrap_or_else(|| Value::Object(fields.clone()).to_string());
    let time = field_time(&fields).unwrap_or(now_ms);

    Inbound::Accepted(ChatMessage::new(user, text, time))
}

/// String fields are taken as-is; other non-null values are stringified.
fn field_text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Numeric timestamps only; fractional milliseconds are truncated.
#[allow(clippy::cast_possible_truncation)]
fn field_time(fields: &Map<String, Value>) -> Option<i64> {
    let value = fields.get("time")?;
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}
