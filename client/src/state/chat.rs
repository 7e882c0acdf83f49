//! Canonical chat messages and the append-only message log.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single chat message, identical in shape for local and relayed lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Locally generated identity. Never read from the wire.
    pub id: Uuid,
    pub user: String,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub time: i64,
}

impl ChatMessage {
    /// Build a message with a fresh local id.
    #[must_use]
    pub fn new(user: impl Into<String>, text: impl Into<String>, time: i64) -> Self {
        Self { id: Uuid::new_v4(), user: user.into(), text: text.into(), time }
    }
}

/// Ordered message sequence for one session.
///
/// Insertion order is display order. Entries are never removed, reordered,
/// or edited.
#[derive(Clone, Debug, Default)]
pub struct MessageLog {
    messages: Vec<ChatMessage>,
}

impl MessageLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the tail and return a reference to it.
    pub fn push(&mut self, message: ChatMessage) -> &ChatMessage {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatMessage> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a MessageLog {
    type Item = &'a ChatMessage;
    type IntoIter = std::slice::Iter<'a, ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
