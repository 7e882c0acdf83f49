//! Connection status state machine.
//!
//! ```text
//! connecting --Opened--> connected
//! connecting --Closed/Failed--> disconnected
//! connected  --Closed/Failed--> disconnected
//! ```
//!
//! `disconnected` is a steady state: nothing in the machine leads back out of
//! it. Resuming requires a new session, which starts a new machine.

#[cfg(test)]
#[path = "connection_test.rs"]
mod connection_test;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Websocket connection status exposed to the presentation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Handshake in flight. Initial state of every session.
    #[default]
    Connecting,
    /// Socket is open and writable.
    Connected,
    /// Socket closed, failed, or torn down.
    Disconnected,
}

/// Lifecycle signal reported by the transport or by teardown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionEvent {
    Opened,
    Closed,
    Failed,
}

impl ConnectionStatus {
    /// Next status after `event`.
    #[must_use]
    pub fn apply(self, event: ConnectionEvent) -> Self {
        match (self, event) {
            (Self::Connecting | Self::Connected, ConnectionEvent::Opened) => Self::Connected,
            // A late open after teardown must not resurrect the session.
            (Self::Disconnected, ConnectionEvent::Opened) => Self::Disconnected,
            (_, ConnectionEvent::Closed | ConnectionEvent::Failed) => Self::Disconnected,
        }
    }

    #[must_use]
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
