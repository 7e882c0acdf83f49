//! Chat session engine.
//!
//! DESIGN
//! ======
//! `ChatSession` is the command surface the presentation layer talks to. It
//! owns the message log and viewport state, delegates the socket to the
//! [`ConnectionController`], and reports every observable change as a
//! [`SessionUpdate`] so the caller can render incrementally.
//!
//! LIFECYCLE
//! =========
//! 1. `start` reads the identity; no identity means no session
//! 2. Transport events are fed in arrival order via `handle_socket_event`
//!    (tagged, from a shared connector channel) or `handle_transport_event`
//! 3. `send` appends an optimistic local copy, then forwards if connected
//! 4. `leave` clears the identity and closes the transport exactly once
//!
//! Dropping a session closes the transport as well (navigating away), but
//! keeps the identity.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use frames::ClientFrame;
use tracing::{debug, warn};

use crate::net::connection::ConnectionController;
use crate::net::normalize::{Inbound, normalize_inbound};
use crate::net::transport::{Connector, SocketEvent, Transport, TransportEvent};
use crate::state::chat::{ChatMessage, MessageLog};
use crate::state::connection::ConnectionStatus;
use crate::state::identity::IdentityStore;
use crate::state::viewport::{self, ScrollPosition, ViewportEffect, ViewportEvent, ViewportState};

/// Observable change produced by a command or transport event.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionUpdate {
    StatusChanged(ConnectionStatus),
    MessageAppended(ChatMessage),
    /// Scroll the message list to its tail.
    ScrollToTail,
    ViewportChanged(ViewportState),
}

pub struct ChatSession<T: Transport> {
    username: String,
    identity: Box<dyn IdentityStore>,
    connection: ConnectionController<T>,
    messages: MessageLog,
    viewport: ViewportState,
    ended: bool,
}

impl<T: Transport> ChatSession<T> {
    /// Start a session for the stored identity and begin connecting.
    ///
    /// Returns `None` when no identity is stored; routing back to the name
    /// prompt is the caller's job.
    pub fn start<C>(identity: Box<dyn IdentityStore>, connector: &mut C, endpoint: &str) -> Option<Self>
    where
        C: Connector<Handle = T>,
    {
        let username = match identity.get() {
            Ok(Some(username)) => username,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "chat: identity unreadable, not starting");
                return None;
            }
        };

        let connection = ConnectionController::open(connector, &username, endpoint);
        Some(Self {
            username,
            identity,
            connection,
            messages: MessageLog::new(),
            viewport: ViewportState::default(),
            ended: false,
        })
    }

    // =========================================================================
    // OBSERVABLES
    // =========================================================================

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.connection.status()
    }

    #[must_use]
    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    #[must_use]
    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    /// True once `leave` has run.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    // =========================================================================
    // COMMANDS
    // =========================================================================

    /// Send a chat line.
    ///
    /// Blank input is ignored. Otherwise the line is appended locally right
    /// away and forwarded only if the socket is connected; nothing is queued.
    pub fn send(&mut self, text: &str) -> Vec<SessionUpdate> {
        if self.ended {
            return Vec::new();
        }
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let updates = self.append(ChatMessage::new(self.username.clone(), text, frames::now_ms()));
        let frame = ClientFrame::message(self.username.clone(), text);
        if !self.connection.send_frame(&frame) {
            debug!(status = %self.connection.status(), "chat: message shown locally only");
        }
        updates
    }

    /// End the session: forget the identity and close the socket.
    pub fn leave(&mut self) -> Vec<SessionUpdate> {
        if self.ended {
            return Vec::new();
        }
        self.ended = true;
        if let Err(e) = self.identity.clear() {
            warn!(error = %e, "chat: failed to clear identity");
        }
        self.connection.close().map(SessionUpdate::StatusChanged).into_iter().collect()
    }

    pub fn jump_to_live_edge(&mut self) -> Vec<SessionUpdate> {
        self.apply_viewport(ViewportEvent::JumpToLiveEdge)
    }

    pub fn report_scroll(&mut self, position: ScrollPosition) -> Vec<SessionUpdate> {
        self.apply_viewport(ViewportEvent::Scrolled(position))
    }

    // =========================================================================
    // TRANSPORT EVENTS
    // =========================================================================

    /// Process one tagged event from a connector channel. Events from any
    /// handle other than the one this session owns are dropped.
    pub fn handle_socket_event(&mut self, event: SocketEvent) -> Vec<SessionUpdate> {
        if !self.connection.owns(event.handle) {
            debug!(handle = event.handle.0, "chat: dropped event from stale socket");
            return Vec::new();
        }
        self.handle_transport_event(event.event)
    }

    /// Process one transport event from the handle this session owns.
    /// Events arriving after `leave` are ignored.
    pub fn handle_transport_event(&mut self, event: TransportEvent) -> Vec<SessionUpdate> {
        if self.ended {
            return Vec::new();
        }
        match event {
            TransportEvent::Message(raw) => match normalize_inbound(&raw, &self.username, frames::now_ms()) {
                Inbound::Accepted(message) => self.append(message),
                Inbound::SelfEcho => {
                    debug!("chat: dropped self-echo");
                    Vec::new()
                }
            },
            lifecycle => self
                .connection
                .handle_event(&lifecycle)
                .map(SessionUpdate::StatusChanged)
                .into_iter()
                .collect(),
        }
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn append(&mut self, message: ChatMessage) -> Vec<SessionUpdate> {
        let mut updates = vec![SessionUpdate::MessageAppended(self.messages.push(message).clone())];
        updates.extend(self.apply_viewport(ViewportEvent::MessageAppended));
        updates
    }

    fn apply_viewport(&mut self, event: ViewportEvent) -> Vec<SessionUpdate> {
        let (next, effect) = viewport::reduce(self.viewport, event);
        let mut updates = Vec::new();
        if next != self.viewport {
            self.viewport = next;
            updates.push(SessionUpdate::ViewportChanged(next));
        }
        if effect == Some(ViewportEffect::ScrollToTail) {
            updates.push(SessionUpdate::ScrollToTail);
        }
        updates
    }
}
