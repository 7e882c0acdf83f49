//! Connection lifecycle controller.
//!
//! DESIGN
//! ======
//! The controller is the only owner of the transport handle. It holds at most
//! one handle, drives [`ConnectionStatus`] from transport events, and is the
//! single path for outbound frames. Closing is unconditional and idempotent:
//! the handle is taken out of the controller before `close()` is called, so it
//! can only ever be closed once.
//!
//! ERROR HANDLING
//! ==============
//! Open failures and transport errors become `Disconnected`. Outbound sends are
//! best effort; failures are logged and swallowed.

#[cfg(test)]
#[path = "connection_test.rs"]
mod connection_test;

use frames::ClientFrame;
use tracing::{debug, info, warn};

use crate::net::transport::{Connector, HandleId, Transport, TransportEvent};
use crate::state::connection::{ConnectionEvent, ConnectionStatus};

/// Owner of the single live transport handle for one session.
pub struct ConnectionController<T: Transport> {
    username: String,
    status: ConnectionStatus,
    handle: Option<T>,
}

impl<T: Transport> ConnectionController<T> {
    /// Start connecting. An endpoint the connector rejects outright leaves the
    /// controller `Disconnected` with no handle.
    pub fn open<C>(connector: &mut C, username: &str, endpoint: &str) -> Self
    where
        C: Connector<Handle = T>,
    {
        match connector.open(endpoint) {
            Ok(handle) => {
                info!(%endpoint, %username, "chat: connecting");
                Self { username: username.to_owned(), status: ConnectionStatus::Connecting, handle: Some(handle) }
            }
            Err(e) => {
                warn!(%endpoint, error = %e, "chat: connect failed");
                Self { username: username.to_owned(), status: ConnectionStatus::Disconnected, handle: None }
            }
        }
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// True while a handle is owned (i.e. before teardown).
    #[must_use]
    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }

    /// True if `handle` is the live handle this controller owns. Events from
    /// any other handle (an earlier session's socket, or one already closed)
    /// are stale.
    #[must_use]
    pub fn owns(&self, handle: HandleId) -> bool {
        self.handle.as_ref().is_some_and(|h| h.id() == handle)
    }

    /// Apply a lifecycle event. Returns the new status when it changed.
    ///
    /// On `Opened` the join announcement is sent. `Message` events are not
    /// lifecycle events and are ignored here.
    pub fn handle_event(&mut self, event: &TransportEvent) -> Option<ConnectionStatus> {
        let lifecycle = match event {
            TransportEvent::Opened => ConnectionEvent::Opened,
            TransportEvent::Closed => ConnectionEvent::Closed,
            TransportEvent::Error(reason) => {
                warn!(%reason, "chat: transport error");
                ConnectionEvent::Failed
            }
            TransportEvent::Message(_) => return None,
        };

        let previous = self.status;
        self.status = previous.apply(lifecycle);
        if self.status == previous {
            return None;
        }

        info!(from = %previous, to = %self.status, "chat: status changed");
        if self.status.is_connected() {
            let join = ClientFrame::join(self.username.clone());
            self.send_frame(&join);
        }
        Some(self.status)
    }

    /// Send a frame if connected. Returns whether the frame reached the
    /// transport; failures are swallowed.
    pub fn send_frame(&mut self, frame: &ClientFrame) -> bool {
        if !self.status.is_connected() {
            debug!(status = %self.status, "chat: not connected, frame not sent");
            return false;
        }
        let Some(handle) = self.handle.as_mut() else {
            return false;
        };
        match handle.send_text(frames::encode_client_frame(frame)) {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "chat: best-effort send failed");
                false
            }
        }
    }

    /// Close and release the handle. Returns the new status when it changed.
    pub fn close(&mut self) -> Option<ConnectionStatus> {
        if let Some(mut handle) = self.handle.take() {
            handle.close();
            info!("chat: transport closed");
        }
        let previous = self.status;
        self.status = previous.apply(ConnectionEvent::Closed);
        (self.status != previous).then_some(self.status)
    }
}

impl<T: Transport> Drop for ConnectionController<T> {
    fn drop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.close();
        }
    }
}
