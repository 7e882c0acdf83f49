//! Transport seam between the engine and a concrete socket.
//!
//! The engine never awaits the transport. A [`Connector`] hands back a handle
//! immediately; lifecycle and inbound data arrive later as [`TransportEvent`]s
//! that the driver feeds into the session in arrival order.
//!
//! One connector can outlive many handles, so events it reports on a shared
//! channel are tagged with the [`HandleId`] of the socket that produced them
//! ([`SocketEvent`]). A session only accepts events from the handle it owns.

/// Error returned by transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The endpoint could not be turned into a connection request.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Opening needs an async runtime and none is running.
    #[error("no async runtime available to drive the socket")]
    NoRuntime,
    /// The socket is closed or its writer is gone.
    #[error("transport closed")]
    Closed,
}

/// Push-style event emitted by a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed; the socket is writable.
    Opened,
    /// One inbound text frame.
    Message(String),
    /// The socket closed (either side).
    Closed,
    /// The socket failed.
    Error(String),
}

/// Identity of one handle returned by [`Connector::open`]. Unique per connector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandleId(pub u64);

/// A [`TransportEvent`] tagged with the handle it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SocketEvent {
    pub handle: HandleId,
    pub event: TransportEvent,
}

/// Write half of an open (or opening) socket.
pub trait Transport {
    /// The id this handle's events are tagged with.
    fn id(&self) -> HandleId;

    /// Queue one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] when the socket can no longer be
    /// written.
    fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Close the socket. Called at most once per handle by the engine.
    fn close(&mut self);
}

/// Factory for transport handles.
pub trait Connector {
    type Handle: Transport;

    /// Begin connecting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error when the connection cannot even be attempted.
    fn open(&mut self, endpoint: &str) -> Result<Self::Handle, TransportError>;
}

// =============================================================================
// TEST HELPERS
// =============================================================================
