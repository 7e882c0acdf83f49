//! # client
//!
//! Chat session engine for the single-room chat client.
//!
//! The engine owns the websocket lifecycle, reconciles optimistic local
//! messages with relay broadcasts, and tracks unread messages while the reader
//! is scrolled away from the live edge. Rendering is left to the caller: it
//! feeds commands and transport events in and renders the returned
//! [`net::session::SessionUpdate`]s.

pub mod config;
pub mod net;
pub mod state;

pub use net::session::{ChatSession, SessionUpdate};
pub use state::chat::ChatMessage;
pub use state::connection::ConnectionStatus;
pub use state::viewport::{ScrollPosition, ViewportState};
