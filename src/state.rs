//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! The relay serves a single room, so the only shared state is the set of
//! connected clients and the sender half of each client's outbound channel.

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;

use std::collections::HashMap;
use std::sync::Arc;

use frames::ChatFrame;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

/// Buffered frames per client before the hub considers it too slow and drops it.
pub const CLIENT_CHANNEL_CAPACITY: usize = 256;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone, Default)]
pub struct AppState {
    /// Connected clients: `client_id` -> sender for outgoing frames.
    pub clients: Arc<RwLock<HashMap<Uuid, mpsc::Sender<ChatFrame>>>>,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
