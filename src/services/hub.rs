//! Hub service — room membership and fan-out.
//!
//! DESIGN
//! ======
//! Every connected client registers the sender half of its outbound channel.
//! Broadcast uses `try_send` so one slow reader never stalls the room: a
//! client whose buffer is full, or whose receiver is gone, is evicted and
//! its websocket task winds down when the channel closes.

#[cfg(test)]
#[path = "hub_test.rs"]
mod tests;

use frames::ChatFrame;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Register a client so it receives room broadcasts.
pub async fn join(state: &AppState, client_id: Uuid, tx: mpsc::Sender<ChatFrame>) {
    let mut clients = state.clients.write().await;
    clients.insert(client_id, tx);
    info!(%client_id, clients = clients.len(), "hub: client registered");
}

/// Remove a client. Returns false if it was already gone (e.g. evicted).
pub async fn part(state: &AppState, client_id: Uuid) -> bool {
    let mut clients = state.clients.write().await;
    let removed = clients.remove(&client_id).is_some();
    if removed {
        info!(%client_id, clients = clients.len(), "hub: client unregistered");
    }
    removed
}

pub async fn client_count(state: &AppState) -> usize {
    state.clients.read().await.len()
}

/// Deliver a frame to every registered client, optionally skipping one.
/// Returns the number of clients the frame was queued for.
pub async fn broadcast(state: &AppState, frame: &ChatFrame, exclude: Option<Uuid>) -> usize {
    let mut delivered = 0;
    let mut evicted = Vec::new();
    {
        let clients = state.clients.read().await;
        for (client_id, tx) in clients.iter() {
            if exclude == Some(*client_id) {
                continue;
            }
            match tx.try_send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(%client_id, "hub: client buffer full; dropping client");
                    evicted.push(*client_id);
                }
                Err(TrySendError::Closed(_)) => evicted.push(*client_id),
            }
        }
    }

    if !evicted.is_empty() {
        let mut clients = state.clients.write().await;
        for client_id in evicted {
            clients.remove(&client_id);
        }
    }
    delivered
}
