//! WebSocket handler — single-room chat relay.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID, registers an outbound channel with the
//! hub, and enters a `select!` loop:
//! - Incoming client frames → decode → `process_inbound_text` → Outcome
//! - Frames fanned out by the hub → forward to client
//! - Ping ticker → keepalive
//! - Idle deadline → close silent peers
//!
//! `process_inbound_text` is pure: it decodes, validates, and returns an
//! `Outcome`. The connection loop owns every outbound concern.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → hub registration
//! 2. `join` → relay records the username and announces it to everyone
//! 3. `message` → relay stamps time and fans out to peers (not the sender)
//! 4. Close, read error, idle timeout, or hub eviction → unregister

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use frames::{ChatFrame, ClientFrame};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::services::hub;
use crate::state::{AppState, CLIENT_CHANNEL_CAPACITY};

/// Largest inbound websocket message accepted from a client.
pub const MAX_MESSAGE_BYTES: usize = 1 << 20;
pub const PING_PERIOD: Duration = Duration::from_secs(30);
/// Connections with no inbound traffic (pongs included) for this long are closed.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Author used for relay-generated announcements.
pub const SYSTEM_USER: &str = "system";

// =============================================================================
// OUTCOME
// =============================================================================

/// Result of processing one inbound frame. Handlers never send directly.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Fan out to ALL clients including the sender.
    Broadcast(ChatFrame),
    /// Fan out to every client EXCEPT the sender.
    BroadcastExcludeSender(ChatFrame),
    /// Nothing to deliver.
    Ignore,
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.max_message_size(MAX_MESSAGE_BYTES)
        .on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();

    let (client_tx, mut client_rx) = mpsc::channel::<ChatFrame>(CLIENT_CHANNEL_CAPACITY);
    hub::join(&state, client_id, client_tx).await;
    info!(%client_id, "ws: client connected");

    // Username announced by this connection's `join`, if any.
    let mut username: Option<String> = None;

    let mut ping = tokio::time::interval_at(Instant::now() + PING_PERIOD, PING_PERIOD);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let idle = tokio::time::sleep(IDLE_TIMEOUT);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                idle.as_mut().reset(Instant::now() + IDLE_TIMEOUT);
                match msg {
                    Message::Text(text) => {
                        let outcome = process_inbound_text(&mut username, client_id, text.as_str());
                        apply_outcome(&state, client_id, outcome).await;
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            frame = client_rx.recv() => {
                // None: the hub evicted this client.
                let Some(frame) = frame else {
                    warn!(%client_id, "ws: evicted by hub");
                    break;
                };
                let text = frames::encode_chat_frame(&frame);
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            _ = ping.tick() => {
                if socket.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
            () = &mut idle => {
                info!(%client_id, "ws: idle timeout");
                break;
            }
        }
    }

    hub::part(&state, client_id).await;
    let remaining = hub::client_count(&state).await;
    info!(%client_id, username = username.as_deref().unwrap_or(""), remaining, "ws: client disconnected");
}

async fn apply_outcome(state: &AppState, client_id: Uuid, outcome: Outcome) {
    match outcome {
        Outcome::Broadcast(frame) => {
            hub::broadcast(state, &frame, None).await;
        }
        Outcome::BroadcastExcludeSender(frame) => {
            hub::broadcast(state, &frame, Some(client_id)).await;
        }
        Outcome::Ignore => {}
    }
}

// =============================================================================
// FRAME HANDLING
// =============================================================================

/// Decode one inbound text frame and decide who receives what.
///
/// `username` is the per-connection identity recorded by `join`; a later
/// `message` prefers it over the name carried in the frame.
pub(crate) fn process_inbound_text(username: &mut Option<String>, client_id: Uuid, text: &str) -> Outcome {
    let frame = match frames::decode_client_frame(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            return Outcome::Ignore;
        }
    };

    match frame {
        ClientFrame::Join { username: announced } => {
            if !announced.is_empty() {
                *username = Some(announced);
            }
            // Announced even when no name was ever given.
            let name = username.as_deref().unwrap_or_default();
            info!(%client_id, username = name, "ws: join");
            Outcome::Broadcast(ChatFrame::now(SYSTEM_USER, format!("{name} joined")))
        }
        ClientFrame::Message { username: claimed, text } => {
            let user = username.clone().unwrap_or(claimed);
            if user.is_empty() || text.is_empty() {
                debug!(%client_id, "ws: empty message dropped");
                return Outcome::Ignore;
            }
            Outcome::BroadcastExcludeSender(ChatFrame::now(user, text))
        }
        ClientFrame::Unknown => {
            debug!(%client_id, "ws: unknown frame type");
            Outcome::Ignore
        }
    }
}
