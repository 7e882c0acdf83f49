//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The relay exposes a plain-text banner at `/`, the chat websocket at `/ws`,
//! and a liveness check at `/healthz`. CORS is wide open: browser clients are
//! served from a different origin than the relay.

pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub const BANNER: &str = "Chatroom backend running. WebSocket at /ws\n";

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(banner))
        .route("/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn banner() -> &'static str {
    BANNER
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
