//! Chat relay entry point.
//!
//! SYSTEM CONTEXT
//! ==============
//! A single-room broadcast hub: every websocket client joins the same room,
//! and chat lines are fanned out to all other connected clients.

mod config;
mod routes;
mod services;
mod state;

use config::{ConfigError, ServerConfig};

#[derive(Debug, thiserror::Error)]
enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: std::net::SocketAddr, source: std::io::Error },
    #[error("server failed: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env()?;
    let addr = config.socket_addr();

    let state = state::AppState::new();
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    tracing::info!(%addr, "chatroom relay listening");
    axum::serve(listener, app).await.map_err(ServerError::Serve)
}
