//! Client configuration defaults and environment overrides.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

/// Relay websocket endpoint used when nothing else is configured.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8080/ws";

/// Env var overriding [`DEFAULT_WS_URL`].
pub const WS_URL_ENV: &str = "CHAT_WS_URL";

/// Default location of the stored display name.
pub const DEFAULT_IDENTITY_FILE: &str = ".chatroom_username";

/// Resolve the relay endpoint: `CHAT_WS_URL` when set and non-empty,
/// otherwise [`DEFAULT_WS_URL`].
#[must_use]
pub fn ws_url_from_env() -> String {
    resolve_ws_url(std::env::var(WS_URL_ENV).unwrap_or_default())
}

/// Trim a configured endpoint, falling back to [`DEFAULT_WS_URL`] when blank.
#[must_use]
pub fn resolve_ws_url(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() { DEFAULT_WS_URL.to_owned() } else { trimmed.to_owned() }
}
