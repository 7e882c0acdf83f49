//! Networking side of the engine.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` defines the socket seam, `socket` implements it over
//! tokio-tungstenite, `connection` owns the single live handle, `normalize`
//! turns inbound payloads into canonical messages, and `session` ties them
//! together behind the engine's command surface.

pub mod connection;
pub mod normalize;
pub mod session;
pub mod socket;
pub mod transport;
