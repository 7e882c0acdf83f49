//! Client-side state models.
//!
//! DESIGN
//! ======
//! Each model is plain data plus pure transition functions so the engine's
//! rules can be tested without a socket or a scrollable surface.

pub mod chat;
pub mod connection;
pub mod identity;
pub mod viewport;
