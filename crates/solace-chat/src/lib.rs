//! Chat orchestration.
//!
//! Coordinates the remote response provider, the local template engine,
//! and the session store: validates incoming messages, resolves the
//! session, produces a reply (remote first, local on any remote error),
//! and persists both sides of the turn.

pub mod error;
pub mod orchestrator;

pub use error::ChatError;
pub use orchestrator::{ChatOrchestrator, ChatTurn};
