//! SQLite persistence for chat sessions and messages.
//!
//! Provides a WAL-mode SQLite database with migrations and a
//! session/message repository used by the chat orchestrator.

pub mod db;
pub mod migrations;
pub mod repository;

pub use db::Database;
pub use repository::{derive_session_title, SessionRepository, DEFAULT_SESSION_TITLE};
