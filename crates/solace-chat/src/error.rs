//! Error types for the chat layer.

use solace_core::SolaceError;

/// Errors surfaced to callers of the orchestrator.
///
/// Remote provider failures never appear here; they are absorbed by the
/// local-engine fallback.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat is disabled")]
    Disabled,
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("session not found: {0}")]
    SessionNotFound(uuid::Uuid),
    #[error("storage error: {0}")]
    StorageError(String),
}

impl From<SolaceError> for ChatError {
    fn from(err: SolaceError) -> Self {
        ChatError::StorageError(err.to_string())
    }
}

impl From<ChatError> for SolaceError {
    fn from(err: ChatError) -> Self {
        SolaceError::Chat(err.to_string())
    }
}
