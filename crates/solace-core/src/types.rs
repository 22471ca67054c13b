//! Shared chat domain types.
//!
//! These mirror the persisted rows in the session store and the payloads
//! exchanged with the orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted conversation session owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent message, or `created_at` for a fresh
    /// session.
    pub last_message_at: DateTime<Utc>,
}

/// A single persisted chat message, user- or assistant-authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub is_user_message: bool,
    pub created_at: DateTime<Utc>,
}

/// One prior user/assistant exchange, oldest-first in history slices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub user: String,
    pub assistant: String,
}

impl Exchange {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}
