//! Session and message repository over the SQLite store.
//!
//! Raw-SQL persistence for chat sessions and their messages, including
//! the pairing of stored messages back into user/assistant exchanges
//! for the response providers.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use solace_core::types::{ChatMessage, ChatSession, Exchange};
use solace_core::SolaceError;

use crate::db::Database;

/// Title given to sessions created without a first message.
pub const DEFAULT_SESSION_TITLE: &str = "New Chat Session";

const TITLE_MAX_CHARS: usize = 50;
const TITLE_TRUNCATE_CHARS: usize = 47;

/// Derive a session title from its first user message.
///
/// Long messages are truncated to 47 characters plus an ellipsis; empty
/// input falls back to [`DEFAULT_SESSION_TITLE`].
pub fn derive_session_title(first_message: &str) -> String {
    let trimmed = first_message.trim();
    if trimmed.is_empty() {
        return DEFAULT_SESSION_TITLE.to_string();
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        let head: String = trimmed.chars().take(TITLE_TRUNCATE_CHARS).collect();
        format!("{}...", head)
    } else {
        trimmed.to_string()
    }
}

/// Repository for chat sessions and their messages.
pub struct SessionRepository {
    db: Arc<Database>,
}

impl SessionRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create a new session for a user.
    ///
    /// `title` defaults to [`DEFAULT_SESSION_TITLE`] when absent.
    pub fn create_session(
        &self,
        user_id: Uuid,
        title: Option<&str>,
    ) -> Result<ChatSession, SolaceError> {
        let now = now_millis();
        let session = ChatSession {
            id: Uuid::new_v4(),
            user_id,
            title: title.unwrap_or(DEFAULT_SESSION_TITLE).to_string(),
            created_at: now,
            last_message_at: now,
        };

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO chat_sessions (id, user_id, title, created_at, last_message_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    session.id.to_string(),
                    session.user_id.to_string(),
                    session.title,
                    session.created_at.timestamp_millis(),
                    session.last_message_at.timestamp_millis(),
                ],
            )
            .map_err(|e| SolaceError::Storage(format!("Failed to create session: {}", e)))?;
            Ok(())
        })?;

        Ok(session)
    }

    /// Find a session by ID.
    pub fn find_session(&self, id: Uuid) -> Result<Option<ChatSession>, SolaceError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, user_id, title, created_at, last_message_at
                     FROM chat_sessions WHERE id = ?1",
                )
                .map_err(|e| SolaceError::Storage(e.to_string()))?;

            let result = stmt
                .query_row(rusqlite::params![id.to_string()], |row| {
                    Ok(row_to_session(row))
                })
                .optional()
                .map_err(|e| SolaceError::Storage(e.to_string()))?;

            match result {
                Some(session) => Ok(Some(session?)),
                None => Ok(None),
            }
        })
    }

    /// List a user's sessions, most recently active first.
    pub fn list_sessions(
        &self,
        user_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<ChatSession>, SolaceError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, user_id, title, created_at, last_message_at
                     FROM chat_sessions
                     WHERE user_id = ?1
                     ORDER BY last_message_at DESC
                     LIMIT ?2 OFFSET ?3",
                )
                .map_err(|e| SolaceError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![user_id.to_string(), limit, offset], |row| {
                    Ok(row_to_session(row))
                })
                .map_err(|e| SolaceError::Storage(e.to_string()))?;

            let mut sessions = Vec::new();
            for row in rows {
                let session = row.map_err(|e| SolaceError::Storage(e.to_string()))??;
                sessions.push(session);
            }
            Ok(sessions)
        })
    }

    /// Rename a session.
    pub fn rename_session(&self, id: Uuid, title: &str) -> Result<(), SolaceError> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE chat_sessions SET title = ?2 WHERE id = ?1",
                    rusqlite::params![id.to_string(), title],
                )
                .map_err(|e| SolaceError::Storage(format!("Failed to rename session: {}", e)))?;
            if changed == 0 {
                return Err(SolaceError::Storage(format!("Session not found: {}", id)));
            }
            Ok(())
        })
    }

    /// Delete a session and all of its messages.
    pub fn delete_session(&self, id: Uuid) -> Result<(), SolaceError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM chat_sessions WHERE id = ?1",
                rusqlite::params![id.to_string()],
            )
            .map_err(|e| SolaceError::Storage(format!("Failed to delete session: {}", e)))?;
            Ok(())
        })
    }

    /// Append a message to a session and advance its activity timestamp.
    pub fn append_message(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        content: &str,
        is_user_message: bool,
    ) -> Result<ChatMessage, SolaceError> {
        let message = ChatMessage {
            id: Uuid::new_v4(),
            session_id,
            user_id,
            content: content.to_string(),
            is_user_message,
            created_at: now_millis(),
        };

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO chat_messages (id, session_id, user_id, content, is_user_message, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    message.id.to_string(),
                    message.session_id.to_string(),
                    message.user_id.to_string(),
                    message.content,
                    message.is_user_message as i32,
                    message.created_at.timestamp_millis(),
                ],
            )
            .map_err(|e| SolaceError::Storage(format!("Failed to append message: {}", e)))?;

            conn.execute(
                "UPDATE chat_sessions SET last_message_at = ?2 WHERE id = ?1",
                rusqlite::params![
                    message.session_id.to_string(),
                    message.created_at.timestamp_millis()
                ],
            )
            .map_err(|e| SolaceError::Storage(format!("Failed to touch session: {}", e)))?;
            Ok(())
        })?;

        Ok(message)
    }

    /// Delete a single message.
    pub fn delete_message(&self, id: Uuid) -> Result<(), SolaceError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM chat_messages WHERE id = ?1",
                rusqlite::params![id.to_string()],
            )
            .map_err(|e| SolaceError::Storage(format!("Failed to delete message: {}", e)))?;
            Ok(())
        })
    }

    /// All messages in a session, oldest first.
    pub fn messages(&self, session_id: Uuid) -> Result<Vec<ChatMessage>, SolaceError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, session_id, user_id, content, is_user_message, created_at
                     FROM chat_messages
                     WHERE session_id = ?1
                     ORDER BY created_at ASC, rowid ASC",
                )
                .map_err(|e| SolaceError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![session_id.to_string()], |row| {
                    Ok(row_to_message(row))
                })
                .map_err(|e| SolaceError::Storage(e.to_string()))?;

            let mut messages = Vec::new();
            for row in rows {
                let message = row.map_err(|e| SolaceError::Storage(e.to_string()))??;
                messages.push(message);
            }
            Ok(messages)
        })
    }

    /// The last `window` completed user/assistant exchanges, oldest first.
    ///
    /// An exchange is a user message followed by the next assistant
    /// message; trailing unanswered user messages are skipped.
    pub fn recent_exchanges(
        &self,
        session_id: Uuid,
        window: usize,
    ) -> Result<Vec<Exchange>, SolaceError> {
        let messages = self.messages(session_id)?;

        let mut exchanges = Vec::new();
        let mut pending_user: Option<String> = None;
        for message in messages {
            if message.is_user_message {
                pending_user = Some(message.content);
            } else if let Some(user) = pending_user.take() {
                exchanges.push(Exchange::new(user, message.content));
            }
        }

        if exchanges.len() > window {
            exchanges.drain(..exchanges.len() - window);
        }
        Ok(exchanges)
    }

    /// The last `count` assistant replies in a session, oldest first.
    pub fn recent_assistant_replies(
        &self,
        session_id: Uuid,
        count: usize,
    ) -> Result<Vec<String>, SolaceError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT content FROM chat_messages
                     WHERE session_id = ?1 AND is_user_message = 0
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT ?2",
                )
                .map_err(|e| SolaceError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(
                    rusqlite::params![session_id.to_string(), count as u64],
                    |row| row.get::<_, String>(0),
                )
                .map_err(|e| SolaceError::Storage(e.to_string()))?;

            let mut replies = Vec::new();
            for row in rows {
                replies.push(row.map_err(|e| SolaceError::Storage(e.to_string()))?);
            }
            replies.reverse();
            Ok(replies)
        })
    }
}

fn row_to_session(row: &Row<'_>) -> Result<ChatSession, SolaceError> {
    let id: String = row
        .get(0)
        .map_err(|e| SolaceError::Storage(e.to_string()))?;
    let user_id: String = row
        .get(1)
        .map_err(|e| SolaceError::Storage(e.to_string()))?;
    let title: String = row
        .get(2)
        .map_err(|e| SolaceError::Storage(e.to_string()))?;
    let created_at: i64 = row
        .get(3)
        .map_err(|e| SolaceError::Storage(e.to_string()))?;
    let last_message_at: i64 = row
        .get(4)
        .map_err(|e| SolaceError::Storage(e.to_string()))?;

    Ok(ChatSession {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        title,
        created_at: parse_millis(created_at)?,
        last_message_at: parse_millis(last_message_at)?,
    })
}

fn row_to_message(row: &Row<'_>) -> Result<ChatMessage, SolaceError> {
    let id: String = row
        .get(0)
        .map_err(|e| SolaceError::Storage(e.to_string()))?;
    let session_id: String = row
        .get(1)
        .map_err(|e| SolaceError::Storage(e.to_string()))?;
    let user_id: String = row
        .get(2)
        .map_err(|e| SolaceError::Storage(e.to_string()))?;
    let content: String = row
        .get(3)
        .map_err(|e| SolaceError::Storage(e.to_string()))?;
    let is_user_message: i64 = row
        .get(4)
        .map_err(|e| SolaceError::Storage(e.to_string()))?;
    let created_at: i64 = row
        .get(5)
        .map_err(|e| SolaceError::Storage(e.to_string()))?;

    Ok(ChatMessage {
        id: parse_uuid(&id)?,
        session_id: parse_uuid(&session_id)?,
        user_id: parse_uuid(&user_id)?,
        content,
        is_user_message: is_user_message != 0,
        created_at: parse_millis(created_at)?,
    })
}

fn parse_uuid(value: &str) -> Result<Uuid, SolaceError> {
    Uuid::parse_str(value).map_err(|e| SolaceError::Storage(format!("Invalid UUID: {}", e)))
}

fn parse_millis(millis: i64) -> Result<DateTime<Utc>, SolaceError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| SolaceError::Storage(format!("Invalid timestamp: {}", millis)))
}

// The store keeps millisecond timestamps, so the structs handed back to
// callers must carry the same precision or they would disagree with the
// rows read back later.
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    Utc.timestamp_millis_opt(now.timestamp_millis())
        .single()
        .unwrap_or(now)
}
