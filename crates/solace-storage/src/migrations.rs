//! Database schema migrations.
//!
//! Applies the initial schema: chat_sessions, chat_messages, and the
//! schema_migrations tracking table.

use rusqlite::Connection;
use tracing::info;

use solace_core::SolaceError;

/// Run all pending database migrations.
///
/// Currently implements the initial schema (version 1). Future migrations
/// can be added by checking the current version and applying incremental changes.
pub fn run_migrations(conn: &Connection) -> Result<(), SolaceError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| SolaceError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| SolaceError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
///
/// Timestamps are stored as integer Unix milliseconds so that messages
/// appended within the same second keep their order.
fn apply_v1(conn: &Connection) -> Result<(), SolaceError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS chat_sessions (
            id              TEXT PRIMARY KEY NOT NULL,
            user_id         TEXT NOT NULL,
            title           TEXT NOT NULL DEFAULT 'New Chat Session',
            created_at      INTEGER NOT NULL,
            last_message_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_user
            ON chat_sessions (user_id, last_message_at DESC);

        CREATE TABLE IF NOT EXISTS chat_messages (
            id              TEXT PRIMARY KEY NOT NULL,
            session_id      TEXT NOT NULL,
            user_id         TEXT NOT NULL,
            content         TEXT NOT NULL DEFAULT '',
            is_user_message INTEGER NOT NULL,
            created_at      INTEGER NOT NULL,
            FOREIGN KEY (session_id) REFERENCES chat_sessions(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_messages_session
            ON chat_messages (session_id, created_at ASC);

        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| SolaceError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}
