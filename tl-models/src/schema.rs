//! Database schema definitions and table creation.
//!
//! Three domain tables (users, messages, notifications) plus schema version
//! tracking, with indexes covering the hot paths: inbox listing by receiver
//! and notification listing by user/read state.

use rusqlite::Connection;
use tl_core::error::{TlError, TlResult};
use tracing::info;

/// Create all database tables and indexes if they do not exist.
pub fn create_tables(conn: &Connection) -> TlResult<()> {
    conn.execute_batch(SCHEMA_SQL)
        .map_err(|e| TlError::Database(format!("failed to create schema: {e}")))?;
    info!("database schema verified");
    Ok(())
}

/// Drop all tables (used for database reset).
pub fn drop_tables(conn: &Connection) -> TlResult<()> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS notifications;
         DROP TABLE IF EXISTS messages;
         DROP TABLE IF EXISTS users;
         DROP TABLE IF EXISTS schema_version;",
    )
    .map_err(|e| TlError::Database(format!("failed to drop tables: {e}")))?;
    Ok(())
}

/// Complete SQL schema for all tables.
const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

-- Directory users (consumed through the UserDirectory boundary)
CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);

-- Messages (immutable after creation)
CREATE TABLE IF NOT EXISTS messages (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    sender_id   INTEGER NOT NULL,
    receiver_id INTEGER NOT NULL,
    subject     TEXT,
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_receiver_created ON messages(receiver_id, created_at);
CREATE INDEX IF NOT EXISTS idx_messages_sender ON messages(sender_id);

-- Notifications (read state is monotonic: 0 -> 1, never back)
CREATE TABLE IF NOT EXISTS notifications (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id             INTEGER NOT NULL,
    message             TEXT NOT NULL,
    related_message_id  INTEGER,
    is_read             INTEGER NOT NULL DEFAULT 0,
    created_at          TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_notifications_user_read ON notifications(user_id, is_read);
CREATE INDEX IF NOT EXISTS idx_notifications_created ON notifications(created_at);
"#;
