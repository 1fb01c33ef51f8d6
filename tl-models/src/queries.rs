//! Query builders for common database access patterns.
//!
//! Provides paginated, filtered, and sorted queries for messages and
//! notifications. All queries use parameterized SQL to prevent injection
//! and return domain model types.

use rusqlite::{params, Connection};
use tl_core::error::{TlError, TlResult};

use crate::models::message::Message;
use crate::models::notification::Notification;

// ─── Message queries ────────────────────────────────────────────────────────

/// List a receiver's inbox page, most recent first.
///
/// Ordering is `created_at` descending with `id` descending as tiebreak so
/// that messages created in the same instant still page deterministically.
pub fn list_messages_for_receiver(
    conn: &Connection,
    receiver_id: i64,
    offset: i64,
    limit: i64,
) -> TlResult<Vec<Message>> {
    let mut stmt = conn
        .prepare(
            "SELECT * FROM messages WHERE receiver_id = ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
        )
        .map_err(|e| TlError::Database(e.to_string()))?;

    let messages = stmt
        .query_map(params![receiver_id, limit, offset], Message::from_row)
        .map_err(|e| TlError::Database(e.to_string()))?
        .filter_map(|r| r.ok())
        .collect();

    Ok(messages)
}

/// Count all messages addressed to a receiver.
pub fn count_messages_for_receiver(conn: &Connection, receiver_id: i64) -> TlResult<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM messages WHERE receiver_id = ?1",
        [receiver_id],
        |row| row.get(0),
    )
    .map_err(|e| TlError::Database(e.to_string()))
}

/// List messages sent by a user, most recent first.
pub fn list_messages_from_sender(
    conn: &Connection,
    sender_id: i64,
    offset: i64,
    limit: i64,
) -> TlResult<Vec<Message>> {
    let mut stmt = conn
        .prepare(
            "SELECT * FROM messages WHERE sender_id = ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
        )
        .map_err(|e| TlError::Database(e.to_string()))?;

    let messages = stmt
        .query_map(params![sender_id, limit, offset], Message::from_row)
        .map_err(|e| TlError::Database(e.to_string()))?
        .filter_map(|r| r.ok())
        .collect();

    Ok(messages)
}

/// Count all messages sent by a user.
pub fn count_messages_from_sender(conn: &Connection, sender_id: i64) -> TlResult<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM messages WHERE sender_id = ?1",
        [sender_id],
        |row| row.get(0),
    )
    .map_err(|e| TlError::Database(e.to_string()))
}

/// Search messages by subject or content, optionally scoped to a receiver.
///
/// The match is a case-insensitive substring match (SQLite LIKE). An empty
/// or whitespace query returns no rows: search is an explicit narrowing
/// operation, never an accidental full dump.
pub fn search_messages(
    conn: &Connection,
    query: &str,
    receiver_id: Option<i64>,
    limit: i64,
) -> TlResult<Vec<Message>> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let pattern = format!("%{}%", query.trim());

    let messages = match receiver_id {
        Some(receiver) => {
            let mut stmt = conn
                .prepare(
                    "SELECT * FROM messages
                     WHERE receiver_id = ?1 AND (content LIKE ?2 OR subject LIKE ?2)
                     ORDER BY created_at DESC, id DESC LIMIT ?3",
                )
                .map_err(|e| TlError::Database(e.to_string()))?;
            let rows: Vec<Message> = stmt
                .query_map(params![receiver, pattern, limit], Message::from_row)
                .map_err(|e| TlError::Database(e.to_string()))?
                .filter_map(|r| r.ok())
                .collect();
            rows
        }
        None => {
            let mut stmt = conn
                .prepare(
                    "SELECT * FROM messages
                     WHERE content LIKE ?1 OR subject LIKE ?1
                     ORDER BY created_at DESC, id DESC LIMIT ?2",
                )
                .map_err(|e| TlError::Database(e.to_string()))?;
            let rows: Vec<Message> = stmt
                .query_map(params![pattern, limit], Message::from_row)
                .map_err(|e| TlError::Database(e.to_string()))?
                .filter_map(|r| r.ok())
                .collect();
            rows
        }
    };

    Ok(messages)
}

// ─── Notification queries ───────────────────────────────────────────────────

/// List a user's notifications, unread first.
///
/// Unread items sort before read ones regardless of age so actionable
/// entries always lead; within each group, most recent first.
pub fn list_notifications_for_user(conn: &Connection, user_id: i64) -> TlResult<Vec<Notification>> {
    let mut stmt = conn
        .prepare(
            "SELECT * FROM notifications WHERE user_id = ?1
             ORDER BY is_read ASC, created_at DESC, id DESC",
        )
        .map_err(|e| TlError::Database(e.to_string()))?;

    let notifications = stmt
        .query_map([user_id], Notification::from_row)
        .map_err(|e| TlError::Database(e.to_string()))?
        .filter_map(|r| r.ok())
        .collect();

    Ok(notifications)
}

/// List only a user's unread notifications, most recent first.
pub fn unread_notifications_for_user(
    conn: &Connection,
    user_id: i64,
) -> TlResult<Vec<Notification>> {
    let mut stmt = conn
        .prepare(
            "SELECT * FROM notifications WHERE user_id = ?1 AND is_read = 0
             ORDER BY created_at DESC, id DESC",
        )
        .map_err(|e| TlError::Database(e.to_string()))?;

    let notifications = stmt
        .query_map([user_id], Notification::from_row)
        .map_err(|e| TlError::Database(e.to_string()))?
        .filter_map(|r| r.ok())
        .collect();

    Ok(notifications)
}

/// IDs of a user's currently-unread notifications.
pub fn unread_notification_ids(conn: &Connection, user_id: i64) -> TlResult<Vec<i64>> {
    let mut stmt = conn
        .prepare("SELECT id FROM notifications WHERE user_id = ?1 AND is_read = 0 ORDER BY id")
        .map_err(|e| TlError::Database(e.to_string()))?;

    let ids = stmt
        .query_map([user_id], |row| row.get(0))
        .map_err(|e| TlError::Database(e.to_string()))?
        .filter_map(|r| r.ok())
        .collect();

    Ok(ids)
}

/// Count a user's unread notifications.
pub fn count_unread_notifications(conn: &Connection, user_id: i64) -> TlResult<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND is_read = 0",
        [user_id],
        |row| row.get(0),
    )
    .map_err(|e| TlError::Database(e.to_string()))
}
