//! Notification entity model.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tl_core::error::{TlError, TlResult};

/// A lightweight event record informing a user that something happened.
///
/// `related_message_id` is a weak back-reference used for display context
/// only; notifications have an independent lifecycle from messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Option<i64>,
    pub user_id: i64,
    pub message: String,
    pub related_message_id: Option<i64>,
    pub is_read: bool,
    pub created_at: String,
}

/// Outcome of a mark-read attempt on a single notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadTransition {
    /// The row transitioned from unread to read.
    Transitioned,
    /// The row was already read; the call was a no-op.
    AlreadyRead,
}

impl Notification {
    /// Build a new, unsaved unread notification stamped with the current time.
    pub fn new(user_id: i64, message: String, related_message_id: Option<i64>) -> Self {
        Self {
            id: None,
            user_id,
            message,
            related_message_id,
            is_read: false,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Construct a Notification from a database row.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            message: row.get("message")?,
            related_message_id: row.get("related_message_id")?,
            is_read: row.get::<_, i32>("is_read")? != 0,
            created_at: row.get("created_at")?,
        })
    }

    /// Find a notification by its database ID.
    pub fn find_by_id(conn: &Connection, id: i64) -> TlResult<Option<Self>> {
        match conn.query_row(
            "SELECT * FROM notifications WHERE id = ?1",
            [id],
            Self::from_row,
        ) {
            Ok(n) => Ok(Some(n)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(TlError::Database(e.to_string())),
        }
    }

    /// Insert this notification. Returns the assigned database ID.
    pub fn save(&mut self, conn: &Connection) -> TlResult<i64> {
        conn.execute(
            "INSERT INTO notifications (user_id, message, related_message_id, is_read, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                self.user_id,
                self.message,
                self.related_message_id,
                self.is_read as i32,
                self.created_at,
            ],
        )
        .map_err(|e| TlError::Database(e.to_string()))?;

        self.id = Some(conn.last_insert_rowid());
        Ok(self.id.unwrap_or(0))
    }

    /// Mark one notification read with a per-row compare-and-set.
    ///
    /// The UPDATE only fires while the row is still unread, so concurrent
    /// viewers race harmlessly: exactly one caller performs the transition
    /// and everyone observes the same final state. Marking an already-read
    /// notification is a no-op, not an error. Returns the post-attempt row
    /// together with which side of the race this caller landed on.
    pub fn mark_read(conn: &Connection, id: i64) -> TlResult<(Self, ReadTransition)> {
        let changed = conn
            .execute(
                "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND is_read = 0",
                [id],
            )
            .map_err(|e| TlError::Database(e.to_string()))?;

        let notification = Self::find_by_id(conn, id)?
            .ok_or(TlError::NotificationNotFound(id))?;

        let transition = if changed > 0 {
            ReadTransition::Transitioned
        } else {
            ReadTransition::AlreadyRead
        };
        Ok((notification, transition))
    }
}
