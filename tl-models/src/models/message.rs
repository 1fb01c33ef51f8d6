//! Message entity model.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tl_core::error::{TlError, TlResult};

/// A single message between two users.
///
/// Messages are immutable after creation: no edit or delete path exists.
/// `content` holds raw rich text exactly as submitted; sanitization happens
/// at the service boundary on the way out, never here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Option<i64>,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub subject: Option<String>,
    pub content: String,
    pub created_at: String,
}

impl Message {
    /// Build a new, unsaved message stamped with the current time.
    pub fn new(sender_id: i64, receiver_id: i64, subject: Option<String>, content: String) -> Self {
        Self {
            id: None,
            sender_id,
            receiver_id,
            subject,
            content,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Construct a Message from a database row.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            sender_id: row.get("sender_id")?,
            receiver_id: row.get("receiver_id")?,
            subject: row.get("subject")?,
            content: row.get("content")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Find a message by its database ID.
    pub fn find_by_id(conn: &Connection, id: i64) -> TlResult<Option<Self>> {
        match conn.query_row("SELECT * FROM messages WHERE id = ?1", [id], Self::from_row) {
            Ok(msg) => Ok(Some(msg)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(TlError::Database(e.to_string())),
        }
    }

    /// Insert this message. Returns the assigned database ID.
    pub fn save(&mut self, conn: &Connection) -> TlResult<i64> {
        conn.execute(
            "INSERT INTO messages (sender_id, receiver_id, subject, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                self.sender_id,
                self.receiver_id,
                self.subject,
                self.content,
                self.created_at,
            ],
        )
        .map_err(|e| TlError::Database(e.to_string()))?;

        self.id = Some(conn.last_insert_rowid());
        Ok(self.id.unwrap_or(0))
    }

    /// Subject and content combined, for previews.
    pub fn full_text(&self) -> String {
        match &self.subject {
            Some(s) if !s.is_empty() => format!("{s}\n{}", self.content),
            _ => self.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn setup_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn test_save_and_find() {
        let conn = setup_conn();
        let mut msg = Message::new(1, 2, Some("Hello".into()), "body".into());
        let id = msg.save(&conn).unwrap();
        assert!(id > 0);

        let found = Message::find_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(found.sender_id, 1);
        assert_eq!(found.receiver_id, 2);
        assert_eq!(found.subject.as_deref(), Some("Hello"));
        assert_eq!(found.content, "body");
    }

    #[test]
    fn test_find_missing_returns_none() {
        let conn = setup_conn();
        assert!(Message::find_by_id(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn test_full_text() {
        let msg = Message::new(1, 2, Some("Re:".into()), "Hello".into());
        assert_eq!(msg.full_text(), "Re:\nHello");

        let no_subject = Message::new(1, 2, None, "Hello".into());
        assert_eq!(no_subject.full_text(), "Hello");
    }

    #[test]
    fn test_ids_are_monotonic() {
        let conn = setup_conn();
        let a = Message::new(1, 2, None, "first".into()).save(&conn).unwrap();
        let b = Message::new(1, 2, None, "second".into()).save(&conn).unwrap();
        assert!(b > a);
    }
}
