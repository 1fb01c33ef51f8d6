//! Directory user entity.
//!
//! Only resolution is in scope for the inbox subsystem; the row exists so
//! the SQLite-backed directory implementation, the CLI, and tests have
//! something to resolve against.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tl_core::error::{TlError, TlResult};

/// A user directory row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub username: String,
    pub created_at: String,
}

impl User {
    /// Build a new, unsaved user.
    pub fn new(username: &str) -> Self {
        Self {
            id: None,
            username: username.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Construct a User from a database row.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Find a user by database ID.
    pub fn find_by_id(conn: &Connection, id: i64) -> TlResult<Option<Self>> {
        match conn.query_row("SELECT * FROM users WHERE id = ?1", [id], Self::from_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(TlError::Database(e.to_string())),
        }
    }

    /// Find a user by username.
    pub fn find_by_username(conn: &Connection, username: &str) -> TlResult<Option<Self>> {
        match conn.query_row(
            "SELECT * FROM users WHERE username = ?1",
            [username],
            Self::from_row,
        ) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(TlError::Database(e.to_string())),
        }
    }

    /// Insert this user. Returns the assigned database ID.
    pub fn save(&mut self, conn: &Connection) -> TlResult<i64> {
        conn.execute(
            "INSERT INTO users (username, created_at) VALUES (?1, ?2)",
            params![self.username, self.created_at],
        )
        .map_err(|e| TlError::Database(e.to_string()))?;

        self.id = Some(conn.last_insert_rowid());
        Ok(self.id.unwrap_or(0))
    }

    /// List all users ordered by username.
    pub fn list(conn: &Connection) -> TlResult<Vec<Self>> {
        let mut stmt = conn
            .prepare("SELECT * FROM users ORDER BY username")
            .map_err(|e| TlError::Database(e.to_string()))?;

        let users = stmt
            .query_map([], Self::from_row)
            .map_err(|e| TlError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(users)
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
    fn test_save_and_lookup() {
        let conn = setup_conn();
        let id = User::new("alice").save(&conn).unwrap();

        let by_id = User::find_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(by_id.username, "alice");

        let by_name = User::find_by_username(&conn, "alice").unwrap().unwrap();
        assert_eq!(by_name.id, Some(id));
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let conn = setup_conn();
        User::new("alice").save(&conn).unwrap();
        assert!(User::new("alice").save(&conn).is_err());
    }

    #[test]
    fn test_list_ordered() {
        let conn = setup_conn();
        User::new("carol").save(&conn).unwrap();
        User::new("alice").save(&conn).unwrap();

        let users = User::list(&conn).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "alice");
    }
}
