//! User directory boundary.
//!
//! The inbox subsystem never owns user identity. Who a user is, whether an
//! id is valid, and role checks all belong to the external directory/auth
//! system; this module is the narrow seam through which it is consumed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tl_core::error::TlResult;
use tl_models::{Database, User};

/// The directory's view of a user: just enough to address a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUser {
    pub id: i64,
    pub username: String,
}

/// Narrow lookup interface onto the external user directory.
///
/// `Ok(None)` means the id does not resolve; errors are reserved for the
/// directory itself being unreachable.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a user id to its directory record.
    async fn resolve(&self, user_id: i64) -> TlResult<Option<ResolvedUser>>;
}

/// Directory implementation backed by the shared SQLite users table.
#[derive(Clone)]
pub struct SqliteDirectory {
    database: Database,
}

impl SqliteDirectory {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl UserDirectory for SqliteDirectory {
    async fn resolve(&self, user_id: i64) -> TlResult<Option<ResolvedUser>> {
        let conn = self.database.conn()?;
        Ok(User::find_by_id(&conn, user_id)?.map(|user| ResolvedUser {
            id: user.id.unwrap_or(user_id),
            username: user.username,
        }))
    }
}

/// Fixed in-memory directory, for tests and embedded use.
#[derive(Clone, Default)]
pub struct StaticDirectory {
    users: Arc<HashMap<i64, String>>,
}

impl StaticDirectory {
    /// Build a directory from `(id, username)` pairs.
    pub fn new(entries: impl IntoIterator<Item = (i64, String)>) -> Self {
        Self {
            users: Arc::new(entries.into_iter().collect()),
        }
    }
}

#[async_trait]
impl UserDirectory for StaticDirectory {
    async fn resolve(&self, user_id: i64) -> TlResult<Option<ResolvedUser>> {
        Ok(self.users.get(&user_id).map(|username| ResolvedUser {
            id: user_id,
            username: username.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_directory_resolution() {
        let dir = StaticDirectory::new([(1, "alice".to_string()), (2, "bob".to_string())]);

        let alice = dir.resolve(1).await.unwrap().unwrap();
        assert_eq!(alice.username, "alice");
        assert!(dir.resolve(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_directory_resolution() {
        let tmp = tempfile::TempDir::new().unwrap();
        let db = Database::init(
            &tmp.path().join("test.db"),
            &tl_core::config::DatabaseConfig::default(),
        )
        .unwrap();

        let id = {
            let conn = db.conn().unwrap();
            User::new("carol").save(&conn).unwrap()
        };

        let dir = SqliteDirectory::new(db);
        let carol = dir.resolve(id).await.unwrap().unwrap();
        assert_eq!(carol.username, "carol");
        assert!(dir.resolve(id + 100).await.unwrap().is_none());
    }
}
