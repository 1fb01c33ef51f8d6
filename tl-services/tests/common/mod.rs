//! Shared test utilities for integration tests.

use tempfile::TempDir;
use tl_core::config::{AppConfig, ConfigHandle, DatabaseConfig};
use tl_models::{Database, User};
use tl_services::EventBus;

/// Create a temporary database with full schema and migrations applied.
/// Returns the Database and the TempDir (must be held alive for the duration of the test).
pub fn create_test_db() -> (Database, TempDir) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("test.db");
    let config = DatabaseConfig::default();
    let db = Database::init(&path, &config).expect("failed to init test database");
    (db, dir)
}

/// Create a default test configuration.
pub fn create_test_config() -> AppConfig {
    AppConfig::default()
}

/// Create a ConfigHandle wrapping a default config.
pub fn create_test_config_handle() -> ConfigHandle {
    ConfigHandle::new(create_test_config())
}

/// Create an EventBus with a small buffer suitable for tests.
pub fn create_test_event_bus() -> EventBus {
    EventBus::new(64)
}

/// Seed the directory with a handful of users.
///
/// Creates alice (id 1), bob (id 2), and carol (id 3).
pub fn seed_users(db: &Database) {
    let conn = db.conn().expect("failed to get connection for seeding");
    for name in ["alice", "bob", "carol"] {
        let mut user = User::new(name);
        user.save(&conn).expect("failed to insert user");
    }
}

/// Seed a batch of messages from alice to bob.
pub fn seed_messages(db: &Database, count: usize) {
    let conn = db.conn().expect("failed to get connection for seeding");
    for i in 1..=count {
        let mut message = tl_models::Message::new(
            1,
            2,
            Some(format!("Subject {i}")),
            format!("Body of message number {i}"),
        );
        message.save(&conn).expect("failed to insert message");
    }
}
