//! CLI command implementations.

pub mod db;
pub mod inbox;
pub mod notifications;
pub mod search;
pub mod send;
pub mod users;

use std::sync::Arc;

use tl_core::config::ConfigHandle;
use tl_core::error::TlResult;
use tl_models::Database;
use tl_services::{EventBus, InboxService, SqliteDirectory};

/// Helper to initialize the database from config.
pub async fn init_database(config: &ConfigHandle) -> TlResult<Database> {
    let cfg = config.read().await;
    let db_path = cfg.effective_db_path()?;
    Database::init(&db_path, &cfg.database)
}

/// Helper to wire up the inbox service over the configured database.
pub async fn init_inbox(config: &ConfigHandle) -> TlResult<(InboxService, Database)> {
    let db = init_database(config).await?;
    let directory = Arc::new(SqliteDirectory::new(db.clone()));
    let inbox = InboxService::new(
        db.clone(),
        directory,
        EventBus::new(64),
        config.clone(),
    );
    Ok((inbox, db))
}

/// Format a byte count as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Truncate a string to a maximum length, appending an ellipsis if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
