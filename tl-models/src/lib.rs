//! Teamline Models - Database schema, models, migrations, and query builders.
//!
//! This crate owns all data persistence for the inbox subsystem: SQLite
//! database initialization, entity models for messages, notifications, and
//! directory users, versioned migrations, and parameterized query builders
//! for paginated inbox retrieval, search, and notification read state.

pub mod db;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod schema;

// Re-export key types
pub use db::{Database, DbPool};
pub use models::message::Message;
pub use models::notification::{Notification, ReadTransition};
pub use models::user::User;
