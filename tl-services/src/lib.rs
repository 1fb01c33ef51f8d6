//! Teamline Services - Business logic and service layer.
//!
//! This crate provides the service trait, service registry for dependency
//! injection, and the concrete service implementations of the messaging and
//! notification subsystem:
//! - Message store (send with directory validation, paginated inbox, search)
//! - Notification dispatch (creation as a send side effect, unread-first listing)
//! - Read-state tracking (idempotent mark-read, concurrent bulk transitions)
//! - Inbox orchestration (sanitized page/feed assembly, auto-mark-on-view)
//! - User directory boundary (the only view of the external auth system)
//! - Event bus (typed intra-service communication)

pub mod directory;
pub mod event_bus;
pub mod inbox;
pub mod message;
pub mod notification;
pub mod read_state;
pub mod registry;
pub mod service;

// Re-export key types
pub use directory::{SqliteDirectory, StaticDirectory, ResolvedUser, UserDirectory};
pub use event_bus::{AppEvent, EventBus};
pub use inbox::{InboxService, NotificationFeed};
pub use message::{MessageStore, SendOutcome};
pub use notification::NotificationDispatcher;
pub use read_state::{BulkReadOutcome, ReadStateTracker};
pub use registry::ServiceRegistry;
pub use service::{Service, ServiceState};
