//! Notification dispatcher: creation and per-user feeds.
//!
//! Every notification is born unread. Read-state transitions live in the
//! read-state tracker, not here.

use tracing::{debug, info};

use tl_core::error::TlResult;
use tl_models::queries;
use tl_models::{Database, Notification};

use crate::event_bus::{AppEvent, EventBus};
use crate::service::{Service, ServiceState};

/// Service owning notification records.
#[derive(Clone)]
pub struct NotificationDispatcher {
    state: ServiceState,
    database: Database,
    event_bus: EventBus,
}

impl NotificationDispatcher {
    /// Create a new NotificationDispatcher.
    pub fn new(database: Database, event_bus: EventBus) -> Self {
        Self {
            state: ServiceState::Created,
            database,
            event_bus,
        }
    }

    /// Create an unread notification for `user_id`.
    pub fn create(
        &self,
        user_id: i64,
        text: &str,
        related_message_id: Option<i64>,
    ) -> TlResult<Notification> {
        let mut notification = Notification::new(user_id, text.to_string(), related_message_id);
        let notification_id = {
            let conn = self.database.conn()?;
            notification.save(&conn)?
        };

        debug!(notification_id, user_id, "notification created");
        self.event_bus.emit(AppEvent::NotificationCreated {
            notification_id,
            user_id,
            related_message_id,
        });

        Ok(notification)
    }

    /// All notifications for a user, unread first, newest first within each
    /// read state.
    pub fn list(&self, user_id: i64) -> TlResult<Vec<Notification>> {
        let conn = self.database.conn()?;
        queries::list_notifications_for_user(&conn, user_id)
    }

    /// Unread notifications for a user, newest first.
    pub fn unread(&self, user_id: i64) -> TlResult<Vec<Notification>> {
        let conn = self.database.conn()?;
        queries::unread_notifications_for_user(&conn, user_id)
    }

    /// Number of unread notifications for a user.
    pub fn unread_count(&self, user_id: i64) -> TlResult<i64> {
        let conn = self.database.conn()?;
        queries::count_unread_notifications(&conn, user_id)
    }
}

impl Service for NotificationDispatcher {
    fn name(&self) -> &str { "notification_dispatcher" }
    fn state(&self) -> ServiceState { self.state }
    fn init(&mut self) -> TlResult<()> {
        self.state = ServiceState::Running;
        info!("notification dispatcher initialized");
        Ok(())
    }
    fn shutdown(&mut self) -> TlResult<()> {
        self.state = ServiceState::Stopped;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tl_core::config::DatabaseConfig;

    fn create_dispatcher() -> (NotificationDispatcher, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::init(&path, &DatabaseConfig::default()).unwrap();
        (NotificationDispatcher::new(db, EventBus::new(16)), dir)
    }

    #[test]
    fn test_create_is_unread() {
        let (dispatcher, _dir) = create_dispatcher();
        let n = dispatcher.create(7, "New message from alice", None).unwrap();

        assert!(n.id.is_some());
        assert!(!n.is_read);
        assert_eq!(dispatcher.unread_count(7).unwrap(), 1);
    }

    #[test]
    fn test_feed_scoped_to_user() {
        let (dispatcher, _dir) = create_dispatcher();
        dispatcher.create(1, "for one", None).unwrap();
        dispatcher.create(2, "for two", None).unwrap();
        dispatcher.create(2, "also for two", None).unwrap();

        assert_eq!(dispatcher.list(1).unwrap().len(), 1);
        assert_eq!(dispatcher.list(2).unwrap().len(), 2);
        assert!(dispatcher.list(3).unwrap().is_empty());
    }

    #[test]
    fn test_create_emits_event() {
        let (dispatcher, _dir) = create_dispatcher();
        let mut rx = dispatcher.event_bus.subscribe();

        let n = dispatcher.create(5, "hello", Some(9)).unwrap();

        match rx.try_recv().unwrap() {
            AppEvent::NotificationCreated {
                notification_id,
                user_id,
                related_message_id,
            } => {
                assert_eq!(Some(notification_id), n.id);
                assert_eq!(user_id, 5);
                assert_eq!(related_message_id, Some(9));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
