//! Message store: send, paginated inbox listing, and search.
//!
//! Owns message persistence. Sending validates input against the user
//! directory before anything touches storage, persists the message, and
//! then fans out exactly one notification for the receiver as a
//! best-effort side effect: the message is authoritative, the
//! notification a convenience that may fail independently.

use std::sync::Arc;

use serde::Serialize;

use tracing::{debug, info, warn};

use tl_core::constants::MAX_PER_PAGE;
use tl_core::error::{TlError, TlResult};
use tl_core::paging::{page_window, PageResult};
use tl_models::queries;
use tl_models::{Database, Message, Notification};

use crate::directory::UserDirectory;
use crate::event_bus::{AppEvent, EventBus};
use crate::notification::NotificationDispatcher;
use crate::service::{Service, ServiceState};

/// Result of a successful send.
///
/// The notification side effect is reported here rather than raised:
/// `notification` is present when fan-out succeeded, otherwise
/// `notification_error` says why it did not. The message itself is always
/// durable by the time a `SendOutcome` exists.
#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub message: Message,
    pub notification: Option<Notification>,
    pub notification_error: Option<String>,
}

/// Service owning message records.
pub struct MessageStore {
    state: ServiceState,
    database: Database,
    directory: Arc<dyn UserDirectory>,
    dispatcher: NotificationDispatcher,
    event_bus: EventBus,
}

impl MessageStore {
    /// Create a new MessageStore.
    pub fn new(database: Database, directory: Arc<dyn UserDirectory>, event_bus: EventBus) -> Self {
        let dispatcher = NotificationDispatcher::new(database.clone(), event_bus.clone());
        Self {
            state: ServiceState::Created,
            database,
            directory,
            dispatcher,
            event_bus,
        }
    }

    /// Send a message from `sender_id` to `receiver_id`.
    ///
    /// Validation happens before persistence: the receiver must resolve
    /// against the user directory and `content` must be non-empty. On
    /// success, exactly one notification is created for the receiver; a
    /// notification failure is reported on the outcome but never fails the
    /// send.
    pub async fn send(
        &self,
        sender_id: i64,
        receiver_id: i64,
        subject: Option<String>,
        content: &str,
    ) -> TlResult<SendOutcome> {
        if content.trim().is_empty() {
            return Err(TlError::validation("content", "content is required"));
        }

        let receiver = self
            .directory
            .resolve(receiver_id)
            .await?
            .ok_or_else(|| {
                TlError::validation("receiver_id", format!("unknown receiver {receiver_id}"))
            })?;

        let sender_name = self
            .directory
            .resolve(sender_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_else(|| format!("user {sender_id}"));

        let mut message = Message::new(sender_id, receiver_id, subject, content.to_string());
        let message_id = {
            let conn = self.database.conn()?;
            message.save(&conn)?
        };

        info!(
            sender_id,
            receiver_id, message_id, "message sent to {}", receiver.username
        );
        self.event_bus.emit(AppEvent::MessageSent {
            message_id,
            sender_id,
            receiver_id,
        });

        // Best-effort fan-out: message durability is already settled
        let notification_text = notification_text(&sender_name, &message);
        let (notification, notification_error) = match self.dispatcher.create(
            receiver_id,
            &notification_text,
            Some(message_id),
        ) {
            Ok(n) => (Some(n), None),
            Err(e) => {
                warn!(message_id, receiver_id, "notification fan-out failed: {e}");
                self.event_bus.emit(AppEvent::NotificationFanoutFailed {
                    message_id,
                    receiver_id,
                    error: e.to_string(),
                });
                (None, Some(e.to_string()))
            }
        };

        Ok(SendOutcome {
            message,
            notification,
            notification_error,
        })
    }

    /// List a receiver's inbox page, most recent first.
    ///
    /// `per_page` is clamped to `[1, 100]`; out-of-range `page` values are
    /// clamped into the valid page range rather than erroring.
    pub fn list(&self, receiver_id: i64, page: i64, per_page: i64) -> TlResult<PageResult<Message>> {
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let conn = self.database.conn()?;

        let total = queries::count_messages_for_receiver(&conn, receiver_id)?;
        let window = page_window(total, page, per_page);

        let items =
            queries::list_messages_for_receiver(&conn, receiver_id, window.offset, window.limit)?;

        debug!(
            receiver_id,
            page = window.page,
            pages = window.pages,
            total,
            "inbox page fetched"
        );
        Ok(PageResult::new(window, items))
    }

    /// List messages a user has sent, most recent first.
    pub fn list_sent(&self, sender_id: i64, page: i64, per_page: i64) -> TlResult<PageResult<Message>> {
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let conn = self.database.conn()?;

        let total = queries::count_messages_from_sender(&conn, sender_id)?;
        let window = page_window(total, page, per_page);

        let items =
            queries::list_messages_from_sender(&conn, sender_id, window.offset, window.limit)?;

        Ok(PageResult::new(window, items))
    }

    /// Case-insensitive substring search over subject and content, capped
    /// at `limit` results.
    ///
    /// An empty query is an explicit no-op returning no results.
    pub fn search(&self, query: &str, receiver_id: Option<i64>, limit: i64) -> TlResult<Vec<Message>> {
        let conn = self.database.conn()?;
        let results = queries::search_messages(&conn, query, receiver_id, limit.max(1))?;
        info!(
            query,
            hits = results.len(),
            "message search executed"
        );
        Ok(results)
    }

    /// Find a message by id.
    pub fn find(&self, message_id: i64) -> TlResult<Option<Message>> {
        let conn = self.database.conn()?;
        Message::find_by_id(&conn, message_id)
    }
}

/// Compose the notification text for a new message.
///
/// The subject leads when present, otherwise a content preview. The text
/// embeds raw user input; sanitization happens where it is rendered, not
/// here.
fn notification_text(sender_name: &str, message: &Message) -> String {
    let what = match &message.subject {
        Some(s) if !s.trim().is_empty() => s.clone(),
        _ => preview(&message.content, 80),
    };
    format!("New message from {sender_name}: {what}")
}

/// First `max_chars` characters of a string, with an ellipsis if truncated.
fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}

impl Service for MessageStore {
    fn name(&self) -> &str { "message_store" }
    fn state(&self) -> ServiceState { self.state }
    fn init(&mut self) -> TlResult<()> {
        self.state = ServiceState::Running;
        info!("message store initialized");
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
    use crate::directory::StaticDirectory;
    use tl_core::constants::SEARCH_RESULT_LIMIT;

    fn create_store() -> (MessageStore, tempfile::TempDir) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::init(&path, &tl_core::config::DatabaseConfig::default()).unwrap();

        let directory = Arc::new(StaticDirectory::new([
            (1, "alice".to_string()),
            (2, "bob".to_string()),
        ]));
        (MessageStore::new(db, directory, EventBus::new(16)), dir)
    }

    #[tokio::test]
    async fn test_send_persists_and_notifies() {
        let (store, _dir) = create_store();
        let outcome = store
            .send(1, 2, Some("Standup".into()), "moved to 10am")
            .await
            .unwrap();

        assert!(outcome.message.id.is_some());
        let notification = outcome.notification.unwrap();
        assert_eq!(notification.user_id, 2);
        assert!(!notification.is_read);
        assert_eq!(notification.related_message_id, outcome.message.id);
        assert!(notification.message.contains("alice"));
        assert!(notification.message.contains("Standup"));
    }

    #[tokio::test]
    async fn test_send_unknown_receiver_rejected() {
        let (store, _dir) = create_store();
        let err = store.send(1, 404, None, "hello").await.unwrap_err();
        match err {
            TlError::Validation { field, .. } => assert_eq!(field, "receiver_id"),
            other => panic!("expected validation error, got {other}"),
        }

        // Nothing persisted
        let page = store.list(404, 1, 10).unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_send_empty_content_rejected() {
        let (store, _dir) = create_store();
        let err = store.send(1, 2, None, "   ").await.unwrap_err();
        match err {
            TlError::Validation { field, .. } => assert_eq!(field, "content"),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_list_pagination_metadata() {
        let (store, _dir) = create_store();
        for i in 0..23 {
            store.send(1, 2, None, &format!("msg {i}")).await.unwrap();
        }

        let page = store.list(2, 1, 10).unwrap();
        assert_eq!(page.total, 23);
        assert_eq!(page.pages, 3);
        assert_eq!(page.items.len(), 10);

        let last = store.list(2, 3, 10).unwrap();
        assert_eq!(last.items.len(), 3);

        // Beyond the last page clamps rather than erroring
        let beyond = store.list(2, 99, 10).unwrap();
        assert_eq!(beyond.page, 3);
        assert_eq!(beyond.items.len(), 3);
    }

    #[tokio::test]
    async fn test_per_page_clamped_to_maximum() {
        let (store, _dir) = create_store();
        store.send(1, 2, None, "one").await.unwrap();

        let page = store.list(2, 1, 100_000).unwrap();
        assert_eq!(page.per_page, MAX_PER_PAGE);
    }

    #[tokio::test]
    async fn test_search_contract() {
        let (store, _dir) = create_store();
        store
            .send(1, 2, Some("Project Update".into()), "numbers attached")
            .await
            .unwrap();

        assert!(store.search("", None, SEARCH_RESULT_LIMIT).unwrap().is_empty());
        assert_eq!(store.search("proj", None, SEARCH_RESULT_LIMIT).unwrap().len(), 1);
        assert_eq!(store.search("proj", Some(2), SEARCH_RESULT_LIMIT).unwrap().len(), 1);
        assert!(store.search("proj", Some(1), SEARCH_RESULT_LIMIT).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_honors_caller_limit() {
        let (store, _dir) = create_store();
        for i in 0..5 {
            store.send(1, 2, None, &format!("status update {i}")).await.unwrap();
        }

        assert_eq!(store.search("status", Some(2), 3).unwrap().len(), 3);
        assert_eq!(store.search("status", Some(2), 100).unwrap().len(), 5);
    }

    #[test]
    fn test_notification_text_prefers_subject() {
        let with_subject = Message::new(1, 2, Some("Standup".into()), "long body".into());
        assert_eq!(
            notification_text("alice", &with_subject),
            "New message from alice: Standup"
        );

        let long_body = Message::new(1, 2, None, "x".repeat(200));
        let text = notification_text("alice", &long_body);
        assert!(text.ends_with("..."));
    }
}
