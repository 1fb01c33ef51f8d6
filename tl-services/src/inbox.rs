//! Inbox facade: the read surface callers render from.
//!
//! Everything returned here has passed through the content sanitizer, so a
//! caller can place it in markup directly. Storage keeps the raw text; only
//! this boundary escapes it.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use tracing::info;

use tl_core::config::ConfigHandle;
use tl_core::error::TlResult;
use tl_core::paging::PageResult;
use tl_core::sanitize::sanitize;
use tl_models::{Database, Message, Notification};

use crate::directory::UserDirectory;
use crate::event_bus::EventBus;
use crate::message::{MessageStore, SendOutcome};
use crate::notification::NotificationDispatcher;
use crate::read_state::ReadStateTracker;
use crate::service::{Service, ServiceState};

/// A notification feed after a view.
///
/// When viewing auto-marks, `read_failures` carries any ids that could not
/// be transitioned; the feed itself still reflects what the user saw.
#[derive(Debug, Serialize)]
pub struct NotificationFeed {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
    pub read_failures: HashMap<i64, String>,
}

/// High-level inbox operations composing the store, dispatcher, and
/// read-state tracker behind one surface.
pub struct InboxService {
    state: ServiceState,
    store: MessageStore,
    dispatcher: NotificationDispatcher,
    tracker: ReadStateTracker,
    config: ConfigHandle,
}

impl InboxService {
    /// Wire up the inbox over a database and user directory.
    pub fn new(
        database: Database,
        directory: Arc<dyn UserDirectory>,
        event_bus: EventBus,
        config: ConfigHandle,
    ) -> Self {
        Self {
            state: ServiceState::Created,
            store: MessageStore::new(database.clone(), directory, event_bus.clone()),
            dispatcher: NotificationDispatcher::new(database.clone(), event_bus.clone()),
            tracker: ReadStateTracker::new(database, event_bus),
            config,
        }
    }

    /// Send a message. Input is stored raw; sanitization happens on read.
    pub async fn send(
        &self,
        sender_id: i64,
        receiver_id: i64,
        subject: Option<String>,
        content: &str,
    ) -> TlResult<SendOutcome> {
        self.store.send(sender_id, receiver_id, subject, content).await
    }

    /// Fetch one sanitized page of a user's inbox.
    ///
    /// Missing `page` defaults to the first; missing `per_page` falls back
    /// to the configured default.
    pub async fn fetch_page(
        &self,
        user_id: i64,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> TlResult<PageResult<Message>> {
        let (default_per_page, max_per_page) = {
            let cfg = self.config.read().await;
            (cfg.inbox.default_per_page, cfg.inbox.max_per_page)
        };
        let per_page = per_page.unwrap_or(default_per_page).min(max_per_page);

        let page = self.store.list(user_id, page.unwrap_or(1), per_page)?;
        Ok(page.map(sanitize_message))
    }

    /// Fetch a user's notification feed, unread first.
    ///
    /// When `auto_mark_on_view` is enabled, viewing the feed marks every
    /// unread notification read. `unread_count` reports the count as it was
    /// on entry; the returned rows reflect the post-mark read state.
    pub async fn fetch_notifications(&self, user_id: i64) -> TlResult<NotificationFeed> {
        let mut notifications = self.dispatcher.list(user_id)?;
        let unread_count = notifications.iter().filter(|n| !n.is_read).count() as i64;

        let auto_mark = self.config.read().await.inbox.auto_mark_on_view;
        let read_failures = if auto_mark && unread_count > 0 {
            let outcome = self.tracker.mark_all_unread_as_read(user_id).await?;
            // Re-list so the rows carry their settled read state.
            notifications = self.dispatcher.list(user_id)?;
            outcome.failed
        } else {
            HashMap::new()
        };

        info!(user_id, unread_count, "notification feed viewed");
        Ok(NotificationFeed {
            notifications: notifications.into_iter().map(sanitize_notification).collect(),
            unread_count,
            read_failures,
        })
    }

    /// Number of unread notifications, without marking anything.
    pub fn unread_count(&self, user_id: i64) -> TlResult<i64> {
        self.dispatcher.unread_count(user_id)
    }

    /// Sanitized search over a user's messages, or over all messages when
    /// `receiver_id` is `None`. Result count is capped by the configured
    /// search limit.
    pub async fn search(&self, query: &str, receiver_id: Option<i64>) -> TlResult<Vec<Message>> {
        let limit = self.config.read().await.inbox.search_limit;
        let results = self.store.search(query, receiver_id, limit)?;
        Ok(results.into_iter().map(sanitize_message).collect())
    }

    /// Mark one notification read without viewing the feed.
    pub fn mark_read(&self, notification_id: i64) -> TlResult<Notification> {
        let (notification, _) = self.tracker.mark_read(notification_id)?;
        Ok(notification)
    }
}

fn sanitize_message(mut m: Message) -> Message {
    m.content = sanitize(&m.content);
    m.subject = m.subject.map(|s| sanitize(&s));
    m
}

fn sanitize_notification(mut n: Notification) -> Notification {
    n.message = sanitize(&n.message);
    n
}

impl Service for InboxService {
    fn name(&self) -> &str { "inbox" }
    fn state(&self) -> ServiceState { self.state }
    fn init(&mut self) -> TlResult<()> {
        self.store.init()?;
        self.dispatcher.init()?;
        self.tracker.init()?;
        self.state = ServiceState::Running;
        info!("inbox service initialized");
        Ok(())
    }
    fn shutdown(&mut self) -> TlResult<()> {
        self.tracker.shutdown()?;
        self.dispatcher.shutdown()?;
        self.store.shutdown()?;
        self.state = ServiceState::Stopped;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::StaticDirectory;
    use tempfile::TempDir;
    use tl_core::config::{AppConfig, DatabaseConfig};

    fn create_inbox(config: AppConfig) -> (InboxService, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::init(&path, &DatabaseConfig::default()).unwrap();
        let directory = Arc::new(StaticDirectory::new([
            (1, "alice".to_string()),
            (2, "bob".to_string()),
        ]));
        let inbox = InboxService::new(db, directory, EventBus::new(16), ConfigHandle::new(config));
        (inbox, dir)
    }

    #[tokio::test]
    async fn test_fetch_page_sanitizes_content() {
        let (inbox, _dir) = create_inbox(AppConfig::default());
        inbox
            .send(1, 2, None, "<script>alert(1)</script>Hi <b>team</b>")
            .await
            .unwrap();

        let page = inbox.fetch_page(2, None, None).await.unwrap();
        assert_eq!(
            page.items[0].content,
            "&lt;script&gt;alert(1)&lt;/script&gt;Hi <b>team</b>"
        );
    }

    #[tokio::test]
    async fn test_auto_mark_on_view() {
        let (inbox, _dir) = create_inbox(AppConfig::default());
        inbox.send(1, 2, Some("hi".into()), "body").await.unwrap();

        assert_eq!(inbox.unread_count(2).unwrap(), 1);

        let feed = inbox.fetch_notifications(2).await.unwrap();
        assert_eq!(feed.unread_count, 1);
        assert!(feed.read_failures.is_empty());
        // Returned rows already reflect the auto-mark
        assert!(feed.notifications.iter().all(|n| n.is_read));

        // Viewing consumed the unread state
        let again = inbox.fetch_notifications(2).await.unwrap();
        assert_eq!(again.unread_count, 0);
        assert_eq!(inbox.unread_count(2).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_auto_mark_disabled() {
        let mut config = AppConfig::default();
        config.inbox.auto_mark_on_view = false;
        let (inbox, _dir) = create_inbox(config);
        inbox.send(1, 2, None, "body").await.unwrap();

        inbox.fetch_notifications(2).await.unwrap();
        assert_eq!(inbox.unread_count(2).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_search_sanitizes() {
        let (inbox, _dir) = create_inbox(AppConfig::default());
        inbox
            .send(1, 2, Some("report".into()), "see <img src=x onerror=alert(1)>")
            .await
            .unwrap();

        let hits = inbox.search("report", Some(2)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].content.contains("&lt;img"));
        assert!(!hits[0].content.contains("<img"));
    }

    #[tokio::test]
    async fn test_search_respects_configured_limit() {
        let mut config = AppConfig::default();
        config.inbox.search_limit = 1;
        let (inbox, _dir) = create_inbox(config);
        inbox.send(1, 2, None, "meeting notes one").await.unwrap();
        inbox.send(1, 2, None, "meeting notes two").await.unwrap();

        let hits = inbox.search("meeting", Some(2)).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_search_limit_above_default_takes_effect() {
        let mut config = AppConfig::default();
        config.inbox.search_limit = 60;
        let (inbox, _dir) = create_inbox(config);
        for i in 0..55 {
            inbox
                .send(1, 2, None, &format!("weekly digest {i}"))
                .await
                .unwrap();
        }

        let hits = inbox.search("digest", Some(2)).await.unwrap();
        assert_eq!(hits.len(), 55);
    }

    #[tokio::test]
    async fn test_fetch_page_respects_configured_max() {
        let mut config = AppConfig::default();
        config.inbox.max_per_page = 5;
        let (inbox, _dir) = create_inbox(config);
        inbox.send(1, 2, None, "one").await.unwrap();

        let page = inbox.fetch_page(2, None, Some(50)).await.unwrap();
        assert_eq!(page.per_page, 5);
    }
}
