//! Integration tests for the inbox services over a real database.

mod common;

use std::sync::Arc;

use tl_core::constants::MAX_PER_PAGE;
use tl_core::error::TlError;
use tl_models::Notification;
use tl_services::{
    AppEvent, InboxService, MessageStore, ReadStateTracker, ServiceRegistry, SqliteDirectory,
};

use common::{
    create_test_config_handle, create_test_db, create_test_event_bus, seed_messages, seed_users,
};

fn create_inbox() -> (InboxService, tempfile::TempDir) {
    let (db, dir) = create_test_db();
    seed_users(&db);
    let directory = Arc::new(SqliteDirectory::new(db.clone()));
    let inbox = InboxService::new(
        db,
        directory,
        create_test_event_bus(),
        create_test_config_handle(),
    );
    (inbox, dir)
}

#[tokio::test]
async fn test_send_view_mark_cycle() {
    let (inbox, _dir) = create_inbox();

    // alice sends bob a message with markup in it
    let outcome = inbox
        .send(
            1,
            2,
            Some("<b>Deploy</b> plan".into()),
            "Ship <i>tonight</i>, rollback steps: <script>alert(1)</script>",
        )
        .await
        .unwrap();
    assert!(outcome.notification.is_some());
    assert!(outcome.notification_error.is_none());

    // Bob's inbox page keeps the inline formatting but neutralizes the rest
    let page = inbox.fetch_page(2, None, None).await.unwrap();
    assert_eq!(page.total, 1);
    let msg = &page.items[0];
    assert_eq!(msg.subject.as_deref(), Some("<b>Deploy</b> plan"));
    assert!(msg.content.contains("<i>tonight</i>"));
    assert!(msg.content.contains("&lt;script&gt;"));
    assert!(!msg.content.contains("<script>"));

    // One unread notification, consumed by viewing the feed
    assert_eq!(inbox.unread_count(2).unwrap(), 1);
    let feed = inbox.fetch_notifications(2).await.unwrap();
    assert_eq!(feed.unread_count, 1);
    assert!(feed.read_failures.is_empty());
    assert!(feed.notifications[0].message.contains("alice"));
    assert!(feed.notifications[0].is_read);

    let again = inbox.fetch_notifications(2).await.unwrap();
    assert_eq!(again.unread_count, 0);
    assert_eq!(inbox.unread_count(2).unwrap(), 0);
}

#[tokio::test]
async fn test_send_to_unknown_receiver() {
    let (inbox, _dir) = create_inbox();

    let err = inbox.send(1, 999, None, "hello?").await.unwrap_err();
    assert!(matches!(err, TlError::Validation { .. }));

    // No orphan rows got written
    let page = inbox.fetch_page(999, None, None).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_inbox_pagination() {
    let (db, _dir) = create_test_db();
    seed_users(&db);
    seed_messages(&db, 25);
    let directory = Arc::new(SqliteDirectory::new(db.clone()));
    let inbox = InboxService::new(
        db,
        directory,
        create_test_event_bus(),
        create_test_config_handle(),
    );

    let first = inbox.fetch_page(2, Some(1), Some(10)).await.unwrap();
    assert_eq!(first.total, 25);
    assert_eq!(first.pages, 3);
    assert_eq!(first.items.len(), 10);
    // Most recent first
    assert_eq!(first.items[0].subject.as_deref(), Some("Subject 25"));

    let last = inbox.fetch_page(2, Some(3), Some(10)).await.unwrap();
    assert_eq!(last.items.len(), 5);

    // Out-of-range page clamps to the last page
    let beyond = inbox.fetch_page(2, Some(50), Some(10)).await.unwrap();
    assert_eq!(beyond.page, 3);
    assert_eq!(beyond.items.len(), 5);

    // Oversized per_page is capped
    let capped = inbox.fetch_page(2, Some(1), Some(10_000)).await.unwrap();
    assert_eq!(capped.per_page, MAX_PER_PAGE);

}

#[tokio::test]
async fn test_search_scoped_to_receiver() {
    let (inbox, _dir) = create_inbox();
    inbox
        .send(1, 2, Some("Quarterly report".into()), "numbers for bob")
        .await
        .unwrap();
    inbox
        .send(2, 3, Some("Quarterly notes".into()), "numbers for carol")
        .await
        .unwrap();

    let all = inbox.search("quarterly", None).await.unwrap();
    assert_eq!(all.len(), 2);

    let bobs = inbox.search("quarterly", Some(2)).await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].receiver_id, 2);

    // Empty query is a no-op
    assert!(inbox.search("   ", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bulk_mark_read_partial_failure() {
    let (db, _dir) = create_test_db();
    seed_users(&db);
    let tracker = ReadStateTracker::new(db.clone(), create_test_event_bus());

    let mut ids = Vec::new();
    {
        let conn = db.conn().unwrap();
        for i in 0..4 {
            let id = Notification::new(2, format!("event {i}"), None)
                .save(&conn)
                .unwrap();
            ids.push(id);
        }
    }
    ids.push(424242); // does not exist

    let outcome = tracker.mark_read_many(ids.clone()).await;
    assert_eq!(outcome.succeeded.len(), 4);
    assert_eq!(outcome.failed.len(), 1);
    assert!(outcome.failed[&424242].contains("424242"));

    // The four real notifications are read despite the bad id
    let conn = db.conn().unwrap();
    for id in &ids[..4] {
        let n = Notification::find_by_id(&conn, *id).unwrap().unwrap();
        assert!(n.is_read);
    }
}

#[tokio::test]
async fn test_send_emits_events() {
    let (db, _dir) = create_test_db();
    seed_users(&db);
    let bus = create_test_event_bus();
    let mut rx = bus.subscribe();

    let directory = Arc::new(SqliteDirectory::new(db.clone()));
    let store = MessageStore::new(db, directory, bus);

    let outcome = store.send(1, 2, None, "ping").await.unwrap();

    match rx.try_recv().unwrap() {
        AppEvent::MessageSent {
            message_id,
            sender_id,
            receiver_id,
        } => {
            assert_eq!(Some(message_id), outcome.message.id);
            assert_eq!(sender_id, 1);
            assert_eq!(receiver_id, 2);
        }
        other => panic!("unexpected event {other:?}"),
    }

    match rx.try_recv().unwrap() {
        AppEvent::NotificationCreated {
            user_id,
            related_message_id,
            ..
        } => {
            assert_eq!(user_id, 2);
            assert_eq!(related_message_id, outcome.message.id);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_registry_lifecycle() {
    let (db, _dir) = create_test_db();
    let mut registry = ServiceRegistry::new(create_test_config_handle(), db);
    registry.register_all();
    assert_eq!(registry.service_count(), 4);

    registry.init_all().await.unwrap();
    for (name, _, healthy) in registry.health_check().await {
        assert!(healthy, "service {name} is not healthy");
    }
    registry.shutdown_all().await.unwrap();
}
