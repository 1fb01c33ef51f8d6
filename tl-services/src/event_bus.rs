//! Typed event bus for intra-service communication.
//!
//! Uses tokio broadcast channels to decouple services from one another.
//! Any service can emit events without knowing who is listening, and any
//! number of subscribers can independently consume events.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

/// All application-level event types that flow through the event bus.
///
/// These represent processed, application-meaningful state changes that
/// other services (or future consumers such as a polling UI) care about.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A message was persisted for a receiver.
    MessageSent {
        message_id: i64,
        sender_id: i64,
        receiver_id: i64,
    },
    /// A notification row was created.
    NotificationCreated {
        notification_id: i64,
        user_id: i64,
        related_message_id: Option<i64>,
    },
    /// The best-effort notification fan-out for a send did not complete.
    NotificationFanoutFailed {
        message_id: i64,
        receiver_id: i64,
        error: String,
    },
    /// One or more notifications transitioned to read.
    NotificationsRead {
        user_id: i64,
        read_count: usize,
        failed_count: usize,
    },
}

/// Application-wide event bus backed by a tokio broadcast channel.
///
/// Designed for fan-out delivery: every subscriber gets every event.
/// Slow subscribers that fall behind will receive a `Lagged` error
/// and may miss events, which is acceptable for polling consumers.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<AppEvent>>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Subscribe to receive application events.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: AppEvent) {
        let label = event_label(&event);
        match self.sender.send(event) {
            Ok(count) => {
                debug!("event_bus: emitted {label} to {count} subscriber(s)");
            }
            Err(_) => {
                debug!("event_bus: no subscribers for {label}");
            }
        }
    }

    /// Get the current number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Human-readable label for an event (for logging).
fn event_label(event: &AppEvent) -> &'static str {
    match event {
        AppEvent::MessageSent { .. } => "MessageSent",
        AppEvent::NotificationCreated { .. } => "NotificationCreated",
        AppEvent::NotificationFanoutFailed { .. } => "NotificationFanoutFailed",
        AppEvent::NotificationsRead { .. } => "NotificationsRead",
    }
}
