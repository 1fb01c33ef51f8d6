//! Read-state tracker: idempotent mark-read, single and bulk.
//!
//! Bulk marking runs one compare-and-set per notification on blocking
//! worker threads, each with its own pooled connection. There is no bulk
//! transaction: a failure on one id never rolls back the others, and the
//! outcome reports per-id results.

use std::collections::HashMap;

use serde::Serialize;

use tokio::task::JoinSet;
use tracing::{info, warn};

use tl_core::error::{TlError, TlResult};
use tl_models::queries;
use tl_models::{Database, Notification, ReadTransition};

use crate::event_bus::{AppEvent, EventBus};
use crate::service::{Service, ServiceState};

/// Per-id results of a bulk mark-read.
///
/// `succeeded` holds every id now known to be read, whether this call
/// performed the transition or found it already done. `failed` maps each
/// remaining id to the error that stopped it.
#[derive(Debug, Default, Serialize)]
pub struct BulkReadOutcome {
    pub succeeded: Vec<i64>,
    pub failed: HashMap<i64, String>,
}

impl BulkReadOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Service owning notification read-state transitions.
#[derive(Clone)]
pub struct ReadStateTracker {
    state: ServiceState,
    database: Database,
    event_bus: EventBus,
}

impl ReadStateTracker {
    /// Create a new ReadStateTracker.
    pub fn new(database: Database, event_bus: EventBus) -> Self {
        Self {
            state: ServiceState::Created,
            database,
            event_bus,
        }
    }

    /// Mark one notification read. Idempotent: marking an already-read
    /// notification succeeds without changing anything.
    pub fn mark_read(&self, notification_id: i64) -> TlResult<(Notification, ReadTransition)> {
        let conn = self.database.conn()?;
        Notification::mark_read(&conn, notification_id)
    }

    /// Mark a batch of notifications read, one compare-and-set each, run
    /// concurrently. Partial failure is expected and reported per id.
    pub async fn mark_read_many(&self, ids: Vec<i64>) -> BulkReadOutcome {
        let mut tasks: JoinSet<(i64, TlResult<(Notification, ReadTransition)>)> = JoinSet::new();
        for id in ids {
            let database = self.database.clone();
            tasks.spawn_blocking(move || {
                let result = database
                    .conn()
                    .and_then(|conn| Notification::mark_read(&conn, id));
                (id, result)
            });
        }

        let mut outcome = BulkReadOutcome::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Ok(_))) => outcome.succeeded.push(id),
                Ok((id, Err(e))) => {
                    warn!(notification_id = id, "mark-read failed: {e}");
                    outcome.failed.insert(id, e.to_string());
                }
                Err(e) => {
                    // Task panicked or was cancelled; the id is lost with it
                    warn!("mark-read worker failed to join: {e}");
                }
            }
        }
        outcome.succeeded.sort_unstable();
        outcome
    }

    /// Mark every currently-unread notification for `user_id` as read.
    ///
    /// The unread set is snapshotted first; notifications created after the
    /// snapshot stay unread. Emits a summary event with per-call counts.
    pub async fn mark_all_unread_as_read(&self, user_id: i64) -> TlResult<BulkReadOutcome> {
        let ids = {
            let conn = self.database.conn()?;
            queries::unread_notification_ids(&conn, user_id)?
        };

        let outcome = self.mark_read_many(ids).await;
        info!(
            user_id,
            read = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "marked unread notifications as read"
        );
        self.event_bus.emit(AppEvent::NotificationsRead {
            user_id,
            read_count: outcome.succeeded.len(),
            failed_count: outcome.failed.len(),
        });
        Ok(outcome)
    }
}

impl Service for ReadStateTracker {
    fn name(&self) -> &str { "read_state_tracker" }
    fn state(&self) -> ServiceState { self.state }
    fn init(&mut self) -> TlResult<()> {
        self.state = ServiceState::Running;
        info!("read state tracker initialized");
        Ok(())
    }
    fn shutdown(&mut self) -> TlResult<()> {
        self.state = ServiceState::Stopped;
        Ok(())
    }
}
