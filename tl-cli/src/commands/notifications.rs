//! Notification commands.

use clap::Subcommand;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;

use tl_core::config::ConfigHandle;
use tl_core::error::TlResult;
use tl_models::Notification;
use tl_services::{EventBus, NotificationDispatcher, ReadStateTracker};

use crate::OutputFormat;

#[derive(Subcommand)]
pub enum NotificationsAction {
    /// List all notifications for a user, unread first. Viewing marks
    /// unread notifications as read unless --no-mark is given.
    List {
        /// User ID.
        user: i64,
        /// Leave read state untouched.
        #[arg(long)]
        no_mark: bool,
    },
    /// Show only unread notifications.
    Unread {
        /// User ID.
        user: i64,
    },
    /// Mark one notification as read.
    MarkRead {
        /// Notification ID.
        id: i64,
    },
    /// Mark every unread notification for a user as read.
    MarkAll {
        /// User ID.
        user: i64,
    },
}

pub async fn run(
    config: ConfigHandle,
    action: NotificationsAction,
    format: OutputFormat,
) -> TlResult<()> {
    match action {
        NotificationsAction::List { user, no_mark } => {
            if no_mark {
                config.write().await.inbox.auto_mark_on_view = false;
            }
            let (inbox, _db) = super::init_inbox(&config).await?;

            let feed = inbox.fetch_notifications(user).await?;
            print_notifications(&feed.notifications, format);

            if !feed.read_failures.is_empty() {
                println!(
                    "  {} {} notification(s) could not be marked read",
                    style("WARN").yellow().bold(),
                    feed.read_failures.len()
                );
            }
        }
        NotificationsAction::Unread { user } => {
            let db = super::init_database(&config).await?;
            let dispatcher = NotificationDispatcher::new(db, EventBus::new(64));
            let notifications = dispatcher.unread(user)?;
            print_notifications(&notifications, format);
        }
        NotificationsAction::MarkRead { id } => {
            let db = super::init_database(&config).await?;
            let tracker = ReadStateTracker::new(db, EventBus::new(64));
            let (notification, _) = tracker.mark_read(id)?;
            match format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::json!({
                            "id": notification.id,
                            "is_read": notification.is_read,
                        })
                    );
                }
                OutputFormat::Text => {
                    println!(
                        "  {} Notification {} marked as read",
                        style("OK").green().bold(),
                        id
                    );
                }
            }
        }
        NotificationsAction::MarkAll { user } => {
            let db = super::init_database(&config).await?;
            let tracker = ReadStateTracker::new(db, EventBus::new(64));
            let outcome = tracker.mark_all_unread_as_read(user).await?;
            match format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::json!({
                            "read": outcome.succeeded,
                            "failed": outcome.failed,
                        })
                    );
                }
                OutputFormat::Text => {
                    println!(
                        "  {} {} notification(s) marked as read",
                        style("OK").green().bold(),
                        outcome.succeeded.len()
                    );
                    for (id, err) in &outcome.failed {
                        println!(
                            "  {} notification {}: {}",
                            style("FAIL").red().bold(),
                            id,
                            err
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_notifications(notifications: &[Notification], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let json: Vec<_> = notifications
                .iter()
                .map(|n| {
                    serde_json::json!({
                        "id": n.id,
                        "message": n.message,
                        "related_message_id": n.related_message_id,
                        "is_read": n.is_read,
                        "created_at": n.created_at,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        OutputFormat::Text => {
            if notifications.is_empty() {
                println!("No notifications.");
                return;
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(vec!["ID", "", "Notification", "Date"]);
            for n in notifications {
                let marker = if n.is_read { "" } else { "*" };
                let date_short = if n.created_at.len() > 19 {
                    &n.created_at[..19]
                } else {
                    &n.created_at
                };
                table.add_row(vec![
                    n.id.map(|i| i.to_string()).unwrap_or_default(),
                    marker.to_string(),
                    super::truncate(&n.message, 60),
                    date_short.to_string(),
                ]);
            }
            println!("{table}");
        }
    }
}
