//! Send command.

use console::style;

use tl_core::config::ConfigHandle;
use tl_core::error::TlResult;

use crate::OutputFormat;

pub async fn run(
    config: ConfigHandle,
    from: i64,
    to: i64,
    subject: Option<String>,
    text: String,
    format: OutputFormat,
) -> TlResult<()> {
    let (inbox, _db) = super::init_inbox(&config).await?;

    let outcome = inbox.send(from, to, subject, &text).await?;
    let message_id = outcome.message.id.unwrap_or(0);

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "message_id": message_id,
                    "sender_id": outcome.message.sender_id,
                    "receiver_id": outcome.message.receiver_id,
                    "notification_id": outcome.notification.as_ref().and_then(|n| n.id),
                    "notification_error": outcome.notification_error,
                })
            );
        }
        OutputFormat::Text => {
            println!(
                "  {} Message {} sent to user {}",
                style("OK").green().bold(),
                message_id,
                to
            );
            if let Some(err) = &outcome.notification_error {
                println!(
                    "  {} Message stored but notification failed: {}",
                    style("WARN").yellow().bold(),
                    err
                );
            }
        }
    }

    Ok(())
}
