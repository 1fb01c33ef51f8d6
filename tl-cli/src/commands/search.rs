//! Search command.

use console::style;

use tl_core::config::ConfigHandle;
use tl_core::error::TlResult;

use crate::OutputFormat;

pub async fn run(
    config: ConfigHandle,
    query: String,
    user: Option<i64>,
    format: OutputFormat,
) -> TlResult<()> {
    let (inbox, _db) = super::init_inbox(&config).await?;

    let messages = inbox.search(&query, user).await?;

    match format {
        OutputFormat::Json => {
            let json: Vec<_> = messages
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "id": m.id,
                        "sender_id": m.sender_id,
                        "receiver_id": m.receiver_id,
                        "subject": m.subject,
                        "content": m.content,
                        "created_at": m.created_at,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        OutputFormat::Text => {
            if messages.is_empty() {
                println!("No messages matching \"{query}\".");
                return Ok(());
            }

            let scope = user
                .map(|u| format!(" in user {u}'s inbox"))
                .unwrap_or_default();
            println!("{} result(s) for \"{query}\"{scope}\n", messages.len());
            for msg in &messages {
                let date = &msg.created_at;
                let date_short = if date.len() > 19 { &date[..19] } else { date };
                println!(
                    "  {} {} {} -> {}: {}",
                    style(msg.id.unwrap_or(0)).dim(),
                    style(date_short).dim(),
                    style(msg.sender_id).bold(),
                    msg.receiver_id,
                    super::truncate(&msg.content, 70)
                );
            }
        }
    }

    Ok(())
}
