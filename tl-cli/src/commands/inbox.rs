//! Inbox command.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;

use tl_core::config::ConfigHandle;
use tl_core::error::TlResult;

use crate::OutputFormat;

pub async fn run(
    config: ConfigHandle,
    user: i64,
    page: i64,
    per_page: Option<i64>,
    format: OutputFormat,
) -> TlResult<()> {
    let (inbox, _db) = super::init_inbox(&config).await?;

    let result = inbox.fetch_page(user, Some(page), per_page).await?;
    let unread = inbox.unread_count(user)?;

    match format {
        OutputFormat::Json => {
            let items: Vec<_> = result
                .items
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "id": m.id,
                        "sender_id": m.sender_id,
                        "subject": m.subject,
                        "content": m.content,
                        "created_at": m.created_at,
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::json!({
                    "items": items,
                    "page": result.page,
                    "per_page": result.per_page,
                    "total": result.total,
                    "pages": result.pages,
                    "unread_notifications": unread,
                })
            );
        }
        OutputFormat::Text => {
            if result.items.is_empty() {
                println!("No messages.");
                return Ok(());
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(vec!["ID", "From", "Subject", "Content", "Date"]);
            for msg in &result.items {
                let date = &msg.created_at;
                let date_short = if date.len() > 19 { &date[..19] } else { date };
                table.add_row(vec![
                    msg.id.map(|i| i.to_string()).unwrap_or_default(),
                    msg.sender_id.to_string(),
                    msg.subject.clone().unwrap_or_else(|| "-".to_string()),
                    super::truncate(&msg.content, 50),
                    date_short.to_string(),
                ]);
            }

            println!("{table}");
            println!(
                "\nPage {}/{} ({} total messages)",
                result.page, result.pages, result.total
            );
            if unread > 0 {
                println!(
                    "{} unread notification(s); run `teamline notifications list {user}`",
                    style(unread).yellow().bold()
                );
            }
        }
    }

    Ok(())
}
