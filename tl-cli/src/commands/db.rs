//! Database management commands.

use clap::Subcommand;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;

use tl_core::config::ConfigHandle;
use tl_core::error::TlResult;

use crate::OutputFormat;

#[derive(Subcommand)]
pub enum DbAction {
    /// Show database statistics.
    Stats,
    /// Run an integrity check.
    Check,
    /// Reset the database (WARNING: destroys all data).
    Reset,
    /// Show the database file path.
    Path,
}

pub async fn run(config: ConfigHandle, action: DbAction, format: OutputFormat) -> TlResult<()> {
    let db_path = config.read().await.effective_db_path()?;

    match action {
        DbAction::Stats => {
            let db = super::init_database(&config).await?;
            let stats = db.stats()?;

            let file_size = std::fs::metadata(&db_path).ok().map(|m| m.len());
            let wal_path = db_path.with_extension("db-wal");
            let wal_size = std::fs::metadata(&wal_path).ok().map(|m| m.len());

            let conn = db.conn()?;
            let journal_mode: String = conn
                .query_row("PRAGMA journal_mode", [], |row| row.get(0))
                .unwrap_or_else(|_| "unknown".to_string());

            match format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::json!({
                            "path": db_path.display().to_string(),
                            "tables": {
                                "users": stats.users,
                                "messages": stats.messages,
                                "notifications": stats.notifications,
                            },
                            "unread_notifications": stats.unread_notifications,
                            "file_size_bytes": file_size,
                            "wal_size_bytes": wal_size,
                            "journal_mode": journal_mode,
                        })
                    );
                }
                OutputFormat::Text => {
                    println!("{}", style("Database Statistics").bold().underlined());
                    println!("  Path:          {}", db_path.display());
                    println!("  Journal mode:  {}", journal_mode);
                    println!();

                    let mut table = Table::new();
                    table
                        .load_preset(UTF8_FULL)
                        .apply_modifier(UTF8_ROUND_CORNERS)
                        .set_content_arrangement(ContentArrangement::Dynamic);

                    table.set_header(vec!["Table", "Row Count"]);
                    table.add_row(vec!["users".to_string(), stats.users.to_string()]);
                    table.add_row(vec!["messages".to_string(), stats.messages.to_string()]);
                    table.add_row(vec![
                        "notifications".to_string(),
                        stats.notifications.to_string(),
                    ]);
                    println!("{table}");

                    println!(
                        "\n  Unread notifications: {}",
                        stats.unread_notifications
                    );
                    if let Some(size) = file_size {
                        println!("  Database size:        {}", super::format_bytes(size));
                    }
                    if let Some(size) = wal_size {
                        println!("  WAL file size:        {}", super::format_bytes(size));
                    }
                }
            }
        }
        DbAction::Check => {
            println!("  {} Running integrity check...", style("...").dim());
            let db = super::init_database(&config).await?;

            match db.run_integrity_check() {
                Ok(()) => {
                    println!("  {} Integrity check passed.", style("OK").green().bold());
                }
                Err(e) => {
                    println!(
                        "  {} Integrity check failed: {}",
                        style("FAIL").red().bold(),
                        e
                    );
                }
            }
        }
        DbAction::Reset => {
            println!(
                "  {} This will delete ALL local data.",
                style("WARNING").red().bold()
            );
            println!("  Database: {}", db_path.display());

            let confirmed = Confirm::new()
                .with_prompt("  Are you sure you want to reset the database?")
                .default(false)
                .interact()
                .unwrap_or(false);

            if !confirmed {
                println!("  Reset cancelled.");
                return Ok(());
            }

            let db = super::init_database(&config).await?;
            db.reset()?;
            println!("  {} Database reset complete.", style("OK").green().bold());
        }
        DbAction::Path => match format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"path": db_path.display().to_string()})
                );
            }
            OutputFormat::Text => {
                println!("{}", db_path.display());
            }
        },
    }

    Ok(())
}
