//! Directory user commands.

use clap::Subcommand;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;

use tl_core::config::ConfigHandle;
use tl_core::error::TlResult;
use tl_models::User;

use crate::OutputFormat;

#[derive(Subcommand)]
pub enum UsersAction {
    /// List all directory users.
    List,
    /// Add a user to the directory.
    Add {
        /// Username (must be unique).
        username: String,
    },
}

pub async fn run(config: ConfigHandle, action: UsersAction, format: OutputFormat) -> TlResult<()> {
    let db = super::init_database(&config).await?;
    let conn = db.conn()?;

    match action {
        UsersAction::List => {
            let users = User::list(&conn)?;
            match format {
                OutputFormat::Json => {
                    let json: Vec<_> = users
                        .iter()
                        .map(|u| {
                            serde_json::json!({
                                "id": u.id,
                                "username": u.username,
                                "created_at": u.created_at,
                            })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
                }
                OutputFormat::Text => {
                    if users.is_empty() {
                        println!("No users.");
                        return Ok(());
                    }
                    let mut table = Table::new();
                    table
                        .load_preset(UTF8_FULL)
                        .apply_modifier(UTF8_ROUND_CORNERS)
                        .set_content_arrangement(ContentArrangement::Dynamic);
                    table.set_header(vec!["ID", "Username", "Created"]);
                    for u in &users {
                        let date_short = if u.created_at.len() > 19 {
                            &u.created_at[..19]
                        } else {
                            &u.created_at
                        };
                        table.add_row(vec![
                            u.id.map(|i| i.to_string()).unwrap_or_default(),
                            u.username.clone(),
                            date_short.to_string(),
                        ]);
                    }
                    println!("{table}");
                }
            }
        }
        UsersAction::Add { username } => {
            let mut user = User::new(&username);
            let id = user.save(&conn)?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({"id": id, "username": username}));
                }
                OutputFormat::Text => {
                    println!(
                        "  {} User \"{}\" created with id {}",
                        style("OK").green().bold(),
                        username,
                        id
                    );
                }
            }
        }
    }

    Ok(())
}
