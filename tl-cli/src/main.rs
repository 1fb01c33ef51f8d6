//! Teamline CLI - Command-line interface for the Teamline inbox.
//!
//! Provides a fully functional CLI for the messaging and notification
//! subsystem: sending messages, reading a paginated inbox, searching, and
//! managing notification read state from the terminal.

mod commands;

use clap::{Parser, Subcommand};
use tracing::info;

use tl_core::config::{AppConfig, ConfigHandle};
use tl_core::error::TlResult;
use tl_core::logging;
use tl_core::platform::Platform;

/// Teamline - team messaging and notifications.
#[derive(Parser)]
#[command(
    name = "teamline",
    version,
    about = "Teamline inbox CLI",
    long_about = "A command-line interface for the Teamline messaging subsystem.\n\
                   Send messages between users, browse paginated inboxes, search, and\n\
                   manage notification read state."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message to another user.
    Send {
        /// Sender user ID.
        #[arg(short = 'F', long)]
        from: i64,
        /// Receiver user ID.
        #[arg(short, long)]
        to: i64,
        /// Optional subject line.
        #[arg(short, long)]
        subject: Option<String>,
        /// Message body.
        text: String,
    },
    /// Show a user's inbox, most recent first.
    Inbox {
        /// User ID whose inbox to show.
        user: i64,
        /// Page number (1-based).
        #[arg(short, long, default_value = "1")]
        page: i64,
        /// Messages per page.
        #[arg(short = 'n', long)]
        per_page: Option<i64>,
    },
    /// Search messages by text.
    Search {
        /// Search query.
        query: String,
        /// Limit search to one user's inbox.
        #[arg(short, long)]
        user: Option<i64>,
    },
    /// View and manage notifications.
    Notifications {
        #[command(subcommand)]
        action: commands::notifications::NotificationsAction,
    },
    /// Manage directory users.
    Users {
        #[command(subcommand)]
        action: commands::users::UsersAction,
    },
    /// Database management commands.
    Db {
        #[command(subcommand)]
        action: commands::db::DbAction,
    },
}

#[tokio::main]
async fn main() -> TlResult<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let log_dir = Platform::data_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("."))
        .join("logs");
    let _guard = logging::init_logging(log_level, &log_dir, false)?;

    // Load configuration
    let config_path = cli.config.as_deref().map(std::path::Path::new);
    let config = if let Some(path) = config_path {
        AppConfig::load_from_file(path)?
    } else {
        AppConfig::load_default()?
    };

    let config_handle = ConfigHandle::new(config);

    info!("Teamline CLI v{}", tl_core::constants::APP_VERSION);

    // Dispatch to command handlers
    match cli.command {
        Commands::Send {
            from,
            to,
            subject,
            text,
        } => commands::send::run(config_handle, from, to, subject, text, cli.format).await,
        Commands::Inbox {
            user,
            page,
            per_page,
        } => commands::inbox::run(config_handle, user, page, per_page, cli.format).await,
        Commands::Search { query, user } => {
            commands::search::run(config_handle, query, user, cli.format).await
        }
        Commands::Notifications { action } => {
            commands::notifications::run(config_handle, action, cli.format).await
        }
        Commands::Users { action } => {
            commands::users::run(config_handle, action, cli.format).await
        }
        Commands::Db { action } => commands::db::run(config_handle, action, cli.format).await,
    }
}
