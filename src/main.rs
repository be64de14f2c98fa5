//! Portfolio Inbox - contact messages for a personal portfolio site
//!
//! Visitors leave a message through the contact form; the site owner reads
//! and prunes them from the admin panel. Everything lives in one local
//! storage file.

mod admin;
mod config;
mod contact;
mod models;
mod storage;
mod store;
mod tui;
mod welcome;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "portfolio-inbox")]
#[command(about = "Contact form and admin inbox for a portfolio site", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the local storage file (overrides config)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message through the contact form
    Submit {
        /// Your name
        #[arg(long)]
        name: String,

        /// Your email address
        #[arg(long)]
        email: String,

        /// Subject line
        #[arg(long)]
        subject: String,

        /// Message body
        #[arg(long)]
        message: String,
    },

    /// Log in to the admin inbox.
    ///
    /// The admin credential is a fixed placeholder (admin / admin123) and the
    /// session is a plain flag in the storage file. It offers no protection
    /// against anyone who can read the source or edit that file.
    Login {
        /// Admin username
        #[arg(short, long, default_value = "admin")]
        username: String,

        /// Admin password
        #[arg(short, long)]
        password: String,
    },

    /// End the admin session (messages are kept)
    Logout,

    /// Show admin session state and storage location
    Status,

    /// List messages, newest first
    List {
        /// Maximum number of messages to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show one message in full
    Show {
        /// Message ID (from `list` output)
        id: String,
    },

    /// Delete one message
    Delete {
        /// Message ID (from `list` output)
        id: String,
    },

    /// Delete every message
    DeleteAll {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show configuration, or pin the data directory in the config file
    Config {
        /// Data directory to save into the config file
        #[arg(long, value_name = "DIR")]
        set_data_dir: Option<PathBuf>,
    },

    /// Launch the terminal user interface
    Tui {
        /// Use a throwaway in-memory storage instead of the storage file
        #[arg(long)]
        in_memory: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. The TUI owns the terminal, so its logs go to a
    // buffer shown in the status bar instead of stderr.
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());
    let tui_logs = matches!(cli.command, Commands::Tui { .. }).then(tui::LogBuffer::new);

    match &tui_logs {
        Some(buffer) => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .without_time()
                    .with_writer(buffer.clone()),
            )
            .init(),
        None => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }

    let file_config = Config::load()?;
    let config = file_config.clone().with_data_dir_override(cli.data_dir.clone());

    match cli.command {
        Commands::Submit {
            name,
            email,
            subject,
            message,
        } => {
            contact::submit(&config, name, email, subject, message)?;
        }
        Commands::Login { username, password } => {
            admin::login(&config, &username, &password)?;
        }
        Commands::Logout => {
            admin::logout(&config)?;
        }
        Commands::Status => {
            admin::status(&config)?;
        }
        Commands::List { limit } => {
            admin::list(&config, limit)?;
        }
        Commands::Show { id } => {
            admin::show(&config, &id)?;
        }
        Commands::Delete { id } => {
            admin::delete(&config, &id)?;
        }
        Commands::DeleteAll { yes } => {
            admin::delete_all(&config, yes)?;
        }
        Commands::Config { set_data_dir } => {
            // Only explicit settings are written back, not the --data-dir override.
            crate::config::show_or_update(file_config, set_data_dir, cli.data_dir)?;
        }
        Commands::Tui { in_memory } => {
            if in_memory {
                tracing::info!("Using in-memory storage; nothing will be saved");
                tui::run(storage::MemoryStorage::new(), &config, tui_logs)?;
            } else {
                let storage = config.storage()?;
                tracing::debug!("Using storage at {}", storage.path().display());
                tui::run(storage, &config, tui_logs)?;
            }
        }
    }

    Ok(())
}
