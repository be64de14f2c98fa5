//! Admin panel: the consumer side of the inbox
//!
//! Gated by a placeholder credential (see [`credentials`]), then lists,
//! shows and deletes stored contact messages.

pub mod credentials;
mod dashboard;

pub use dashboard::{Dashboard, DashboardError, Session, DEFAULT_LOGIN_ERROR_DURATION};

use std::io::{self, BufRead, Write};
use std::time::Instant;

use anyhow::{bail, Context, Result};

use crate::config::Config;
use crate::models::{format_date, Message};
use crate::storage::FileStorage;

fn open(config: &Config) -> Result<Dashboard<FileStorage>> {
    Ok(Dashboard::open(config.storage()?, config.login_error_duration()))
}

/// Open the dashboard and insist on an active session.
fn open_logged_in(config: &Config) -> Result<Dashboard<FileStorage>> {
    let dashboard = open(config)?;
    if !dashboard.is_logged_in() {
        bail!("Not logged in. Run `portfolio-inbox login` first.");
    }
    Ok(dashboard)
}

/// Log in with the placeholder admin credential.
pub fn login(config: &Config, username: &str, password: &str) -> Result<()> {
    let mut dashboard = open(config)?;
    if dashboard.is_logged_in() {
        println!("Already logged in.");
        return Ok(());
    }

    dashboard
        .login(username, password, Instant::now())
        .context("Login failed")?;

    println!("Logged in. {} message(s) in the inbox.", dashboard.messages().len());
    Ok(())
}

/// End the admin session. Messages are kept.
pub fn logout(config: &Config) -> Result<()> {
    let mut dashboard = open(config)?;
    if !dashboard.is_logged_in() {
        println!("Not logged in.");
        return Ok(());
    }
    dashboard.logout();
    println!("Logged out.");
    Ok(())
}

/// Show session state and storage location.
pub fn status(config: &Config) -> Result<()> {
    let dashboard = open(config)?;
    println!("Storage: {}", dashboard.store().storage().path().display());
    match dashboard.session() {
        Session::LoggedIn => {
            println!("Admin:   logged in");
            println!("Inbox:   {} message(s)", dashboard.messages().len());
        }
        Session::LoggedOut => println!("Admin:   logged out"),
    }
    Ok(())
}

/// List messages newest first (prints to stdout).
pub fn list(config: &Config, limit: usize) -> Result<()> {
    let dashboard = open_logged_in(config)?;
    let messages = dashboard.messages();

    println!("\nInbox ({} message(s)):", messages.len());
    println!("{:-<60}", "");

    if messages.is_empty() {
        println!("  (no messages yet)");
        return Ok(());
    }

    for msg in messages.iter().take(limit) {
        println!("{} <{}>", msg.name, msg.email);
        println!("  Subject: {}", msg.subject);
        println!("  Date:    {}", format_date(&msg.date));
        println!("  ID:      {}", msg.id);
        println!();
    }

    if messages.len() > limit {
        println!("({} more not shown; use --limit)", messages.len() - limit);
    }
    Ok(())
}

/// Print one message in full.
pub fn show(config: &Config, id: &str) -> Result<()> {
    let mut dashboard = open_logged_in(config)?;
    let Some(msg) = dashboard.select(id) else {
        bail!("No message with id {}", id);
    };
    print_detail(msg);
    Ok(())
}

fn print_detail(msg: &Message) {
    println!("From:    {} <{}>", msg.name, msg.email);
    println!("Subject: {}", msg.subject);
    println!("Date:    {}", format_date(&msg.date));
    println!("ID:      {}", msg.id);
    println!("{:-<60}", "");
    println!("{}", msg.message);
}

/// Delete one message by id.
pub fn delete(config: &Config, id: &str) -> Result<()> {
    let mut dashboard = open_logged_in(config)?;
    let existed = dashboard.messages().iter().any(|m| m.id == id);
    dashboard.delete(id).context("Failed to delete message")?;

    if existed {
        println!("Deleted {}.", id);
    } else {
        println!("No message with id {} (nothing deleted).", id);
    }
    Ok(())
}

/// Delete every message, asking first unless `yes` is set.
pub fn delete_all(config: &Config, yes: bool) -> Result<()> {
    let mut dashboard = open_logged_in(config)?;
    let count = dashboard.messages().len();

    if !yes {
        print!(
            "Delete all {} message(s)? This cannot be undone. [y/N] ",
            count
        );
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin()
            .lock()
            .read_line(&mut answer)
            .context("Failed to read confirmation")?;
        if !confirmed(&answer) {
            println!("Cancelled.");
            return Ok(());
        }
    }

    dashboard.delete_all().context("Failed to delete messages")?;
    println!("Deleted {} message(s).", count);
    Ok(())
}

fn confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
