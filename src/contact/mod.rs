//! Contact form: the producer side of the inbox
//!
//! Builds a message from visitor input and appends it through the store.

mod form;

pub use form::{ContactForm, Field, SubmitError, SubmitStatus, DEFAULT_STATUS_DURATION};

use std::time::Instant;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::store::MessageStore;

/// Submit one message from the command line (prints to stdout).
pub fn submit(
    config: &Config,
    name: String,
    email: String,
    subject: String,
    message: String,
) -> Result<()> {
    let store = MessageStore::new(config.storage()?);
    let mut form = ContactForm::new(config.submit_status_duration());
    form.name = name;
    form.email = email;
    form.subject = subject;
    form.message = message;

    let saved = form
        .submit(&store, Instant::now())
        .context("Message was not sent")?;

    println!("Message sent. Thanks for reaching out, {}!", saved.name);
    println!("  ID: {}", saved.id);
    Ok(())
}
