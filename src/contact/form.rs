//! Contact form: turns form input into a stored message

use std::fmt;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::models::Message;
use crate::storage::Storage;
use crate::store::{MessageStore, StoreError};

/// How long a submit outcome stays visible by default.
pub const DEFAULT_STATUS_DURATION: Duration = Duration::from_secs(5);

/// A contact form input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Subject, Field::Message];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Subject => "Subject",
            Field::Message => "Message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of the last submit attempt that reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    Success,
    Error,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("missing required fields: {}", join_fields(.0))]
    MissingFields(Vec<Field>),

    #[error("email address is not valid")]
    InvalidEmail,

    #[error("failed to save message")]
    Store(#[from] StoreError),
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Contact form input plus the transient outcome of the last submit.
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    status: Option<(SubmitStatus, Instant)>,
    status_duration: Duration,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_DURATION)
    }
}

impl ContactForm {
    pub fn new(status_duration: Duration) -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            subject: String::new(),
            message: String::new(),
            status: None,
            status_duration,
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Subject => &self.subject,
            Field::Message => &self.message,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Subject => &mut self.subject,
            Field::Message => &mut self.message,
        }
    }

    /// Required fields that are empty. Whitespace counts as content.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.field(*f).is_empty())
            .collect()
    }

    /// Submit the form into `store`.
    ///
    /// Invalid input is rejected before touching the store and leaves the
    /// status alone. A store failure sets the `Error` status and keeps the
    /// input; success sets `Success` and clears every field.
    pub fn submit<S: Storage>(
        &mut self,
        store: &MessageStore<S>,
        now: Instant,
    ) -> Result<Message, SubmitError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(SubmitError::MissingFields(missing));
        }
        if !is_plausible_email(&self.email) {
            return Err(SubmitError::InvalidEmail);
        }

        let message = Message::new(
            self.name.clone(),
            self.email.clone(),
            self.subject.clone(),
            self.message.clone(),
        );

        match store.append(message.clone()) {
            Ok(()) => {
                tracing::info!("Message saved: {} from {}", message.id, message.email);
                self.status = Some((SubmitStatus::Success, now));
                self.clear();
                Ok(message)
            }
            Err(e) => {
                tracing::error!("Failed to save message {}: {}", message.id, e);
                self.status = Some((SubmitStatus::Error, now));
                Err(SubmitError::Store(e))
            }
        }
    }

    /// Status of the last submit, if it has not expired yet.
    pub fn status(&self, now: Instant) -> Option<SubmitStatus> {
        match self.status {
            Some((status, at)) if now.saturating_duration_since(at) < self.status_duration => {
                Some(status)
            }
            _ => None,
        }
    }

    /// Reset all input fields to empty.
    pub fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
        self.subject.clear();
        self.message.clear();
    }
}

/// Loose address check in the spirit of an HTML email input: one `@` with
/// something on both sides, and no whitespace.
pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}
