//! Admin dashboard: session gate plus the newest-first message view

use std::time::{Duration, Instant};

use thiserror::Error;

use super::credentials;
use crate::models::{sort_newest_first, Message};
use crate::storage::{Storage, ADMIN_AUTH_KEY, FLAG_TRUE};
use crate::store::{MessageStore, StoreError};

/// How long a failed-login message stays visible by default.
pub const DEFAULT_LOGIN_ERROR_DURATION: Duration = Duration::from_secs(3);

/// Text shown after a failed login.
pub const LOGIN_ERROR_TEXT: &str = "Invalid username or password";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    LoggedOut,
    LoggedIn,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("not logged in")]
    NotAuthenticated,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Consumer of the message store.
///
/// Holds the session state, the displayed (sorted) messages and the current
/// selection. Every mutation goes through the store and is followed by a
/// fresh read, so the view never drifts from what is persisted.
pub struct Dashboard<S> {
    store: MessageStore<S>,
    session: Session,
    messages: Vec<Message>,
    selected: Option<String>,
    login_error: Option<Instant>,
    login_error_duration: Duration,
}

impl<S: Storage> Dashboard<S> {
    /// Open the dashboard, resuming a persisted session if there is one.
    pub fn open(storage: S, login_error_duration: Duration) -> Self {
        let resumed = storage.flag(ADMIN_AUTH_KEY);
        let mut dashboard = Self {
            store: MessageStore::new(storage),
            session: Session::LoggedOut,
            messages: Vec::new(),
            selected: None,
            login_error: None,
            login_error_duration,
        };

        if resumed {
            tracing::debug!("Resuming admin session");
            dashboard.session = Session::LoggedIn;
            dashboard.refresh();
        }

        dashboard
    }

    pub fn store(&self) -> &MessageStore<S> {
        &self.store
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn is_logged_in(&self) -> bool {
        self.session == Session::LoggedIn
    }

    /// Check the credential pair and start a session on match.
    pub fn login(&mut self, username: &str, password: &str, now: Instant) -> Result<(), AuthError> {
        if !credentials::matches(username, password) {
            tracing::warn!("Rejected admin login for {:?}", username);
            self.login_error = Some(now);
            return Err(AuthError::InvalidCredentials);
        }

        if let Err(e) = self.store.storage().set(ADMIN_AUTH_KEY, FLAG_TRUE) {
            // Still logged in for this process; the next launch will ask again.
            tracing::warn!("Could not persist admin session: {}", e);
        }

        tracing::info!("Admin logged in");
        self.session = Session::LoggedIn;
        self.login_error = None;
        self.refresh();
        Ok(())
    }

    /// The failed-login text, while it is still within its display window.
    pub fn login_error(&self, now: Instant) -> Option<&'static str> {
        match self.login_error {
            Some(at) if now.saturating_duration_since(at) < self.login_error_duration => {
                Some(LOGIN_ERROR_TEXT)
            }
            _ => None,
        }
    }

    /// End the session. Stored messages are left untouched.
    pub fn logout(&mut self) {
        if let Err(e) = self.store.storage().remove(ADMIN_AUTH_KEY) {
            tracing::warn!("Could not clear admin session flag: {}", e);
        }
        tracing::info!("Admin logged out");
        self.session = Session::LoggedOut;
        self.messages.clear();
        self.selected = None;
    }

    /// Re-read the collection and sort it newest first.
    pub fn refresh(&mut self) {
        if !self.is_logged_in() {
            return;
        }
        let mut messages = self.store.list();
        sort_newest_first(&mut messages);
        self.messages = messages;

        if let Some(id) = &self.selected {
            if !self.messages.iter().any(|m| &m.id == id) {
                self.selected = None;
            }
        }
    }

    /// Displayed messages, newest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Select a message by id. Returns it if it is displayed.
    pub fn select(&mut self, id: &str) -> Option<&Message> {
        let found = self.messages.iter().position(|m| m.id == id)?;
        self.selected = Some(id.to_string());
        self.messages.get(found)
    }

    pub fn selected(&self) -> Option<&Message> {
        let id = self.selected.as_deref()?;
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Delete one message, clearing the selection if it was the one deleted.
    pub fn delete(&mut self, id: &str) -> Result<(), DashboardError> {
        self.require_login()?;
        self.store.delete(id)?;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        self.refresh();
        Ok(())
    }

    /// Delete the selected message, if any. Returns whether one was deleted.
    pub fn delete_selected(&mut self) -> Result<bool, DashboardError> {
        match self.selected.clone() {
            Some(id) => self.delete(&id).map(|()| true),
            None => Ok(false),
        }
    }

    /// Delete every message and clear the selection.
    pub fn delete_all(&mut self) -> Result<(), DashboardError> {
        self.require_login()?;
        self.store.delete_all()?;
        self.selected = None;
        self.refresh();
        Ok(())
    }

    fn require_login(&self) -> Result<(), DashboardError> {
        if self.is_logged_in() {
            Ok(())
        } else {
            Err(DashboardError::NotAuthenticated)
        }
    }
}
