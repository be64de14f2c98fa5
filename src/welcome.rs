//! First-run welcome flag

use crate::storage::{Storage, FLAG_TRUE, WELCOME_SHOWN_KEY};

/// Greeting typed out in the welcome popup.
pub const WELCOME_TEXT: &str = "Welcome to my digital portfolio";

/// Whether the welcome popup has yet to be shown.
pub fn should_show<S: Storage>(storage: &S) -> bool {
    !storage.flag(WELCOME_SHOWN_KEY)
}

/// Record that the popup has been shown. Set when it is displayed, not when
/// it is dismissed, so quitting mid-popup does not bring it back.
pub fn mark_shown<S: Storage>(storage: &S) {
    if let Err(e) = storage.set(WELCOME_SHOWN_KEY, FLAG_TRUE) {
        tracing::warn!("Could not record welcome popup: {}", e);
    }
}

/// Check the flag and set it in one step. Returns true exactly once per
/// storage.
pub fn take_first_run<S: Storage>(storage: &S) -> bool {
    if should_show(storage) {
        mark_shown(storage);
        true
    } else {
        false
    }
}
