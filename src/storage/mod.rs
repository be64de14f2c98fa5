//! Key/value storage port
//!
//! The browser's per-origin local storage, reduced to the three calls the
//! inbox needs. Everything that persists state goes through [`Storage`], so
//! the message store can run against an in-memory map in tests and against a
//! JSON file on disk in the CLI.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::path::PathBuf;

use thiserror::Error;

/// Key holding the JSON array of contact messages.
pub const CONTACT_MESSAGES_KEY: &str = "contactMessages";

/// Key holding `"true"` while an admin session is active.
pub const ADMIN_AUTH_KEY: &str = "adminAuthenticated";

/// Key holding `"true"` once the welcome popup has been shown.
pub const WELCOME_SHOWN_KEY: &str = "welcomeShown";

/// Value stored under the boolean flag keys.
pub const FLAG_TRUE: &str = "true";

/// Storage backend errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage file {} is not a JSON object of strings", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage quota exceeded ({requested} bytes requested, quota is {quota})")]
    QuotaExceeded { requested: usize, quota: usize },
}

/// Whole-value get/set/remove over string keys.
///
/// There is no partial update: callers that change a structured value read
/// it, modify it, and write the whole thing back.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// True if `key` holds exactly [`FLAG_TRUE`]. Read errors count as unset.
    fn flag(&self, key: &str) -> bool {
        match self.get(key) {
            Ok(value) => value.as_deref() == Some(FLAG_TRUE),
            Err(e) => {
                tracing::warn!("Could not read flag {}: {}", key, e);
                false
            }
        }
    }
}
