//! Message store: the only reader and writer of the persisted collection
//!
//! Every mutation is a full read-modify-write of the `contactMessages` value,
//! since the storage port has no partial update. That keeps the collection
//! small by construction (a personal inbox, not a mail server).
//!
//! Two processes appending at the same moment can lose one write: both read
//! the same collection and the later `set` wins. The program runs one
//! operation at a time, so this only happens across processes.

use thiserror::Error;

use crate::models::{decode_collection, encode_collection, Message};
use crate::storage::{Storage, StorageError, CONTACT_MESSAGES_KEY};

/// Message store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read stored messages")]
    Read(#[source] StorageError),

    #[error("failed to save messages")]
    Write(#[source] StorageError),

    #[error("failed to encode messages")]
    Encode(#[source] serde_json::Error),
}

/// Gateway to the persisted message collection.
pub struct MessageStore<S> {
    storage: S,
}

impl<S: Storage> MessageStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The underlying storage handle.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Append one message to the collection.
    ///
    /// An undecodable stored collection is replaced rather than blocking
    /// the new message. A storage read failure is returned instead, because
    /// writing would overwrite data that could not be seen.
    pub fn append(&self, message: Message) -> Result<(), StoreError> {
        let mut messages = self.load()?;
        tracing::debug!("Appending message {} ({} stored)", message.id, messages.len());
        messages.push(message);
        self.save(&messages)
    }

    /// All stored messages, in stored order.
    ///
    /// Absent, unreadable, or undecodable data yields an empty list.
    pub fn list(&self) -> Vec<Message> {
        match self.load() {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!("{:#}", anyhow::Error::new(e));
                Vec::new()
            }
        }
    }

    /// Remove the message with `id`. Removing an unknown id is not an error.
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut messages = self.load()?;
        let before = messages.len();
        messages.retain(|m| m.id != id);

        if messages.len() == before {
            tracing::debug!("Delete of unknown message {} ignored", id);
            return Ok(());
        }

        tracing::info!("Deleted message {}", id);
        self.save(&messages)
    }

    /// Replace the collection with an empty one.
    pub fn delete_all(&self) -> Result<(), StoreError> {
        tracing::info!("Deleting all messages");
        self.save(&[])
    }

    /// Read and decode the collection, treating bad data as empty.
    fn load(&self) -> Result<Vec<Message>, StoreError> {
        let raw = match self.storage.get(CONTACT_MESSAGES_KEY).map_err(StoreError::Read)? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };

        match decode_collection(&raw) {
            Ok(messages) => Ok(messages),
            Err(e) => {
                tracing::warn!("Ignoring unreadable stored messages: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, messages: &[Message]) -> Result<(), StoreError> {
        let encoded = encode_collection(messages).map_err(StoreError::Encode)?;
        self.storage
            .set(CONTACT_MESSAGES_KEY, &encoded)
            .map_err(StoreError::Write)
    }
}
