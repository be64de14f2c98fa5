//! In-memory storage backend

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{Storage, StorageError};

/// Shared in-memory key/value map.
///
/// Clones share the same map, the way every script on one origin sees the
/// same local storage. An optional byte quota makes writes fail once the
/// total size of keys and values would exceed it.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create an empty, unbounded storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty storage that rejects writes past `quota` bytes.
    #[cfg(test)]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            inner: Arc::default(),
            quota: Some(quota),
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(quota) = self.quota {
            let others: usize = guard
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let requested = others + key.len() + value.len();
            if requested > quota {
                return Err(StorageError::QuotaExceeded { requested, quota });
            }
        }

        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_get_set_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("a").unwrap(), None);

        storage.set("a", "1").unwrap();
        storage.set("a", "2").unwrap();
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("2"));

        storage.remove("a").unwrap();
        assert_eq!(storage.get("a").unwrap(), None);

        // Removing an absent key is fine.
        storage.remove("a").unwrap();
    }

    #[test]
    fn test_memory_clones_share_data() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.set("k", "v").unwrap();
        assert_eq!(b.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_memory_quota() {
        let storage = MemoryStorage::with_quota(10);
        storage.set("key", "1234").unwrap();

        // Replacing a value only counts the new value.
        storage.set("key", "1234567").unwrap();

        let err = storage.set("other", "123456").unwrap_err();
        assert!(matches!(
            err,
            StorageError::QuotaExceeded {
                requested: 21,
                quota: 10
            }
        ));
        assert_eq!(storage.get("other").unwrap(), None);
    }
}
