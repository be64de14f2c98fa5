//! File-backed storage: one JSON object holding every key

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{Storage, StorageError};

/// File name used inside the data directory.
pub const STORAGE_FILE_NAME: &str = "local_storage.json";

/// Local storage persisted as `{ "key": "value", ... }` in a single file.
///
/// Each call re-reads the file, so separate handles (and separate processes)
/// observe each other's writes. A missing file is an empty storage.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage backed by an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage backed by [`STORAGE_FILE_NAME`] inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STORAGE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the file contents via a sibling temp file and rename.
    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
            }
        }

        let content = serde_json::to_string_pretty(map)
            .map_err(|e| self.io_error(std::io::Error::other(e)))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| self.io_error(e))?;

        // The file holds the admin session flag; keep it private to the user.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&tmp, perms).map_err(|e| self.io_error(e))?;
        }

        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)?;
        tracing::debug!("Stored {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
            tracing::debug!("Removed {}", key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(dir.path());
        assert_eq!(storage.get("contactMessages").unwrap(), None);
        // Reading must not create the file.
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_values_visible_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let a = FileStorage::in_dir(dir.path());
        let b = FileStorage::in_dir(dir.path());

        a.set("welcomeShown", "true").unwrap();
        a.set("contactMessages", "[]").unwrap();
        assert_eq!(b.get("welcomeShown").unwrap().as_deref(), Some("true"));

        b.remove("welcomeShown").unwrap();
        assert_eq!(a.get("welcomeShown").unwrap(), None);
        assert_eq!(a.get("contactMessages").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(&dir.path().join("nested").join("deeper"));
        storage.set("k", "v").unwrap();
        assert!(storage.path().exists());
        assert!(!storage.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_reported_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(dir.path());
        fs::write(storage.path(), "not json at all").unwrap();

        assert!(matches!(
            storage.get("k"),
            Err(StorageError::Corrupt { .. })
        ));
        assert!(matches!(
            storage.set("k", "v"),
            Err(StorageError::Corrupt { .. })
        ));
        assert_eq!(
            fs::read_to_string(storage.path()).unwrap(),
            "not json at all"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(dir.path());
        storage.set("adminAuthenticated", "true").unwrap();

        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
