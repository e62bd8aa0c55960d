//! Durable bearer-token storage.
//!
//! A single string-keyed slot holds the token across restarts. Absence of a
//! token means the client is unauthenticated. The authenticated user profile
//! is deliberately not persisted.

use crate::error::StorageError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Backend for string-keyed token slots.
///
/// Calls are synchronous so that logout can purge the token while the
/// reducer folds the action.
pub trait TokenStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove whatever is stored under `key`. Removing a missing key is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn clear(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage. Does not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(slots.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        slots.remove(key);
        Ok(())
    }
}

/// File-backed storage: a JSON object mapping slot keys to tokens.
///
/// Writes are read-modify-write under a process-local lock, so other keys in
/// the same file are preserved.
#[derive(Debug)]
pub struct FileTokenStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStorage {
    /// Storage backed by the file at `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_slots(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_slots(&self, slots: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(slots)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.read_slots()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut slots = self.read_slots()?;
        slots.insert(key.to_string(), value.to_string());
        self.write_slots(&slots)
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut slots = self.read_slots()?;
        if slots.remove(key).is_some() {
            self.write_slots(&slots)?;
        }
        Ok(())
    }
}

/// Shared handle to the process-wide token slot.
///
/// Cloning is cheap; every clone sees the same slot. The gateway reads the
/// token through this handle right before each request, so a change takes
/// effect on the next request and never on one already in flight.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn TokenStorage>,
    key: Arc<str>,
}

impl CredentialStore {
    /// Default slot key.
    pub const DEFAULT_KEY: &'static str = "token";

    /// Handle over `storage` using slot `key`.
    #[must_use]
    pub fn new(storage: Arc<dyn TokenStorage>, key: impl Into<Arc<str>>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Process-local store under the default key.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStorage::new()), Self::DEFAULT_KEY)
    }

    /// Slot key in use.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn token(&self) -> Result<Option<String>, StorageError> {
        self.storage.load(&self.key)
    }

    /// Store `token` durably.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn persist(&self, token: &str) -> Result<(), StorageError> {
        self.storage.save(&self.key, token)
    }

    /// Drop the durable token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn purge(&self) -> Result<(), StorageError> {
        self.storage.clear(&self.key)
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_memory_round_trip_and_purge() {
        let store = CredentialStore::in_memory();
        assert_eq!(store.token().unwrap(), None);

        store.persist("abc").unwrap();
        assert_eq!(store.token().unwrap().as_deref(), Some("abc"));

        store.purge().unwrap();
        assert_eq!(store.token().unwrap(), None);
    }

    #[test]
    fn test_clones_share_the_slot() {
        let store = CredentialStore::in_memory();
        let other = store.clone();
        store.persist("shared").unwrap();
        assert_eq!(other.token().unwrap().as_deref(), Some("shared"));
    }

    #[test]
    fn test_keys_are_isolated() {
        let storage: Arc<dyn TokenStorage> = Arc::new(MemoryTokenStorage::new());
        let a = CredentialStore::new(Arc::clone(&storage), "a");
        let b = CredentialStore::new(storage, "b");
        a.persist("one").unwrap();
        assert_eq!(b.token().unwrap(), None);
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("token.json");

        let first = CredentialStore::new(Arc::new(FileTokenStorage::new(&path)), "token");
        first.persist("durable").unwrap();
        drop(first);

        let reopened = CredentialStore::new(Arc::new(FileTokenStorage::new(&path)), "token");
        assert_eq!(reopened.token().unwrap().as_deref(), Some("durable"));

        reopened.purge().unwrap();
        assert_eq!(reopened.token().unwrap(), None);
    }

    #[test]
    fn test_file_storage_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::new(dir.path().join("tokens.json"));
        storage.save("token", "t").unwrap();
        storage.save("other", "o").unwrap();
        storage.clear("token").unwrap();

        assert_eq!(storage.load("token").unwrap(), None);
        assert_eq!(storage.load("other").unwrap().as_deref(), Some("o"));
    }

    #[test]
    fn test_file_storage_reports_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, b"not json").unwrap();

        let storage = FileTokenStorage::new(&path);
        assert!(matches!(storage.load("token"), Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn test_missing_file_means_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::new(dir.path().join("absent.json"));
        assert_eq!(storage.load("token").unwrap(), None);
        storage.clear("token").unwrap();
    }
}
