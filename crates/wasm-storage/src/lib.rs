//! Persistence boundary for the transformation store
//!
//! A small key-value abstraction over browser storage. The store writes a
//! serialized snapshot of its durable fields under a single fixed key and
//! reads it back once at startup. On native targets (tests, tooling) the
//! in-memory backend stands in for the browser.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
pub mod browser;

#[cfg(target_arch = "wasm32")]
pub use browser::{LocalStorage, SessionStorage};

/// Storage key the transformation store persists under
pub const STORAGE_KEY: &str = "transformation-store";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },

    #[error("Storage backend error: {message}")]
    Backend { message: String },

    #[error("Serialization error: {message}")]
    Serialize { message: String },
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialize {
            message: err.to_string(),
        }
    }
}

/// A string key-value store. Implementations must be synchronous; every
/// write completes before the operation that triggered it returns.
pub trait StorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory backend. Clones share the same underlying map, which lets
/// tests hand one map to two stores to simulate a process restart.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// JSON snapshot gate over a storage backend, addressed by a fixed key
pub struct PersistGate {
    backend: Box<dyn StorageBackend>,
    key: String,
}

impl PersistGate {
    /// Gate over the default storage key
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: Box<dyn StorageBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read and deserialize the snapshot. A missing key is `Ok(None)`;
    /// a corrupt blob is an error the caller recovers from by falling
    /// back to defaults.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<T>, StorageError> {
        match self.backend.get(&self.key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Serialize and write the snapshot
    pub fn save<T: Serialize>(&mut self, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.backend.set(&self.key, &json)
    }

    /// Drop the snapshot entirely
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.backend.remove(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Snapshot {
        name: String,
        count: u32,
    }

    #[test]
    fn test_memory_backend_round_trip() {
        let mut storage = MemoryStorage::new();
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap(), Some("v".to_string()));
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn test_clones_share_entries() {
        let storage = MemoryStorage::new();
        let mut writer = storage.clone();
        writer.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_gate_round_trip() {
        let mut gate = PersistGate::new(Box::new(MemoryStorage::new()));
        assert_eq!(gate.load::<Snapshot>().unwrap(), None);

        let snapshot = Snapshot {
            name: "a".to_string(),
            count: 3,
        };
        gate.save(&snapshot).unwrap();
        assert_eq!(gate.load::<Snapshot>().unwrap(), Some(snapshot));

        gate.clear().unwrap();
        assert_eq!(gate.load::<Snapshot>().unwrap(), None);
    }

    #[test]
    fn test_corrupt_blob_is_an_error_not_a_panic() {
        let storage = MemoryStorage::new();
        let mut raw = storage.clone();
        raw.set(STORAGE_KEY, "{not json").unwrap();

        let gate = PersistGate::new(Box::new(storage));
        let err = gate.load::<Snapshot>().unwrap_err();
        assert!(matches!(err, StorageError::Serialize { .. }));
    }
}
