// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Key-value preference storage

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::warn;

/// File name of the JSON preference store inside the data directory
pub const PREFERENCES_FILE: &str = "preferences.json";

/// Errors writing preferences
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("failed to {action} {path}: {source}")]
    Io {
        /// What was being attempted
        action: &'static str,
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// A value could not be turned into JSON
    #[error("failed to serialize preference {key}: {source}")]
    Serialize {
        /// Preference key
        key: String,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },
}

/// Untyped key-value storage for small preferences
pub trait KeyValueStore: Send + Sync {
    /// Stored value for `key`, `None` when absent or unreadable
    fn load_value(&self, key: &str) -> Option<Value>;

    /// Replace the value stored under `key`
    fn save_value(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// Typed access on top of [`KeyValueStore`]
pub trait KeyValueStoreExt {
    /// Load and deserialize `key`; a value of the wrong shape reads as absent
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T>;

    /// Serialize and store `value` under `key`
    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.load_value(key)?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Ignoring unreadable preference {}: {}", key, e);
                None
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.save_value(key, value)
    }
}

// =============================================================================
// JSON file store
// =============================================================================

/// Preferences kept as one JSON object in a file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // serialises read-modify-write cycles
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Store backed by `path`; the file is created on first save
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at `<data_dir>/preferences.json`
    #[must_use]
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(PREFERENCES_FILE))
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Map<String, Value> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                return Map::new();
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!("Ignoring corrupt preferences file {}", self.path.display());
                Map::new()
            }
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn load_value(&self, key: &str) -> Option<Value> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        self.read_all().remove(key)
    }

    fn save_value(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut all = self.read_all();
        all.insert(key.to_string(), value);

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                action: "create directory",
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(&Value::Object(all)).map_err(|source| {
            StoreError::Serialize {
                key: key.to_string(),
                source,
            }
        })?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            action: "write",
            path: self.path.clone(),
            source,
        })
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Volatile store, for tests and one-shot runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load_value(&self, key: &str) -> Option<Value> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn save_value(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(&dir.path().join("nested"));

        assert_eq!(store.load::<Vec<String>>("roots"), None);

        store.save("roots", &vec!["/a".to_string(), "/b".to_string()]).unwrap();
        store.save("show_all", &true).unwrap();

        let reopened = JsonFileStore::in_dir(&dir.path().join("nested"));
        assert_eq!(
            reopened.load::<Vec<String>>("roots"),
            Some(vec!["/a".to_string(), "/b".to_string()])
        );
        assert_eq!(reopened.load::<bool>("show_all"), Some(true));
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.load::<Vec<String>>("roots"), None);
        // and can be overwritten
        store.save("roots", &vec!["/x".to_string()]).unwrap();
        assert_eq!(store.load::<Vec<String>>("roots"), Some(vec!["/x".to_string()]));
    }

    #[test]
    fn test_wrong_shape_reads_as_absent() {
        let store = MemoryStore::new();
        store.save("roots", &42).unwrap();
        assert_eq!(store.load::<Vec<String>>("roots"), None);
    }

    #[test]
    fn test_works_through_trait_object() {
        let store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        store.save("flag", &false).unwrap();
        assert_eq!(store.load::<bool>("flag"), Some(false));
    }
}
