//! Record store backends
//!
//! A store only moves whole JSON values in and out. Decoding into typed
//! records and the fallback policy live in `Records`.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

/// Failure reported by a record store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend cannot be reached (no LocalStorage, quota, permissions)
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Payload exists but is not valid for the requested record
    #[error("corrupt record `{key}`: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// Value could not be encoded
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable key → JSON value store
pub trait RecordStore {
    /// Fetch a value, `Ok(None)` when the key was never written
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    /// Replace the value stored under `key`
    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// In-process store (tests, headless hosts, persistence-less builds)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value, bypassing typed decoding
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// One JSON file per key inside a directory
///
/// Writes go to `<key>.json.tmp` first and are renamed over the live file,
/// so an interrupted write leaves the previous record intact.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFileStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<std::path::PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> std::path::PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl RecordStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let json = match std::fs::read_to_string(self.path_for(key)) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            })
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(&value)?;
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn new() -> Result<Self, StoreError> {
        let storage = web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("no window".to_string()))?
            .local_storage()
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?
            .ok_or_else(|| StoreError::Unavailable("LocalStorage disabled".to_string()))?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl RecordStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let json = self
            .storage
            .get_item(key)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?;
        match json {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let json = serde_json::to_string(&value)?;
        self.storage
            .set_item(key, &json)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.get("missing").unwrap().is_none());
        store.set("wave", json!(12)).unwrap();
        assert_eq!(store.get("wave").unwrap(), Some(json!(12)));
        assert_eq!(store.len(), 1);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_json_file_store_persists_across_instances() {
        let dir = std::env::temp_dir().join(format!(
            "arena_modes_store_test_{}",
            std::process::id()
        ));
        let mut store = JsonFileStore::open(&dir).unwrap();
        store.set("arena_modes_horde_highest_wave", json!(7)).unwrap();

        let reopened = JsonFileStore::open(&dir).unwrap();
        assert_eq!(
            reopened.get("arena_modes_horde_highest_wave").unwrap(),
            Some(json!(7))
        );
        assert!(reopened.get("never_written").unwrap().is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_json_file_store_reports_corrupt_payload() {
        let dir = std::env::temp_dir().join(format!(
            "arena_modes_store_corrupt_{}",
            std::process::id()
        ));
        let store = JsonFileStore::open(&dir).unwrap();
        std::fs::write(dir.join("broken.json"), "{not json").unwrap();

        let err = store.get("broken").unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
