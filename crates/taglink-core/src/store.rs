//! Persisted binding store.
//!
//! The registry persists the active binding so the client reconnects to the
//! same controller across restarts. The on-disk record keeps the `PI_NAME`
//! and `PI_URL` keys used by the existing handheld app's preference store, so
//! both clients can share a record.

use crate::error::StoreResult;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// The persisted `{name, url}` pair for the active binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedBinding {
    #[serde(rename = "PI_NAME")]
    pub name: String,

    #[serde(rename = "PI_URL")]
    pub url: String,
}

/// Storage abstraction for the active binding.
///
/// The binding registry is the sole writer; readers only observe committed
/// state through the registry.
pub trait BindingStore: Send + Sync {
    /// Loads the persisted binding, `None` if no record exists.
    fn load(&self) -> StoreResult<Option<PersistedBinding>>;

    /// Saves the binding, replacing any previous record.
    fn save(&self, binding: &PersistedBinding) -> StoreResult<()>;

    /// Erases the persisted record. Clearing an absent record is a no-op.
    fn clear(&self) -> StoreResult<()>;
}

/// JSON-file backed store.
///
/// Writes go to a temp file in the same directory followed by a rename, so a
/// concurrent load never observes a partially written record.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl BindingStore for JsonFileStore {
    fn load(&self) -> StoreResult<Option<PersistedBinding>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // A record missing either key means "no persisted binding", the same
        // as a missing file.
        match serde_json::from_str::<PersistedBinding>(&contents) {
            Ok(binding) => Ok(Some(binding)),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Ignoring malformed binding record");
                Ok(None)
            }
        }
    }

    fn save(&self, binding: &PersistedBinding) -> StoreResult<()> {
        let contents = serde_json::to_string_pretty(binding)?;
        let temp = self.temp_path();
        fs::write(&temp, contents)?;
        fs::rename(&temp, &self.path)?;
        debug!(path = %self.path.display(), name = binding.name, "Persisted binding saved");
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Persisted binding cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Option<PersistedBinding>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BindingStore for MemoryStore {
    fn load(&self) -> StoreResult<Option<PersistedBinding>> {
        Ok(self.inner.lock().clone())
    }

    fn save(&self, binding: &PersistedBinding) -> StoreResult<()> {
        *self.inner.lock() = Some(binding.clone());
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        *self.inner.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("binding.json"))
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let binding = PersistedBinding {
            name: "mypi".to_string(),
            url: "http://10.0.0.5:8080/".to_string(),
        };
        store.save(&binding).unwrap();
        assert_eq!(store.load().unwrap(), Some(binding));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());

        // Clearing again is a no-op
        store.clear().unwrap();
    }

    #[test]
    fn test_on_disk_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .save(&PersistedBinding {
                name: "mypi".to_string(),
                url: "http://10.0.0.5:8080/".to_string(),
            })
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join("binding.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["PI_NAME"], "mypi");
        assert_eq!(value["PI_URL"], "http://10.0.0.5:8080/");
    }

    #[test]
    fn test_malformed_record_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binding.json");
        std::fs::write(&path, "{\"PI_NAME\": \"mypi\"}").unwrap();

        let store = JsonFileStore::new(path);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        let binding = PersistedBinding {
            name: "mypi".to_string(),
            url: "http://10.0.0.5:8080/".to_string(),
        };
        store.save(&binding).unwrap();
        assert_eq!(store.load().unwrap(), Some(binding));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
