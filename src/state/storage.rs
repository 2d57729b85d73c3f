//! Key/value persistence for UI state stores.
//!
//! SYSTEM CONTEXT
//! ==============
//! Stores persist through `KeyValueStorage`, the counterpart of browser
//! `localStorage`: string values under fixed keys, best-effort writes.
//! `FileStorage` keeps one file per key in the console's state directory;
//! `MemoryStorage` backs tests and ephemeral sessions.

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns the underlying IO error when the value cannot be stored.
    fn set_item(&self, key: &str, value: &str) -> io::Result<()>;

    fn remove_item(&self, key: &str);
}

/// Process-local storage.
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).remove(key);
    }
}

/// One `<key>.json` file per key under a directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)
    }

    fn remove_item(&self, key: &str) {
        if let Err(e) = std::fs::remove_file(self.path_for(key)) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(key, error = %e, "storage remove failed");
            }
        }
    }
}

/// Load a JSON value stored under `key`. Missing or malformed values read as `None`.
pub fn load_json<T: DeserializeOwned>(storage: &dyn KeyValueStorage, key: &str) -> Option<T> {
    let raw = storage.get_item(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "ignoring malformed stored value");
            None
        }
    }
}

/// Save a JSON value under `key`. Failures are logged, never returned.
pub fn save_json<T: Serialize>(storage: &dyn KeyValueStorage, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(key, error = %e, "stored value failed to serialize");
            return;
        }
    };
    if let Err(e) = storage.set_item(key, &raw) {
        warn!(key, error = %e, "storage write failed");
    }
}
