//! Durable key-value storage used as the write-through mirror of the landmark list.
//!
//! This module provides a single trait `StorageBackend` and three concrete
//! implementations:
//!
//! - `WebLocalStorage` (compiled for `wasm32`), backed by `window.localStorage`.
//! - `FileStorage` (compiled for native targets), a single JSON file holding a
//!   map of string keys to string values, read once and rewritten on every
//!   mutation.
//! - `MemoryStorage`, a process-local map used by tests and `--in-memory`.
//!
//! Keys and values are raw UTF-8 strings; serialization of the landmark list is
//! the store's concern, not the backend's.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Platform storage error: {0}")]
    Platform(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Raw string key-value backend.
pub trait StorageBackend {
    /// Store a string value for a key, replacing any previous value.
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Read a string value for a key. Returns Ok(None) when key is missing.
    fn get_string(&self, key: &str) -> StorageResult<Option<String>>;

    /// Remove a key (no-op if key does not exist).
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// In-memory backend. Clones share the same map, so a test can keep a handle
/// to inspect what the store wrote.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.inner
            .lock()
            .map_err(|e| StorageError::Platform(format!("mutex poisoned: {:?}", e)))
    }
}

impl StorageBackend for MemoryStorage {
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

//
// Web implementation (localStorage)
//
#[cfg(target_arch = "wasm32")]
mod web_storage {
    use super::*;
    use wasm_bindgen::JsValue;
    use web_sys::Storage;

    fn local_storage() -> Result<Storage, StorageError> {
        web_sys::window()
            .ok_or_else(|| StorageError::Platform("no window".into()))?
            .local_storage()
            .map_err(|e| StorageError::Platform(format!("local_storage() failed: {:?}", e)))?
            .ok_or_else(|| StorageError::Platform("local_storage not available".into()))
    }

    /// Browser-backed localStorage implementation.
    pub struct WebLocalStorage;

    impl StorageBackend for WebLocalStorage {
        fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
            // Fails with QuotaExceededError once the embedded images outgrow the origin quota
            local_storage()?.set_item(key, value).map_err(|e| {
                StorageError::Platform(format!("set_item error: {:?}", JsValue::from(e)))
            })
        }

        fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
            local_storage()?.get_item(key).map_err(|e| {
                StorageError::Platform(format!("get_item error: {:?}", JsValue::from(e)))
            })
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            local_storage()?.remove_item(key).map_err(|e| {
                StorageError::Platform(format!("remove_item error: {:?}", JsValue::from(e)))
            })
        }
    }

    /// Convenience constructor for the default web backend.
    pub fn default_backend(
        _path: Option<std::path::PathBuf>,
    ) -> Result<Box<dyn StorageBackend>, StorageError> {
        Ok(Box::new(WebLocalStorage))
    }
}

//
// Native file-backed implementation
//
#[cfg(not(target_arch = "wasm32"))]
mod file_storage {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};

    /// File-based storage: a single JSON file which is a map of key -> string value.
    ///
    /// The file is read into memory on construction; every mutation rewrites it
    /// synchronously.
    pub struct FileStorage {
        path: PathBuf,
        inner: Mutex<HashMap<String, String>>,
    }

    impl FileStorage {
        /// Per-user default location:
        /// - On Windows: %APPDATA%/LandmarkMap/storage.json
        /// - Else: $HOME/.config/landmark-map/storage.json
        pub fn default_storage_path() -> PathBuf {
            if cfg!(windows)
                && let Ok(appdata) = std::env::var("APPDATA")
            {
                return Path::new(&appdata).join("LandmarkMap").join("storage.json");
            }

            if let Ok(home) = std::env::var("HOME") {
                return Path::new(&home)
                    .join(".config")
                    .join("landmark-map")
                    .join("storage.json");
            }

            Path::new(".").join("landmark-map-storage.json")
        }

        pub fn new_with_path(path: Option<PathBuf>) -> Result<Self, StorageError> {
            let path = path.unwrap_or_else(Self::default_storage_path);

            if let Some(parent) = path.parent()
                && let Err(e) = fs::create_dir_all(parent)
            {
                return Err(StorageError::Io(format!(
                    "Failed to create storage parent directory: {}",
                    e
                )));
            }

            let mut map = HashMap::new();
            if path.exists() {
                let s = fs::read_to_string(&path)
                    .map_err(|e| StorageError::Io(format!("Failed to read storage file: {}", e)))?;
                if !s.trim().is_empty() {
                    map = serde_json::from_str::<HashMap<String, String>>(&s).map_err(|e| {
                        StorageError::Json(format!("Failed to parse storage JSON: {}", e))
                    })?;
                }
            }

            tracing::debug!("Using storage file {}", path.display());

            Ok(FileStorage {
                path,
                inner: Mutex::new(map),
            })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
            self.inner
                .lock()
                .map_err(|e| StorageError::Platform(format!("mutex poisoned: {:?}", e)))
        }

        fn flush_locked(&self, locked: &HashMap<String, String>) -> StorageResult<()> {
            let s = serde_json::to_string_pretty(locked)
                .map_err(|e| StorageError::Json(e.to_string()))?;
            fs::write(&self.path, s).map_err(|e| StorageError::Io(format!("write failed: {}", e)))
        }
    }

    impl StorageBackend for FileStorage {
        fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
            let mut guard = self.lock()?;
            let previous = guard.insert(key.to_string(), value.to_string());
            if let Err(e) = self.flush_locked(&guard) {
                // Keep memory and disk in agreement
                match previous {
                    Some(old) => guard.insert(key.to_string(), old),
                    None => guard.remove(key),
                };
                return Err(e);
            }
            Ok(())
        }

        fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
            Ok(self.lock()?.get(key).cloned())
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            let mut guard = self.lock()?;
            if guard.remove(key).is_some() {
                self.flush_locked(&guard)?;
            }
            Ok(())
        }
    }

    pub fn default_backend(path: Option<PathBuf>) -> Result<Box<dyn StorageBackend>, StorageError> {
        Ok(Box::new(FileStorage::new_with_path(path)?))
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file_storage::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use web_storage::WebLocalStorage;

/// Create the default backend for the current platform. `path` only applies to native targets.
#[cfg(target_arch = "wasm32")]
pub use web_storage::default_backend as default_storage_backend;

/// Create the default backend for the current platform. `path` only applies to native targets.
#[cfg(not(target_arch = "wasm32"))]
pub use file_storage::default_backend as default_storage_backend;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_shares_state_between_clones() {
        let storage = MemoryStorage::new();
        let handle = storage.clone();

        storage.set_string("landmarks", "[]").unwrap();
        assert_eq!(handle.get_string("landmarks").unwrap().as_deref(), Some("[]"));

        handle.remove("landmarks").unwrap();
        assert_eq!(storage.get_string("landmarks").unwrap(), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        {
            let storage = FileStorage::new_with_path(Some(path.clone())).unwrap();
            assert_eq!(storage.get_string("landmarks").unwrap(), None);
            storage.set_string("landmarks", "[1]").unwrap();
        }

        let reopened = FileStorage::new_with_path(Some(path.clone())).unwrap();
        assert_eq!(reopened.get_string("landmarks").unwrap().as_deref(), Some("[1]"));
        assert_eq!(reopened.path(), path.as_path());

        reopened.remove("landmarks").unwrap();
        let reopened = FileStorage::new_with_path(Some(path)).unwrap();
        assert_eq!(reopened.get_string("landmarks").unwrap(), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_storage_rejects_corrupted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = FileStorage::new_with_path(Some(path));
        assert!(matches!(result, Err(StorageError::Json(_))));
    }
}
