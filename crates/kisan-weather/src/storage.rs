//! File-backed preference storage.
//!
//! Each key lives in its own `<key>.json` file so a corrupted value never
//! takes the others down with it. Writes go through a temp file in the same
//! directory followed by a rename, under the store's lock.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use kisan_core::StorageError;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub const FAVORITES_KEY: &str = "favorites";
pub const LANGUAGE_KEY: &str = "language";
pub const MODEL_SETTINGS_KEY: &str = "model-settings";
pub const LAST_LOCATION_KEY: &str = "last-location";

#[derive(Debug, Default)]
struct StoreState {
    /// Last value written or successfully read, per key
    cache: HashMap<String, Value>,
    /// Set once the disk has failed us; from then on we are memory only
    degraded: bool,
}

#[derive(Debug)]
pub struct PreferenceStore {
    dir: Option<PathBuf>,
    state: Mutex<StoreState>,
}

impl PreferenceStore {
    /// Open a store rooted at `dir`, creating it if needed.
    ///
    /// Never fails: an unusable directory leaves the store in memory-only
    /// mode.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let mut state = StoreState::default();

        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::warn!(
                "Preference directory {:?} unavailable, keeping settings in memory: {}",
                dir,
                e
            );
            state.degraded = true;
        }

        Self {
            dir: Some(dir),
            state: Mutex::new(state),
        }
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            dir: None,
            state: Mutex::new(StoreState {
                cache: HashMap::new(),
                degraded: true,
            }),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.state.lock().degraded
    }

    fn path_for(dir: &Path, key: &str) -> PathBuf {
        dir.join(format!("{}.json", key))
    }

    /// Read a value. `Ok(None)` means nothing has been stored yet.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let mut state = self.state.lock();

        let cached = state.cache.get(key).cloned();
        let value = match cached {
            Some(value) => value,
            None => {
                let degraded = state.degraded;
                let Some(dir) = self.dir.as_deref().filter(|_| !degraded) else {
                    return Ok(None);
                };
                let path = Self::path_for(dir, key);
                let text = match fs::read_to_string(&path) {
                    Ok(text) => text,
                    Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
                    Err(e) => {
                        return Err(StorageError::Unavailable(format!(
                            "read {:?}: {}",
                            path, e
                        )))
                    }
                };
                let value: Value =
                    serde_json::from_str(&text).map_err(|e| corrupted(key, e))?;
                state.cache.insert(key.to_string(), value.clone());
                value
            }
        };

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| corrupted(key, e))
    }

    /// Store a value and flush it to disk before returning.
    ///
    /// The in-memory copy is updated even when the disk write fails, so the
    /// value survives until restart.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value)
            .map_err(|e| StorageError::Unavailable(format!("serialize '{}': {}", key, e)))?;

        let mut state = self.state.lock();
        state.cache.insert(key.to_string(), value.clone());

        let Some(dir) = self.dir.as_deref() else {
            return Ok(());
        };
        if state.degraded {
            return Err(StorageError::Unavailable(format!(
                "'{}' kept in memory only",
                key
            )));
        }

        if let Err(e) = write_atomic(dir, &Self::path_for(dir, key), &value) {
            tracing::warn!("Failed to persist '{}', continuing in memory: {}", key, e);
            state.degraded = true;
            return Err(StorageError::Unavailable(e.to_string()));
        }

        tracing::debug!("Saved preference '{}'", key);
        Ok(())
    }
}

fn corrupted(key: &str, e: serde_json::Error) -> StorageError {
    StorageError::Corrupted {
        key: key.to_string(),
        message: e.to_string(),
    }
}

fn write_atomic(dir: &Path, path: &Path, value: &Value) -> std::io::Result<()> {
    let json = serde_json::to_vec_pretty(value)?;

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(&json)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
