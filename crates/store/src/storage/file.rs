//! Durable JSON-file store.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{KeyValueStore, StorageError, namespaced};

/// A [`KeyValueStore`] persisted as one JSON object in a single file.
///
/// Stands in for browser local storage: small, synchronous, durable
/// across restarts. Every operation reads the whole file, mutates the
/// map, and writes it back through a temp file + rename so a failed
/// write never corrupts the previous contents.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (or create on first write) the store at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The file backing this store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&raw).map_err(|source| StorageError::Serialization {
            key: self.path.display().to_string(),
            source,
        })
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string_pretty(entries).map_err(|source| StorageError::Serialization {
                key: self.path.display().to_string(),
                source,
            })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(&namespaced(key)))
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut entries = self.load()?;
        entries.insert(namespaced(key), value.to_owned());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut entries = self.load()?;
        let removed = entries.remove(&namespaced(key)).is_some();
        if removed {
            self.persist(&entries)?;
        }
        Ok(removed)
    }

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.load()?.contains_key(&namespaced(key)))
    }
}
