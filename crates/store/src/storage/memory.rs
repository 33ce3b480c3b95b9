//! In-memory store.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::{KeyValueStore, StorageError, namespaced};

/// A [`KeyValueStore`] backed by a process-local map.
///
/// Used for the session scope (cleared when the process ends, like
/// browser session storage) and as the durable scope in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(&namespaced(key)).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(namespaced(key), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.remove(&namespaced(key)).is_some())
    }

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.contains_key(&namespaced(key)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get_raw("k").unwrap().is_none());

        store.set_raw("k", "\"v\"").unwrap();
        assert_eq!(store.get_raw("k").unwrap().as_deref(), Some("\"v\""));
        assert!(store.contains("k").unwrap());

        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
        assert!(!store.contains("k").unwrap());
    }

    #[test]
    fn test_keys_are_namespaced() {
        let store = MemoryStore::new();
        store.set_raw("k", "1").unwrap();

        let entries = store.entries.read().unwrap();
        assert!(entries.contains_key("vitrine.k"));
    }
}
