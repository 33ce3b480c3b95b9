//! Key-value persistence.
//!
//! The whole system persists through [`KeyValueStore`]: JSON-serialized
//! values under namespaced string keys. Two *scopes* exist by
//! convention — a durable store (users, products) and a session-scoped
//! store (the active session) — represented as two store instances
//! chosen by the composition root.
//!
//! Implementations must keep single writes all-or-nothing: a failed
//! `set` leaves the previously stored value readable.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Namespace prefix applied to every key.
pub const KEY_PREFIX: &str = "vitrine.";

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A value failed to (de)serialize.
    #[error("serialization error for key {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backing medium failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A namespaced key-value store holding JSON strings.
///
/// Object-safe; typed access goes through [`KeyValueStoreExt`].
pub trait KeyValueStore: Send + Sync {
    /// Read the raw JSON stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the backing medium fails.
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store raw JSON under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the backing medium fails; the
    /// previous value must survive a failed write.
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Returns whether a value was present.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the backing medium fails.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;

    /// Whether `key` currently holds a value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the backing medium fails.
    fn contains(&self, key: &str) -> Result<bool, StorageError>;
}

/// Typed helpers over any [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    /// Read and deserialize the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if the stored JSON does
    /// not match `T`, or an I/O error from the backing medium.
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get_raw(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::Serialization {
                    key: key.to_owned(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Read the value under `key`, falling back to `default()` when the
    /// key is absent.
    ///
    /// # Errors
    ///
    /// Same as [`KeyValueStoreExt::get`].
    fn get_or<T: DeserializeOwned>(
        &self,
        key: &str,
        default: impl FnOnce() -> T,
    ) -> Result<T, StorageError> {
        Ok(self.get(key)?.unwrap_or_else(default))
    }

    /// Serialize and store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if `value` fails to
    /// serialize, or an I/O error from the backing medium.
    fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialization {
            key: key.to_owned(),
            source,
        })?;
        self.set_raw(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

/// Apply the store namespace to a logical key.
pub(crate) fn namespaced(key: &str) -> String {
    format!("{KEY_PREFIX}{key}")
}
