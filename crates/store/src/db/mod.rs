//! Repositories over the durable key-value store.
//!
//! Each entity collection is persisted as a single JSON array under one
//! key (`users`, `products`). Every mutation reads the full collection,
//! mutates a copy, and writes the collection back in one `set` call —
//! all-or-nothing per write, safe under the single-writer model.

pub mod products;
pub mod users;

pub use products::ProductRepository;
pub use users::UserRepository;

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur in repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Storage layer failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}
