//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::catalog::CatalogError;
use crate::services::credentials::CredentialError;
use crate::services::session::SessionError;
use crate::services::stock::StockError;
use crate::services::users::UserError;
use crate::storage::StorageError;

/// Convenience alias for fallible store operations.
pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Umbrella error for hosts that drive the whole store through one
/// surface. Service layers keep their own error types; this exists for
/// composition roots like the CLI.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error(transparent)]
    User(#[from] UserError),
}
