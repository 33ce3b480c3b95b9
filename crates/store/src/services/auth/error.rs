//! Auth error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::credentials::CredentialError;
use crate::services::session::SessionError;

/// Errors from auth operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login failed. Covers unknown email, wrong password, and
    /// malformed email alike so callers cannot enumerate accounts.
    #[error("credenciais inválidas")]
    InvalidCredentials,

    /// The operation requires a live session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A new password failed policy validation.
    #[error("password does not meet policy: {}", rules.join("; "))]
    WeakPassword { rules: Vec<String> },

    /// Session layer failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// User repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Credential layer failure (randomness, hashing).
    #[error(transparent)]
    Credential(#[from] CredentialError),
}
