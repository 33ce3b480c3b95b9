//! Session lifecycle over the session-scoped store.
//!
//! One session record at a time. Validity is derived lazily: a session
//! is live while the time since `last_activity_at` stays strictly below
//! the configured inactivity timeout. Nothing expires in the
//! background; expired records are swept when they are next read.

use std::sync::Arc;

use thiserror::Error;

use vitrine_core::SessionId;

use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::models::session::{Session, keys};
use crate::models::user::User;
use crate::services::credentials::{CredentialError, CredentialService};
use crate::storage::{KeyValueStore, KeyValueStoreExt, StorageError};

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Session store failure.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),

    /// Token generation failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Creates, refreshes, and expires the singleton session record.
pub struct SessionService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    credentials: Arc<CredentialService>,
    config: SessionConfig,
}

impl SessionService {
    /// Create a session service over the session-scoped store.
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        credentials: Arc<CredentialService>,
        config: SessionConfig,
    ) -> Self {
        Self {
            store,
            clock,
            credentials,
            config,
        }
    }

    /// Start a session for `user`, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if token generation or the persist fails.
    pub fn create(&self, user: &User) -> Result<Session, SessionError> {
        let now = self.clock.now();
        let session = Session {
            user_id: user.id.clone(),
            role: user.role,
            session_id: SessionId::new(self.credentials.generate_token()?),
            created_at: now,
            last_activity_at: now,
        };

        self.store.set(keys::SESSION, &session)?;
        tracing::debug!(user_id = %session.user_id, "session created");
        Ok(session)
    }

    /// The current session record, expired or not.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store fails.
    pub fn read(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.store.get(keys::SESSION)?)
    }

    /// The current session, with expired records swept on read.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store fails.
    pub fn current(&self) -> Result<Option<Session>, SessionError> {
        let Some(session) = self.read()? else {
            return Ok(None);
        };

        if self.is_live(&session) {
            Ok(Some(session))
        } else {
            tracing::debug!(user_id = %session.user_id, "session expired, clearing");
            self.clear()?;
            Ok(None)
        }
    }

    /// Whether a live session exists.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store fails.
    pub fn is_valid(&self) -> Result<bool, SessionError> {
        Ok(self.current()?.is_some())
    }

    /// Refresh `last_activity_at` on the current session, if one is
    /// live. Touching an expired session does not revive it.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store fails.
    pub fn touch(&self) -> Result<(), SessionError> {
        let Some(mut session) = self.current()? else {
            return Ok(());
        };

        session.last_activity_at = self.clock.now();
        self.store.set(keys::SESSION, &session)?;
        Ok(())
    }

    /// Remove the session record. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store fails.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.store.remove(keys::SESSION)?;
        Ok(())
    }

    fn is_live(&self, session: &Session) -> bool {
        let elapsed = self.clock.now() - session.last_activity_at;
        elapsed < self.config.timeout()
    }
}
