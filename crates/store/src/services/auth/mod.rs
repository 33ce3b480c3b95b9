//! Authentication state machine.
//!
//! Holds an in-memory mirror of the signed-in user alongside the
//! persisted session record. The mirror is what page guards consult
//! synchronously; the session record is what survives a restart. The
//! two are reconciled at [`AuthService::init`] and whenever activity is
//! reported.
//!
//! Login errors are uniform: unknown email, wrong password, and
//! malformed email all surface as [`AuthError::InvalidCredentials`].

mod error;

pub use error::AuthError;

use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use secrecy::SecretString;

use vitrine_core::{Email, Role};

use crate::db::UserRepository;
use crate::models::user::{PublicUser, User, UserPatch};
use crate::services::credentials::{CredentialError, CredentialService};
use crate::services::session::SessionService;

/// Snapshot of the auth state, delivered to observers on every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    SignedIn(PublicUser),
    SignedOut,
}

type Observer = Box<dyn Fn(&AuthState) + Send + Sync>;

/// Login, logout, permission checks, and session restoration.
pub struct AuthService {
    users: Arc<UserRepository>,
    sessions: Arc<SessionService>,
    credentials: Arc<CredentialService>,
    current_user: RwLock<Option<User>>,
    observers: RwLock<Vec<Observer>>,
}

impl AuthService {
    /// Create the service. Call [`init`](Self::init) afterwards to
    /// restore any persisted session.
    #[must_use]
    pub fn new(
        users: Arc<UserRepository>,
        sessions: Arc<SessionService>,
        credentials: Arc<CredentialService>,
    ) -> Self {
        Self {
            users,
            sessions,
            credentials,
            current_user: RwLock::new(None),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Restore the signed-in user from a persisted live session.
    ///
    /// A session whose user no longer exists is cleared rather than
    /// restored.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store or user repository fails.
    pub fn init(&self) -> Result<(), AuthError> {
        let Some(session) = self.sessions.current()? else {
            return Ok(());
        };

        match self.users.by_id(&session.user_id)? {
            Some(user) => {
                tracing::debug!(user_id = %user.id, "session restored");
                self.set_current(Some(user));
            }
            None => {
                tracing::warn!(user_id = %session.user_id, "session user missing, clearing");
                self.sessions.clear()?;
            }
        }
        Ok(())
    }

    /// Authenticate and start a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on any authentication
    /// failure, or a session/repository error if the machinery fails.
    pub fn login(&self, email: &str, password: &SecretString) -> Result<PublicUser, AuthError> {
        // A malformed email cannot match any account; same error as a
        // wrong password.
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .users
            .by_email(&email)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !CredentialService::verify_password(password, &user.salt, &user.password_digest) {
            tracing::debug!(user_id = %user.id, "password verification failed");
            return Err(AuthError::InvalidCredentials);
        }

        self.sessions.create(&user)?;
        let public = PublicUser::from(&user);
        self.set_current(Some(user));

        tracing::info!(user_id = %public.id, role = %public.role, "login");
        Ok(public)
    }

    /// End the session. Idempotent; logging out while signed out is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns a session error if clearing the record fails.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.sessions.clear()?;
        if self.snapshot().is_some() {
            tracing::info!("logout");
            self.set_current(None);
        }
        Ok(())
    }

    /// Whether a user is signed in with a live session.
    ///
    /// Both halves must agree: the in-memory mirror and the persisted
    /// session record. A stale mirror over an expired session is
    /// cleared here.
    ///
    /// # Errors
    ///
    /// Returns a session error if the store fails.
    pub fn is_logged_in(&self) -> Result<bool, AuthError> {
        if self.snapshot().is_none() {
            return Ok(false);
        }
        if !self.sessions.is_valid()? {
            self.set_current(None);
            return Ok(false);
        }
        Ok(true)
    }

    /// The signed-in user, if the session is still live.
    ///
    /// # Errors
    ///
    /// Returns a session error if the store fails.
    pub fn current_user(&self) -> Result<Option<PublicUser>, AuthError> {
        if !self.is_logged_in()? {
            return Ok(None);
        }
        Ok(self.snapshot().map(|u| PublicUser::from(&u)))
    }

    /// Whether the signed-in user's role satisfies `required`.
    ///
    /// # Errors
    ///
    /// Returns a session error if the store fails.
    pub fn has_permission(&self, required: Role) -> Result<bool, AuthError> {
        Ok(self
            .current_user()?
            .is_some_and(|u| u.role.satisfies(required)))
    }

    /// Change the signed-in user's password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthenticated`] if signed out,
    /// [`AuthError::InvalidCredentials`] if `current` does not verify,
    /// or [`AuthError::WeakPassword`] if `new` fails policy.
    pub fn change_password(
        &self,
        current: &SecretString,
        new: &SecretString,
    ) -> Result<(), AuthError> {
        if !self.is_logged_in()? {
            return Err(AuthError::NotAuthenticated);
        }
        let Some(user) = self.snapshot() else {
            return Err(AuthError::NotAuthenticated);
        };

        if !CredentialService::verify_password(current, &user.salt, &user.password_digest) {
            return Err(AuthError::InvalidCredentials);
        }

        let hash = self
            .credentials
            .create_password_hash(new)
            .map_err(|e| match e {
                CredentialError::WeakPassword { rules } => AuthError::WeakPassword { rules },
                other => AuthError::Credential(other),
            })?;

        let updated = self
            .users
            .update(
                &user.id,
                UserPatch {
                    password: Some(hash),
                    ..UserPatch::default()
                },
            )?
            .ok_or(AuthError::NotAuthenticated)?;

        tracing::info!(user_id = %updated.id, "password changed");
        self.set_current(Some(updated));
        Ok(())
    }

    /// Report user activity, extending the session. If the session has
    /// expired in the meantime the user is signed out.
    ///
    /// # Errors
    ///
    /// Returns a session error if the store fails.
    pub fn update_last_activity(&self) -> Result<(), AuthError> {
        self.sessions.touch()?;
        // Re-check; touch does not revive an expired session.
        self.is_logged_in()?;
        Ok(())
    }

    /// Register an observer called on every auth state change.
    pub fn subscribe(&self, observer: impl Fn(&AuthState) + Send + Sync + 'static) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(observer));
    }

    fn snapshot(&self) -> Option<User> {
        self.current_user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_current(&self, user: Option<User>) {
        let state = user.as_ref().map_or(AuthState::SignedOut, |u| {
            AuthState::SignedIn(PublicUser::from(u))
        });

        *self
            .current_user
            .write()
            .unwrap_or_else(PoisonError::into_inner) = user;

        for observer in self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
        {
            observer(&state);
        }
    }
}
