//! Test harness for Vitrine integration tests.
//!
//! Builds the full service graph over in-memory stores and a manual
//! clock, so tests can drive session and cache expiry deterministically
//! instead of sleeping.

use std::sync::Arc;

use chrono::Utc;
use secrecy::SecretString;

use vitrine_core::Role;
use vitrine_store::AppState;
use vitrine_store::clock::{Clock, ManualClock};
use vitrine_store::config::StoreConfig;
use vitrine_store::models::user::PublicUser;
use vitrine_store::services::users::NewUser;
use vitrine_store::storage::{KeyValueStore, MemoryStore};

/// A fully-wired store over in-memory storage, seeded and initialized.
pub struct TestContext {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    durable: Arc<MemoryStore>,
    session: Arc<MemoryStore>,
}

impl TestContext {
    /// Build and initialize a fresh context.
    ///
    /// # Panics
    ///
    /// Panics if initialization fails; tests want the backtrace.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Build a context with a custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if initialization fails.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let durable = Arc::new(MemoryStore::new());
        let session = Arc::new(MemoryStore::new());

        let state = AppState::new(
            Arc::clone(&durable) as Arc<dyn KeyValueStore>,
            Arc::clone(&session) as Arc<dyn KeyValueStore>,
            Arc::clone(&clock) as Arc<dyn Clock>,
            config,
        );
        state.initialize().expect("state initialization failed");

        Self {
            state,
            clock,
            durable,
            session,
        }
    }

    /// Rebuild the service graph over the same stores, simulating a
    /// process restart (in-memory state is lost, storage survives).
    #[must_use]
    pub fn restart(&self) -> Self {
        let restarted = Self {
            state: AppState::new(
                Arc::clone(&self.durable) as Arc<dyn KeyValueStore>,
                Arc::clone(&self.session) as Arc<dyn KeyValueStore>,
                Arc::clone(&self.clock) as Arc<dyn Clock>,
                StoreConfig::default(),
            ),
            clock: Arc::clone(&self.clock),
            durable: Arc::clone(&self.durable),
            session: Arc::clone(&self.session),
        };
        restarted
            .state
            .initialize()
            .expect("state initialization failed");
        restarted
    }

    /// Register an account with a known-good password.
    ///
    /// # Panics
    ///
    /// Panics if registration fails.
    pub fn register(&self, name: &str, email: &str, role: Role) -> PublicUser {
        self.state
            .user_service()
            .register(NewUser {
                name: name.to_owned(),
                email: email.to_owned(),
                password: secret("Senha123"),
                password_confirmation: secret("Senha123"),
                role,
                phone: None,
                tax_id: None,
            })
            .expect("registration failed")
    }

    /// Register and sign in, returning the sanitized user.
    ///
    /// # Panics
    ///
    /// Panics if registration or login fails.
    pub fn register_and_login(&self, name: &str, email: &str, role: Role) -> PublicUser {
        let user = self.register(name, email, role);
        self.state
            .auth()
            .login(email, &secret("Senha123"))
            .expect("login failed");
        user
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for test passwords.
#[must_use]
pub fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_owned())
}
