//! Shared application state.
//!
//! The composition root: wires repositories and services over the two
//! storage scopes and hands out cheap clones. Hosts build one
//! [`AppState`] at startup and pass it around.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::StoreConfig;
use crate::db::{ProductRepository, UserRepository};
use crate::error::Result;
use crate::services::auth::AuthService;
use crate::services::catalog::{CatalogQueryEngine, QueryCache};
use crate::services::credentials::CredentialService;
use crate::services::session::SessionService;
use crate::services::stock::StockWorkflow;
use crate::services::users::UserService;
use crate::storage::KeyValueStore;

/// Shared application state. Cloning is cheap (a single `Arc` bump).
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Arc<StoreConfig>,
    users: Arc<UserRepository>,
    products: Arc<ProductRepository>,
    credentials: Arc<CredentialService>,
    sessions: Arc<SessionService>,
    auth: Arc<AuthService>,
    user_service: Arc<UserService>,
    catalog: Arc<CatalogQueryEngine>,
    stock: Arc<StockWorkflow>,
}

impl AppState {
    /// Wire the full service graph.
    ///
    /// `durable_store` holds users and products (survives restarts);
    /// `session_store` holds the session record (one per "tab").
    /// Call [`initialize`](Self::initialize) before serving queries.
    #[must_use]
    pub fn new(
        durable_store: Arc<dyn KeyValueStore>,
        session_store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: StoreConfig,
    ) -> Self {
        let config = Arc::new(config);
        let credentials = Arc::new(CredentialService::default());

        let users = Arc::new(UserRepository::new(
            Arc::clone(&durable_store),
            Arc::clone(&clock),
        ));
        let products = Arc::new(ProductRepository::new(
            durable_store,
            Arc::clone(&clock),
            Arc::clone(&config),
        ));

        let sessions = Arc::new(SessionService::new(
            session_store,
            Arc::clone(&clock),
            Arc::clone(&credentials),
            config.session,
        ));
        let auth = Arc::new(AuthService::new(
            Arc::clone(&users),
            Arc::clone(&sessions),
            Arc::clone(&credentials),
        ));
        let user_service = Arc::new(UserService::new(
            Arc::clone(&users),
            Arc::clone(&credentials),
            Arc::clone(&auth),
            Arc::clone(&clock),
        ));

        let catalog = Arc::new(CatalogQueryEngine::new(
            Arc::clone(&products),
            QueryCache::new(clock, config.cache),
            Arc::clone(&config),
        ));
        let stock = Arc::new(StockWorkflow::new(
            Arc::clone(&products),
            Arc::clone(&catalog),
            Arc::clone(&config),
        ));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                users,
                products,
                credentials,
                sessions,
                auth,
                user_service,
                catalog,
                stock,
            }),
        }
    }

    /// Load (or seed) the catalog and restore any persisted session.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage layer fails.
    pub fn initialize(&self) -> Result<()> {
        self.inner.products.initialize()?;
        self.inner.auth.init()?;
        Ok(())
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn users(&self) -> &Arc<UserRepository> {
        &self.inner.users
    }

    #[must_use]
    pub fn products(&self) -> &Arc<ProductRepository> {
        &self.inner.products
    }

    #[must_use]
    pub fn credentials(&self) -> &Arc<CredentialService> {
        &self.inner.credentials
    }

    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionService> {
        &self.inner.sessions
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<AuthService> {
        &self.inner.auth
    }

    #[must_use]
    pub fn user_service(&self) -> &Arc<UserService> {
        &self.inner.user_service
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<CatalogQueryEngine> {
        &self.inner.catalog
    }

    #[must_use]
    pub fn stock(&self) -> &Arc<StockWorkflow> {
        &self.inner.stock
    }
}
