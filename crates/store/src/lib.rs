//! Vitrine storefront core.
//!
//! This crate is the engine behind the Vitrine demo storefront: the
//! product catalog with search/filter/sort/pagination, the quantized
//! stock-increment workflow, and the auth/session state machine that
//! gates page access. There is no server — persistence is a pluggable
//! [`storage::KeyValueStore`] (JSON file or in-memory), and the host
//! (CLI, UI shell) composes the services through [`state::AppState`].
//!
//! # Concurrency model
//!
//! Single writer per process. Every mutation reads the full persisted
//! collection, mutates a copy, and writes it back in one call; two
//! concurrent processes over the same file store can lose updates
//! (last write wins). This mirrors the single-browser-tab model the
//! system is specified for and is a documented non-goal, not a bug.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;

pub use error::{Result, StoreError};
pub use state::AppState;
