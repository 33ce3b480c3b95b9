//! Shared domain types for Vitrine.
//!
//! This crate holds the types every other Vitrine crate speaks in:
//! type-safe entity IDs, the validated [`Email`] type, user [`Role`]s,
//! product [`Category`]s and [`Price`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::category::{Category, CategoryError};
pub use types::email::{Email, EmailError};
pub use types::id::{ProductId, SessionId, UserId};
pub use types::price::{Price, PriceError};
pub use types::role::{Role, RoleError};
