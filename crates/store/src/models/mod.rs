//! Persisted and derived domain records.

pub mod product;
pub mod session;
pub mod user;

pub use product::{CatalogStats, CategoryStats, Product, ProductPatch};
pub use session::Session;
pub use user::{PublicUser, User, UserPatch};
