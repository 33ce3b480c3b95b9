//! Business services composed over the repositories.

pub mod auth;
pub mod catalog;
pub mod credentials;
pub mod session;
pub mod stock;
pub mod users;

pub use auth::{AuthError, AuthService, AuthState};
pub use catalog::{CatalogError, CatalogQueryEngine, ProductQuery, QueryResult};
pub use credentials::{CredentialError, CredentialService, PasswordPolicy};
pub use session::{SessionError, SessionService};
pub use stock::{StockError, StockWorkflow};
pub use users::{NewUser, UserError, UserService};
