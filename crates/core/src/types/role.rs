//! User roles.

use serde::{Deserialize, Serialize};

/// Error returned when parsing a [`Role`] from a string.
#[derive(thiserror::Error, Debug, Clone)]
#[error("invalid role: {0}")]
pub struct RoleError(pub String);

/// Role gating page and operation access.
///
/// `Admin` passes every permission check; the other roles only match
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular shopper.
    Client,
    /// Store seller with access to the seller dashboard.
    Seller,
    /// Full access, including user management.
    Admin,
}

impl Role {
    /// Whether a user with this role satisfies a `required` role check.
    ///
    /// Admin short-circuits to `true` for any requirement; every other
    /// role must match exactly.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self == Self::Admin || self == required
    }

    /// All roles, in display order.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Client, Self::Seller, Self::Admin]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Seller => write!(f, "seller"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            other => Err(RoleError(other.to_owned())),
        }
    }
}
