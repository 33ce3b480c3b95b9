//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrine_core::{Email, Role, UserId};

use crate::services::credentials::PasswordHash;

/// A registered user, as persisted.
///
/// Carries the password digest and salt; never hand this to the host
/// UI — project through [`PublicUser`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque unique ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique (case-insensitive) email address.
    pub email: Email,
    /// Base64 digest of the salted password.
    pub password_digest: String,
    /// Base64 salt the digest was derived with.
    pub salt: String,
    /// Access role.
    pub role: Role,
    /// Optional phone number (digits only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Optional tax ID (digits only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Sanitized user view for the host UI.
///
/// Never includes the password digest or salt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            phone: user.phone.clone(),
            tax_id: user.tax_id.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Partial update to a [`User`].
///
/// `None` fields are left untouched; the repository stamps `updated_at`
/// on every applied patch.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub role: Option<Role>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    /// Replacement credentials from a password change.
    pub password: Option<PasswordHash>,
}

impl UserPatch {
    /// Apply this patch to `user` (without stamping `updated_at`).
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(phone) = self.phone {
            user.phone = Some(phone);
        }
        if let Some(tax_id) = self.tax_id {
            user.tax_id = Some(tax_id);
        }
        if let Some(password) = self.password {
            user.password_digest = password.digest;
            user.salt = password.salt;
        }
    }
}
