//! User management: registration, profile updates, admin operations.
//!
//! Validation collects every field error before failing so the host
//! form can highlight all of them at once. Messages are user-facing
//! Portuguese, matching the storefront locale.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use vitrine_core::{Email, Role, UserId};

use crate::clock::Clock;
use crate::db::{RepositoryError, UserRepository};
use crate::models::user::{PublicUser, User, UserPatch};
use crate::services::auth::AuthService;
use crate::services::credentials::{CredentialError, CredentialService};

/// A single invalid form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Errors from user management operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// One or more form fields are invalid.
    #[error("invalid fields: {}", .0.iter().map(|e| e.field).collect::<Vec<_>>().join(", "))]
    Validation(Vec<FieldError>),

    /// The email is already registered.
    #[error("este email já está em uso")]
    EmailTaken,

    /// The signed-in user may not perform this operation.
    #[error("permission denied")]
    PermissionDenied,

    /// No user with the given id.
    #[error("usuário não encontrado")]
    NotFound,

    /// Admins cannot delete their own account.
    #[error("não é possível excluir seu próprio usuário")]
    CannotDeleteSelf,

    /// User repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Credential layer failure.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Auth layer failure while checking permissions.
    #[error(transparent)]
    Auth(#[from] crate::services::auth::AuthError),
}

/// Registration form input. Raw strings are validated and normalized
/// here; only the password travels as a secret.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub password_confirmation: SecretString,
    pub role: Role,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
}

/// Profile update form input. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
}

/// Registration and account administration.
pub struct UserService {
    users: Arc<UserRepository>,
    credentials: Arc<CredentialService>,
    auth: Arc<AuthService>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    /// Create the service.
    #[must_use]
    pub fn new(
        users: Arc<UserRepository>,
        credentials: Arc<CredentialService>,
        auth: Arc<AuthService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            credentials,
            auth,
            clock,
        }
    }

    /// Register a new account. Open to anyone; the requested role is
    /// taken as-is, matching the public registration form.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Validation`] listing every invalid field,
    /// [`UserError::EmailTaken`] if the email is in use, or a
    /// credential/repository error.
    pub fn register(&self, form: NewUser) -> Result<PublicUser, UserError> {
        let mut errors = Vec::new();

        let name = validate_name(&form.name, &mut errors);
        let email = validate_email(&form.email, &mut errors);

        let report = self.credentials.policy().validate(&form.password);
        if !report.is_acceptable() {
            for message in report.violations {
                errors.push(FieldError {
                    field: "password",
                    message,
                });
            }
        }
        if form.password.expose_secret() != form.password_confirmation.expose_secret() {
            errors.push(FieldError {
                field: "password_confirmation",
                message: "senhas não coincidem".to_owned(),
            });
        }

        let phone = form
            .phone
            .as_deref()
            .map(|raw| normalize_phone(raw, &mut errors));
        let tax_id = form
            .tax_id
            .as_deref()
            .map(|raw| normalize_tax_id(raw, &mut errors));

        if !errors.is_empty() {
            return Err(UserError::Validation(errors));
        }
        let (Some(name), Some(email)) = (name, email) else {
            // Unreachable: a missing value always pushed an error.
            return Err(UserError::Validation(Vec::new()));
        };

        if self.users.email_exists(&email)? {
            return Err(UserError::EmailTaken);
        }

        let hash = self.credentials.create_password_hash(&form.password)?;
        let now = self.clock.now();
        let user = User {
            id: UserId::new(self.credentials.generate_user_id()),
            name,
            email,
            password_digest: hash.digest,
            salt: hash.salt,
            role: form.role,
            phone: phone.flatten(),
            tax_id: tax_id.flatten(),
            created_at: now,
            updated_at: now,
        };

        let public = PublicUser::from(&user);
        match self.users.add(user) {
            Ok(()) => {}
            // Lost the race between the exists check and the insert.
            Err(RepositoryError::Conflict(_)) => return Err(UserError::EmailTaken),
            Err(other) => return Err(other.into()),
        }

        tracing::info!(user_id = %public.id, role = %public.role, "user registered");
        Ok(public)
    }

    /// Update a profile. Allowed for admins and for the account owner.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::PermissionDenied`] for anyone else,
    /// [`UserError::Validation`] or [`UserError::EmailTaken`] on bad
    /// input, and [`UserError::NotFound`] for an unknown id.
    pub fn update_profile(
        &self,
        id: &UserId,
        update: ProfileUpdate,
    ) -> Result<PublicUser, UserError> {
        self.require_admin_or_self(id)?;

        let mut errors = Vec::new();
        let name = update
            .name
            .as_deref()
            .map(|raw| validate_name(raw, &mut errors));
        let email = update
            .email
            .as_deref()
            .map(|raw| validate_email(raw, &mut errors));
        let phone = update
            .phone
            .as_deref()
            .map(|raw| normalize_phone(raw, &mut errors));
        let tax_id = update
            .tax_id
            .as_deref()
            .map(|raw| normalize_tax_id(raw, &mut errors));

        if !errors.is_empty() {
            return Err(UserError::Validation(errors));
        }

        let patch = UserPatch {
            name: name.flatten(),
            email: email.flatten(),
            phone: phone.flatten(),
            tax_id: tax_id.flatten(),
            ..UserPatch::default()
        };

        let updated = match self.users.update(id, patch) {
            Ok(Some(user)) => user,
            Ok(None) => return Err(UserError::NotFound),
            Err(RepositoryError::Conflict(_)) => return Err(UserError::EmailTaken),
            Err(other) => return Err(other.into()),
        };
        Ok(PublicUser::from(&updated))
    }

    /// Delete an account. Admin only; deleting your own account is
    /// rejected so the system cannot lose its last administrator.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::PermissionDenied`],
    /// [`UserError::CannotDeleteSelf`], or [`UserError::NotFound`].
    pub fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.require_admin()?;

        if self
            .auth
            .current_user()?
            .is_some_and(|current| &current.id == id)
        {
            return Err(UserError::CannotDeleteSelf);
        }

        if !self.users.remove(id)? {
            return Err(UserError::NotFound);
        }
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// All users, sanitized. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::PermissionDenied`] for non-admins.
    pub fn list_users(&self) -> Result<Vec<PublicUser>, UserError> {
        self.require_admin()?;
        Ok(self
            .users
            .all()?
            .iter()
            .map(PublicUser::from)
            .collect())
    }

    /// Look up a user. Allowed for admins and for the account owner.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::PermissionDenied`] or
    /// [`UserError::NotFound`].
    pub fn find_user(&self, id: &UserId) -> Result<PublicUser, UserError> {
        self.require_admin_or_self(id)?;
        self.users
            .by_id(id)?
            .map(|u| PublicUser::from(&u))
            .ok_or(UserError::NotFound)
    }

    fn require_admin(&self) -> Result<(), UserError> {
        if self.auth.has_permission(Role::Admin)? {
            Ok(())
        } else {
            Err(UserError::PermissionDenied)
        }
    }

    fn require_admin_or_self(&self, id: &UserId) -> Result<(), UserError> {
        if self.auth.has_permission(Role::Admin)? {
            return Ok(());
        }
        if self
            .auth
            .current_user()?
            .is_some_and(|current| &current.id == id)
        {
            return Ok(());
        }
        Err(UserError::PermissionDenied)
    }
}

fn validate_name(raw: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    let name = raw.trim();
    if name.chars().count() < 2 {
        errors.push(FieldError {
            field: "name",
            message: "nome deve ter pelo menos 2 caracteres".to_owned(),
        });
        return None;
    }
    if name.chars().count() > 100 {
        errors.push(FieldError {
            field: "name",
            message: "nome muito longo".to_owned(),
        });
        return None;
    }
    if !name.chars().all(|c| c.is_alphabetic() || c == ' ') {
        errors.push(FieldError {
            field: "name",
            message: "nome deve conter apenas letras e espaços".to_owned(),
        });
        return None;
    }
    Some(name.to_owned())
}

fn validate_email(raw: &str, errors: &mut Vec<FieldError>) -> Option<Email> {
    match Email::parse(raw) {
        Ok(email) => Some(email),
        Err(e) => {
            errors.push(FieldError {
                field: "email",
                message: e.to_string(),
            });
            None
        }
    }
}

/// Strip formatting and require a 10 or 11 digit number not starting
/// with zero.
fn normalize_phone(raw: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let valid = matches!(digits.len(), 10 | 11) && !digits.starts_with('0');
    if valid {
        Some(digits)
    } else {
        errors.push(FieldError {
            field: "phone",
            message: "telefone deve ter 10 ou 11 dígitos".to_owned(),
        });
        None
    }
}

/// Strip formatting and require 11 digits that are not all identical.
fn normalize_tax_id(raw: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let all_same = digits.chars().all(|c| digits.starts_with(c));
    if digits.len() == 11 && !all_same {
        Some(digits)
    } else {
        errors.push(FieldError {
            field: "tax_id",
            message: "CPF inválido".to_owned(),
        });
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::SessionConfig;
    use crate::services::session::SessionService;
    use crate::storage::MemoryStore;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    fn form(email: &str, role: Role) -> NewUser {
        NewUser {
            name: "Ana Souza".to_owned(),
            email: email.to_owned(),
            password: secret("Senha123"),
            password_confirmation: secret("Senha123"),
            role,
            phone: None,
            tax_id: None,
        }
    }

    struct Fixture {
        service: UserService,
        auth: Arc<AuthService>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let credentials = Arc::new(CredentialService::default());
        let users = Arc::new(UserRepository::new(
            Arc::new(MemoryStore::new()),
            clock.clone(),
        ));
        let sessions = Arc::new(SessionService::new(
            Arc::new(MemoryStore::new()),
            clock.clone(),
            Arc::clone(&credentials),
            SessionConfig::default(),
        ));
        let auth = Arc::new(AuthService::new(
            Arc::clone(&users),
            sessions,
            Arc::clone(&credentials),
        ));
        Fixture {
            service: UserService::new(users, credentials, Arc::clone(&auth), clock),
            auth,
        }
    }

    fn login_as(f: &Fixture, email: &str, password: &str) {
        f.auth.login(email, &secret(password)).unwrap();
    }

    #[test]
    fn test_register_and_login() {
        let f = fixture();
        let user = f.service.register(form("ana@example.com", Role::Client)).unwrap();
        assert_eq!(user.role, Role::Client);

        assert!(f.auth.login("ana@example.com", &secret("Senha123")).is_ok());
    }

    #[test]
    fn test_register_collects_all_field_errors() {
        let f = fixture();
        let result = f.service.register(NewUser {
            name: "A".to_owned(),
            email: "not-an-email".to_owned(),
            password: secret("fraca"),
            password_confirmation: secret("outra"),
            role: Role::Client,
            phone: Some("123".to_owned()),
            tax_id: Some("111".to_owned()),
        });

        let Err(UserError::Validation(errors)) = result else {
            panic!("expected validation failure");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        for field in ["name", "email", "password", "password_confirmation", "phone", "tax_id"] {
            assert!(fields.contains(&field), "missing error for {field}");
        }
    }

    #[test]
    fn test_register_duplicate_email_case_insensitive() {
        let f = fixture();
        f.service.register(form("ana@example.com", Role::Client)).unwrap();

        let result = f.service.register(form("ANA@Example.com", Role::Client));
        assert!(matches!(result, Err(UserError::EmailTaken)));
    }

    #[test]
    fn test_register_normalizes_phone_and_tax_id() {
        let f = fixture();
        let user = f
            .service
            .register(NewUser {
                phone: Some("(11) 99999-9999".to_owned()),
                tax_id: Some("123.456.789-01".to_owned()),
                ..form("ana@example.com", Role::Client)
            })
            .unwrap();

        assert_eq!(user.phone.as_deref(), Some("11999999999"));
        assert_eq!(user.tax_id.as_deref(), Some("12345678901"));
    }

    #[test]
    fn test_tax_id_rejects_repeated_digits() {
        let f = fixture();
        let result = f.service.register(NewUser {
            tax_id: Some("111.111.111-11".to_owned()),
            ..form("ana@example.com", Role::Client)
        });
        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[test]
    fn test_accented_names_are_valid() {
        let f = fixture();
        let result = f.service.register(NewUser {
            name: "João Conceição".to_owned(),
            ..form("joao@example.com", Role::Client)
        });
        assert!(result.is_ok());
    }

    #[test]
    fn test_update_profile_requires_admin_or_self() {
        let f = fixture();
        let ana = f.service.register(form("ana@example.com", Role::Client)).unwrap();
        f.service.register(form("beto@example.com", Role::Client)).unwrap();

        // Signed out: denied.
        let denied = f.service.update_profile(&ana.id, ProfileUpdate::default());
        assert!(matches!(denied, Err(UserError::PermissionDenied)));

        // Self: allowed.
        login_as(&f, "ana@example.com", "Senha123");
        let updated = f
            .service
            .update_profile(
                &ana.id,
                ProfileUpdate {
                    name: Some("Ana de Souza".to_owned()),
                    ..ProfileUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Ana de Souza");

        // Another client's profile: denied.
        let beto_id = f
            .service
            .register(form("carla@example.com", Role::Client))
            .unwrap()
            .id;
        let denied = f.service.update_profile(&beto_id, ProfileUpdate::default());
        assert!(matches!(denied, Err(UserError::PermissionDenied)));
    }

    #[test]
    fn test_admin_operations() {
        let f = fixture();
        let admin = f.service.register(form("admin@example.com", Role::Admin)).unwrap();
        let client = f.service.register(form("ana@example.com", Role::Client)).unwrap();

        login_as(&f, "admin@example.com", "Senha123");

        let listed = f.service.list_users().unwrap();
        assert_eq!(listed.len(), 2);

        f.service.delete_user(&client.id).unwrap();
        assert!(matches!(
            f.service.find_user(&client.id),
            Err(UserError::NotFound)
        ));

        let result = f.service.delete_user(&admin.id);
        assert!(matches!(result, Err(UserError::CannotDeleteSelf)));
    }

    #[test]
    fn test_list_users_denied_for_non_admin() {
        let f = fixture();
        f.service.register(form("ana@example.com", Role::Seller)).unwrap();
        login_as(&f, "ana@example.com", "Senha123");

        assert!(matches!(
            f.service.list_users(),
            Err(UserError::PermissionDenied)
        ));
    }
}
