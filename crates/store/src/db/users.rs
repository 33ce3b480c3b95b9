//! User repository.

use std::sync::Arc;

use vitrine_core::{Email, UserId};

use super::RepositoryError;
use crate::clock::Clock;
use crate::models::user::{User, UserPatch};
use crate::storage::{KeyValueStore, KeyValueStoreExt};

/// Storage key for the user collection.
const USERS_KEY: &str = "users";

/// Repository for user records in the durable store.
///
/// The collection is small and has a single writer, so every operation
/// loads the full array, mutates in memory, and persists it back. A
/// failed persist leaves the stored collection at its previous value.
pub struct UserRepository {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn load(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.store.get_or(USERS_KEY, Vec::new)?)
    }

    fn persist(&self, users: &[User]) -> Result<(), RepositoryError> {
        Ok(self.store.set(USERS_KEY, &users)?)
    }

    /// All users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the store fails.
    pub fn all(&self) -> Result<Vec<User>, RepositoryError> {
        self.load()
    }

    /// Add a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if another user already holds
    /// the email (emails are case-insensitive), or a storage error if
    /// the persist fails — in which case nothing was written.
    pub fn add(&self, user: User) -> Result<(), RepositoryError> {
        let mut users = self.load()?;
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        tracing::debug!(user_id = %user.id, role = %user.role, "adding user");
        users.push(user);
        self.persist(&users)
    }

    /// Apply `patch` to the user with `id`, stamping `updated_at`.
    ///
    /// Returns the updated record, or `None` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the patch changes the
    /// email to one already in use, or a storage error if the persist
    /// fails.
    pub fn update(&self, id: &UserId, patch: UserPatch) -> Result<Option<User>, RepositoryError> {
        let mut users = self.load()?;

        if let Some(new_email) = &patch.email
            && users.iter().any(|u| &u.email == new_email && &u.id != id)
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let Some(user) = users.iter_mut().find(|u| &u.id == id) else {
            return Ok(None);
        };

        patch.apply(user);
        user.updated_at = self.clock.now();
        let updated = user.clone();

        self.persist(&users)?;
        Ok(Some(updated))
    }

    /// Remove the user with `id`. Returns whether a record was removed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the persist fails.
    pub fn remove(&self, id: &UserId) -> Result<bool, RepositoryError> {
        let mut users = self.load()?;
        let before = users.len();
        users.retain(|u| &u.id != id);

        if users.len() == before {
            return Ok(false);
        }
        self.persist(&users)?;
        Ok(true)
    }

    /// Look up a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the store fails.
    pub fn by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.load()?.into_iter().find(|u| &u.id == id))
    }

    /// Look up a user by email (case-insensitive via [`Email`]
    /// normalization).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the store fails.
    pub fn by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self.load()?.into_iter().find(|u| &u.email == email))
    }

    /// Whether any user holds `email`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the store fails.
    pub fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        Ok(self.by_email(email)?.is_some())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use vitrine_core::Role;

    use super::*;
    use crate::clock::SystemClock;
    use crate::storage::MemoryStore;

    fn repo() -> UserRepository {
        UserRepository::new(Arc::new(MemoryStore::new()), Arc::new(SystemClock))
    }

    fn user(id: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(id),
            name: "Ana Souza".to_owned(),
            email: Email::parse(email).unwrap(),
            password_digest: "d".to_owned(),
            salt: "s".to_owned(),
            role: Role::Client,
            phone: None,
            tax_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_add_and_lookup() {
        let repo = repo();
        repo.add(user("u1", "ana@example.com")).unwrap();

        let found = repo.by_id(&UserId::new("u1")).unwrap().unwrap();
        assert_eq!(found.email.as_str(), "ana@example.com");
        assert!(repo.by_id(&UserId::new("u2")).unwrap().is_none());
    }

    #[test]
    fn test_email_uniqueness_is_case_insensitive() {
        let repo = repo();
        repo.add(user("u1", "x@y.com")).unwrap();

        let result = repo.add(user("u2", "X@Y.com"));
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));

        let probe = Email::parse("X@Y.COM").unwrap();
        assert!(repo.email_exists(&probe).unwrap());
    }

    #[test]
    fn test_update_stamps_updated_at() {
        let repo = repo();
        let original = user("u1", "ana@example.com");
        let created_at = original.created_at;
        repo.add(original).unwrap();

        let updated = repo
            .update(
                &UserId::new("u1"),
                UserPatch {
                    name: Some("Ana S.".to_owned()),
                    ..UserPatch::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Ana S.");
        assert!(updated.updated_at >= created_at);
    }

    #[test]
    fn test_update_unknown_id_is_none() {
        let repo = repo();
        let result = repo
            .update(&UserId::new("missing"), UserPatch::default())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_update_cannot_steal_email() {
        let repo = repo();
        repo.add(user("u1", "a@x.com")).unwrap();
        repo.add(user("u2", "b@x.com")).unwrap();

        let result = repo.update(
            &UserId::new("u2"),
            UserPatch {
                email: Some(Email::parse("A@X.com").unwrap()),
                ..UserPatch::default()
            },
        );
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[test]
    fn test_remove() {
        let repo = repo();
        repo.add(user("u1", "a@x.com")).unwrap();

        assert!(repo.remove(&UserId::new("u1")).unwrap());
        assert!(!repo.remove(&UserId::new("u1")).unwrap());
        assert!(repo.all().unwrap().is_empty());
    }
}
