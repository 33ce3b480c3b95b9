//! Password hashing, verification, and token generation.
//!
//! Hashing is SHA-256 over `password || salt`, base64-encoded. This is
//! deliberately lightweight for a demo store; it is not a substitute
//! for a memory-hard KDF and the doc on [`CredentialService`] says so.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::TryRngCore;
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

/// Bytes of entropy in a generated salt.
const SALT_BYTES: usize = 16;
/// Bytes of entropy in a generated session token.
const TOKEN_BYTES: usize = 32;

/// Errors from credential operations.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The password failed policy validation.
    #[error("password does not meet policy: {}", rules.join("; "))]
    WeakPassword {
        /// Human-readable rule violations, in policy order.
        rules: Vec<String>,
    },

    /// The OS randomness source failed.
    #[error("system randomness unavailable: {0}")]
    CryptoUnavailable(String),
}

/// A salted password digest, as stored on a user record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasswordHash {
    /// Base64-encoded SHA-256 digest of `password || salt`.
    pub digest: String,
    /// Base64-encoded random salt.
    pub salt: String,
}

/// Password strength policy.
///
/// `validate` returns every violated rule (not just the first) so the
/// host UI can show the full checklist, plus a 0..=100 strength score.
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_digit: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_lowercase: true,
            require_uppercase: true,
            require_digit: true,
        }
    }
}

/// Outcome of a policy check.
#[derive(Debug, Clone)]
pub struct PasswordReport {
    /// Violated rules, empty when the password passes.
    pub violations: Vec<String>,
    /// Heuristic strength score, 0..=100.
    pub score: u8,
}

impl PasswordReport {
    /// Whether the password satisfies the policy.
    #[must_use]
    pub fn is_acceptable(&self) -> bool {
        self.violations.is_empty()
    }
}

impl PasswordPolicy {
    /// Check `password` against the policy.
    #[must_use]
    pub fn validate(&self, password: &SecretString) -> PasswordReport {
        let raw = password.expose_secret();
        let mut violations = Vec::new();

        if raw.chars().count() < self.min_length {
            violations.push(format!(
                "deve ter pelo menos {} caracteres",
                self.min_length
            ));
        }
        if self.require_lowercase && !raw.chars().any(|c| c.is_ascii_lowercase()) {
            violations.push("deve conter uma letra minúscula".to_owned());
        }
        if self.require_uppercase && !raw.chars().any(|c| c.is_ascii_uppercase()) {
            violations.push("deve conter uma letra maiúscula".to_owned());
        }
        if self.require_digit && !raw.chars().any(|c| c.is_ascii_digit()) {
            violations.push("deve conter um número".to_owned());
        }

        PasswordReport {
            violations,
            score: score(raw),
        }
    }
}

/// Heuristic strength score: length tiers plus character-class variety,
/// capped at 100.
fn score(raw: &str) -> u8 {
    let mut score = 0u8;
    let length = raw.chars().count();

    if length >= 8 {
        score += 20;
    }
    if length >= 12 {
        score += 10;
    }
    if length >= 16 {
        score += 10;
    }
    if raw.chars().any(|c| c.is_ascii_lowercase()) {
        score += 10;
    }
    if raw.chars().any(|c| c.is_ascii_uppercase()) {
        score += 10;
    }
    if raw.chars().any(|c| c.is_ascii_digit()) {
        score += 10;
    }
    if raw.chars().any(|c| !c.is_ascii_alphanumeric()) {
        score += 20;
    }

    let unique: std::collections::HashSet<char> = raw.chars().collect();
    if unique.len() >= 8 {
        score += 10;
    }

    score.min(100)
}

/// Hashing, verification, and random identifier generation.
pub struct CredentialService {
    policy: PasswordPolicy,
}

impl Default for CredentialService {
    fn default() -> Self {
        Self::new(PasswordPolicy::default())
    }
}

impl CredentialService {
    /// Create a service with the given policy.
    #[must_use]
    pub const fn new(policy: PasswordPolicy) -> Self {
        Self { policy }
    }

    /// The active password policy.
    #[must_use]
    pub const fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Validate `password` against the policy and hash it under a fresh
    /// salt.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::WeakPassword`] listing every violated
    /// rule, or [`CredentialError::CryptoUnavailable`] if the OS
    /// randomness source fails.
    pub fn create_password_hash(
        &self,
        password: &SecretString,
    ) -> Result<PasswordHash, CredentialError> {
        let report = self.policy.validate(password);
        if !report.is_acceptable() {
            return Err(CredentialError::WeakPassword {
                rules: report.violations,
            });
        }

        let salt = self.generate_salt()?;
        let digest = Self::hash_password(password, &salt);
        Ok(PasswordHash { digest, salt })
    }

    /// SHA-256 of `password || salt`, base64-encoded.
    #[must_use]
    pub fn hash_password(password: &SecretString, salt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.expose_secret().as_bytes());
        hasher.update(salt.as_bytes());
        BASE64.encode(hasher.finalize())
    }

    /// Whether `password` under `salt` produces `expected_digest`.
    ///
    /// The digest comparison runs in constant time.
    #[must_use]
    pub fn verify_password(
        password: &SecretString,
        salt: &str,
        expected_digest: &str,
    ) -> bool {
        let computed = Self::hash_password(password, salt);
        constant_time_eq(computed.as_bytes(), expected_digest.as_bytes())
    }

    /// A fresh base64-encoded salt.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::CryptoUnavailable`] if the OS
    /// randomness source fails.
    pub fn generate_salt(&self) -> Result<String, CredentialError> {
        random_base64(SALT_BYTES)
    }

    /// A fresh opaque session token.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::CryptoUnavailable`] if the OS
    /// randomness source fails.
    pub fn generate_token(&self) -> Result<String, CredentialError> {
        random_base64(TOKEN_BYTES)
    }

    /// A fresh user identifier.
    #[must_use]
    pub fn generate_user_id(&self) -> String {
        format!("user_{}", Uuid::new_v4())
    }
}

fn random_base64(len: usize) -> Result<String, CredentialError> {
    let mut bytes = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CredentialError::CryptoUnavailable(e.to_string()))?;
    Ok(BASE64.encode(bytes))
}

/// Byte equality without early exit. A length mismatch returns false
/// immediately; lengths are not secret here (digests are fixed-size).
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[test]
    fn test_hash_is_deterministic_per_salt() {
        let password = secret("Senha123");
        let a = CredentialService::hash_password(&password, "salt-a");
        let b = CredentialService::hash_password(&password, "salt-a");
        let c = CredentialService::hash_password(&password, "salt-b");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_verify_round_trip() {
        let service = CredentialService::default();
        let password = secret("Senha123");
        let hash = service.create_password_hash(&password).unwrap();

        assert!(CredentialService::verify_password(
            &password,
            &hash.salt,
            &hash.digest
        ));
        assert!(!CredentialService::verify_password(
            &secret("senha123"),
            &hash.salt,
            &hash.digest
        ));
    }

    #[test]
    fn test_policy_reports_all_violations() {
        let policy = PasswordPolicy::default();
        let report = policy.validate(&secret("abc"));
        assert!(!report.is_acceptable());
        // Too short, no uppercase, no digit.
        assert_eq!(report.violations.len(), 3);
    }

    #[test]
    fn test_weak_password_rejected_at_hashing() {
        let service = CredentialService::default();
        let result = service.create_password_hash(&secret("fraca"));
        assert!(matches!(
            result,
            Err(CredentialError::WeakPassword { .. })
        ));
    }

    #[test]
    fn test_score_tiers() {
        assert!(score("abc") < 50);
        assert!(score("Senha123") >= 50);
        assert_eq!(score("Senha-Muito-Longa-123!"), 100);
    }

    #[test]
    fn test_salts_are_unique() {
        let service = CredentialService::default();
        let a = service.generate_salt().unwrap();
        let b = service.generate_salt().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }

    #[test]
    fn test_user_ids_have_prefix() {
        let service = CredentialService::default();
        let id = service.generate_user_id();
        assert!(id.starts_with("user_"));
    }
}
