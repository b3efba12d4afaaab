//! Password value object and password policy.
//!
//! Hashing uses Argon2 with its default parameters; the policy mirrors the
//! identity options configured by the host.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};

use crate::constants::{MIN_PASSWORD_LENGTH, MIN_PASSWORD_UNIQUE_CHARS};
use crate::error::{DomainError, DomainResult};
use crate::results::IdentityError;

/// Hashed password. Never exposes the hash in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash a plain text password. Policy checks happen in
    /// [`PasswordPolicy::validate`] before this is called.
    pub fn new(plain_text: &str) -> DomainResult<Self> {
        if plain_text.is_empty() {
            return Err(DomainError::password("Password is required"));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| DomainError::internal(format!("Password hash failed: {}", e)))?
            .to_string();

        Ok(Self { hash })
    }

    /// Wrap a stored hash.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify plain text against this hash. A malformed hash never verifies.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// Password strength requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    pub required_length: usize,
    pub required_unique_chars: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            required_length: MIN_PASSWORD_LENGTH,
            required_unique_chars: MIN_PASSWORD_UNIQUE_CHARS,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}

impl PasswordPolicy {
    /// Every rule the password breaks, in a stable order. Empty when valid.
    pub fn validate(&self, password: &str) -> Vec<IdentityError> {
        let mut errors = Vec::new();

        if password.chars().count() < self.required_length {
            errors.push(IdentityError::new(
                "PasswordTooShort",
                format!(
                    "Passwords must be at least {} characters.",
                    self.required_length
                ),
            ));
        }
        if self.require_non_alphanumeric
            && password.chars().all(|c| c.is_ascii_alphanumeric())
        {
            errors.push(IdentityError::new(
                "PasswordRequiresNonAlphanumeric",
                "Passwords must have at least one non alphanumeric character.",
            ));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(IdentityError::new(
                "PasswordRequiresDigit",
                "Passwords must have at least one digit ('0'-'9').",
            ));
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push(IdentityError::new(
                "PasswordRequiresLower",
                "Passwords must have at least one lowercase ('a'-'z').",
            ));
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push(IdentityError::new(
                "PasswordRequiresUpper",
                "Passwords must have at least one uppercase ('A'-'Z').",
            ));
        }
        if self.required_unique_chars >= 1 {
            let mut seen: Vec<char> = password.chars().collect();
            seen.sort_unstable();
            seen.dedup();
            if seen.len() < self.required_unique_chars {
                errors.push(IdentityError::new(
                    "PasswordRequiresUniqueChars",
                    format!(
                        "Passwords must use at least {} different characters.",
                        self.required_unique_chars
                    ),
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(errors: &[IdentityError]) -> Vec<&str> {
        errors.iter().map(|e| e.code.as_str()).collect()
    }

    #[test]
    fn test_password_hash_and_verify() {
        let password = Password::new("V0lunteer$").unwrap();
        assert!(password.verify("V0lunteer$"));
        assert!(!password.verify("v0lunteer$"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = Password::new("SamePassword1!").unwrap();
        let b = Password::new("SamePassword1!").unwrap();
        assert_ne!(a.as_str(), b.as_str());
        assert!(Password::from_hash(a.into_string()).verify("SamePassword1!"));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!Password::from_hash("not-a-hash").verify("anything"));
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(Password::new("").is_err());
    }

    #[test]
    fn test_debug_redacts_hash() {
        let password = Password::new("V0lunteer$").unwrap();
        assert!(format!("{:?}", password).contains("[REDACTED]"));
    }

    #[test]
    fn test_default_policy_accepts_seed_password() {
        assert!(PasswordPolicy::default().validate("V0lunteer$").is_empty());
    }

    #[test]
    fn test_default_policy_reports_every_rule() {
        let errors = PasswordPolicy::default().validate("abc");
        assert_eq!(
            codes(&errors),
            vec![
                "PasswordTooShort",
                "PasswordRequiresNonAlphanumeric",
                "PasswordRequiresDigit",
                "PasswordRequiresUpper",
            ]
        );
    }

    #[test]
    fn test_unique_chars_rule() {
        let policy = PasswordPolicy {
            required_length: 1,
            required_unique_chars: 3,
            require_digit: false,
            require_lowercase: false,
            require_uppercase: false,
            require_non_alphanumeric: false,
        };
        assert_eq!(codes(&policy.validate("aaaa")), vec!["PasswordRequiresUniqueChars"]);
        assert!(policy.validate("abc").is_empty());
    }

    #[test]
    fn test_character_classes_are_ascii_only() {
        let errors = PasswordPolicy::default().validate("ÄÖÜ12345ä");
        assert_eq!(
            codes(&errors),
            vec!["PasswordRequiresLower", "PasswordRequiresUpper"]
        );
    }
}
