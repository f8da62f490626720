//! Password value object - one-way credential hashing.
//!
//! Digests are Argon2id PHC strings. The salt and cost parameters are embedded
//! in the digest, so verification needs nothing but the stored string.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::constants::MIN_PASSWORD_LENGTH;
use crate::error::{DomainError, DomainResult};

/// Hashed password. The plaintext never lives inside this type.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Validate the plaintext against the password policy, then hash it.
    ///
    /// # Errors
    /// Returns a validation error if the password is shorter than
    /// [`MIN_PASSWORD_LENGTH`], or a hashing error if the hasher fails.
    pub fn new(plain_text: &str) -> DomainResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        Self::hash(plain_text)
    }

    /// Hash a plaintext with a fresh random salt.
    ///
    /// Two calls with the same input produce different digests.
    pub fn hash(plain_text: &str) -> DomainResult<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| DomainError::hashing(format!("Password hash failed: {}", e)))?;

        Ok(Self {
            hash: hash.to_string(),
        })
    }

    /// Wrap an existing digest loaded from storage.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    /// Get the digest for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the digest.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plaintext against this digest.
    ///
    /// A mismatch is `Ok(false)`. Only a digest that cannot be parsed is an error.
    pub fn verify(&self, plain_text: &str) -> DomainResult<bool> {
        let parsed = PasswordHash::new(&self.hash)
            .map_err(|e| DomainError::hashing(format!("Invalid hash format: {}", e)))?;

        Ok(Self::argon2()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok())
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}
