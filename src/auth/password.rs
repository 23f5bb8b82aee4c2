//! One-way password hashing.
//!
//! Passwords are hashed with Argon2id into PHC strings (salt and parameters
//! embedded), so verification needs nothing but the stored string. Both
//! operations are CPU-bound and run on the blocking pool.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tokio::task;

use crate::error::AppError;

/// Salted, slow, one-way hasher with a configurable work factor.
#[derive(Debug, Clone)]
pub struct SecretHasher {
    params: Params,
}

impl Default for SecretHasher {
    fn default() -> Self {
        Self {
            params: Params::DEFAULT,
        }
    }
}

impl SecretHasher {
    /// Build a hasher with explicit Argon2 cost parameters.
    pub fn with_params(
        memory_cost_kib: u32,
        time_cost: u32,
        parallelism: u32,
    ) -> Result<Self, AppError> {
        let params = Params::new(memory_cost_kib, time_cost, parallelism, None)
            .map_err(|e| AppError::Internal(format!("invalid Argon2 params: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash `plaintext` with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Fails if the hashing routine itself fails; callers must abort.
    pub fn hash_blocking(&self, plaintext: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))?;
        Ok(hash.to_string())
    }

    /// Check `plaintext` against a stored PHC string using the algorithm's
    /// own constant-time verification. A malformed stored hash never matches.
    pub fn verify_blocking(&self, hash: &str, plaintext: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is malformed");
                return false;
            }
        };
        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    pub async fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        let hasher = self.clone();
        let plaintext = plaintext.to_string();
        task::spawn_blocking(move || hasher.hash_blocking(&plaintext))
            .await
            .map_err(|e| AppError::Internal(format!("password hashing task failed: {e}")))?
    }

    pub async fn verify(&self, hash: &str, plaintext: &str) -> Result<bool, AppError> {
        let hasher = self.clone();
        let hash = hash.to_string();
        let plaintext = plaintext.to_string();
        task::spawn_blocking(move || hasher.verify_blocking(&hash, &plaintext))
            .await
            .map_err(|e| AppError::Internal(format!("password verification task failed: {e}")))
    }
}

#[cfg(test)]
impl SecretHasher {
    /// Minimum-cost parameters so tests do not spend seconds hashing.
    pub fn fast_for_tests() -> Self {
        Self::with_params(8, 1, 1).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = SecretHasher::fast_for_tests();
        let hash = hasher.hash_blocking("hunter22").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, "hunter22");
        assert!(hasher.verify_blocking(&hash, "hunter22"));
        assert!(!hasher.verify_blocking(&hash, "hunter23"));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = SecretHasher::fast_for_tests();
        let a = hasher.hash_blocking("same-password").unwrap();
        let b = hasher.hash_blocking("same-password").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify_blocking(&a, "same-password"));
        assert!(hasher.verify_blocking(&b, "same-password"));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let hasher = SecretHasher::fast_for_tests();
        assert!(!hasher.verify_blocking("not-a-phc-string", "anything"));
        assert!(!hasher.verify_blocking("", ""));
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert!(SecretHasher::with_params(0, 0, 0).is_err());
    }

    #[tokio::test]
    async fn test_async_wrappers() {
        let hasher = SecretHasher::fast_for_tests();
        let hash = hasher.hash("correct horse").await.unwrap();
        assert!(hasher.verify(&hash, "correct horse").await.unwrap());
        assert!(!hasher.verify(&hash, "battery staple").await.unwrap());
    }
}
