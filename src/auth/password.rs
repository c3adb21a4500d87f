//! Password hashing and verification.
//!
//! Argon2id with a random per-hash salt, stored as a PHC string.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Password hashing error.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    HashingFailed(String),
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),
}

/// Hashes new passwords and checks presented ones against stored hashes.
#[derive(Debug, Clone, Default)]
pub struct CredentialVerifier {
    params: Params,
}

impl CredentialVerifier {
    /// Build a verifier with explicit Argon2 cost parameters.
    ///
    /// * `memory_kib` - memory cost in KiB
    /// * `iterations` - time cost
    /// * `parallelism` - lanes
    pub fn with_cost(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password. Output differs on every call (fresh salt).
    ///
    /// ```rust,ignore
    /// let hash = verifier.hash_password("my_secure_password")?;
    /// // "$argon2id$v=19$m=19456,t=2,p=1$..."
    /// ```
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// The cost parameters embedded in `hash` are used, not the verifier's
    /// own. An unparseable hash is reported as a mismatch.
    pub fn verify_password(&self, hash: &str, password: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// [`hash_password`](Self::hash_password) on the blocking pool.
    pub async fn hash_password_blocking(&self, password: String) -> Result<String, PasswordError> {
        let verifier = self.clone();
        tokio::task::spawn_blocking(move || verifier.hash_password(&password))
            .await
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
    }

    /// [`verify_password`](Self::verify_password) on the blocking pool.
    ///
    /// A panicked or cancelled worker counts as a mismatch.
    pub async fn verify_password_blocking(&self, hash: String, password: String) -> bool {
        let verifier = self.clone();
        tokio::task::spawn_blocking(move || verifier.verify_password(&hash, &password))
            .await
            .unwrap_or(false)
    }
}
