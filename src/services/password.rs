//! Argon2 password hashing for admin sign-in.

use std::sync::LazyLock;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash verified against when the login identifier is unknown, so a miss
/// costs the same argon2 work as a wrong password.
static DECOY_HASH: LazyLock<Option<String>> = LazyLock::new(|| hash_password("decoy-password").ok());

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password does not match")]
    Wrong,
    #[error("stored password hash is malformed")]
    Misconfigured,
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hash a raw password into a PHC string suitable for the `users` table.
///
/// # Errors
///
/// Returns an error if argon2 rejects the input.
pub fn hash_password(raw: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verify a raw password against a stored PHC string.
///
/// # Errors
///
/// `Wrong` on mismatch, `Misconfigured` if the stored value is not a hash.
pub fn verify_password(raw: &str, stored: &str) -> Result<(), PasswordError> {
    let hash = PasswordHash::new(stored).map_err(|_| PasswordError::Misconfigured)?;
    Argon2::default()
        .verify_password(raw.as_bytes(), &hash)
        .map_err(|_| PasswordError::Wrong)
}

/// [`hash_password`] on the blocking pool.
///
/// # Errors
///
/// As `hash_password`, or `Hash` if the blocking task panicked.
pub async fn hash_off_thread(raw: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&raw))
        .await
        .map_err(|e| PasswordError::Hash(e.to_string()))?
}

/// [`verify_password`] on the blocking pool.
///
/// # Errors
///
/// As `verify_password`, or `Hash` if the blocking task panicked.
pub async fn verify_off_thread(raw: String, stored: String) -> Result<(), PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&raw, &stored))
        .await
        .map_err(|e| PasswordError::Hash(e.to_string()))?
}

/// Spend one verification on the decoy hash. The outcome is discarded.
pub async fn burn_verification(raw: String) {
    if let Some(decoy) = DECOY_HASH.as_ref() {
        let _ = verify_off_thread(raw, decoy.clone()).await;
    }
}

#[must_use]
pub fn is_acceptable(raw: &str) -> bool {
    raw.chars().count() >= MIN_PASSWORD_LEN
}

#[cfg(test)]
#[path = "password_test.rs"]
mod tests;
