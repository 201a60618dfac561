//! Admin session issuance and lookup.
//!
//! ARCHITECTURE
//! ============
//! The session store is the "hosted auth service" collaborator: it verifies
//! credentials, issues opaque session tokens and answers "is there a current
//! session, and whose is it". `PgSessionStore` is request scoped and holds the
//! token carried by the visitor's session cookie, the same way a browser SDK
//! holds its current session.
//!
//! TRADE-OFFS
//! ==========
//! Only a SHA-256 digest of each token is stored. A leaked `sessions` table
//! cannot be replayed, at the cost of hashing on every lookup.

use std::fmt::Write;
use std::sync::Mutex;

use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::password::{self, PasswordError};

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[must_use]
pub(crate) fn hash_token(token: &str) -> String {
    bytes_to_hex(&Sha256::digest(token.as_bytes()))
}

/// Lower-case and sanity check an e-mail style login identifier.
#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

/// An active session: the opaque token plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("session service unavailable: {0}")]
    Unavailable(#[from] SessionError),
}

impl From<sqlx::Error> for SignInError {
    fn from(e: sqlx::Error) -> Self {
        Self::Unavailable(SessionError::Db(e))
    }
}

/// Credential verification and session lifecycle.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Return the current session, or `None` if there is none or it expired.
    async fn current_session(&self) -> Result<Option<Session>, SessionError>;

    /// Verify credentials and make the new session current, revoking any
    /// session the store held before.
    async fn sign_in(&self, identifier: &str, secret: &str) -> Result<Session, SignInError>;

    /// Revoke the current session. A store with no session succeeds. The
    /// store forgets the session even when the remote revoke fails.
    async fn sign_out(&self) -> Result<(), SessionError>;
}

// =============================================================================
// POSTGRES STORE
// =============================================================================

/// Session store backed by the `users` and `sessions` tables.
pub struct PgSessionStore {
    pool: PgPool,
    ttl_hours: i32,
    token: Mutex<Option<String>>,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(pool: PgPool, ttl_hours: i32, token: Option<String>) -> Self {
        let token = token.filter(|t| !t.is_empty());
        Self { pool, ttl_hours, token: Mutex::new(token) }
    }

    /// The token currently held, if any. Used to refresh the session cookie.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }

    fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = token;
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for PgSessionStore {
    async fn current_session(&self) -> Result<Option<Session>, SessionError> {
        let Some(token) = self.token() else {
            return Ok(None);
        };

        let row = sqlx::query("SELECT user_id FROM sessions WHERE token_hash = $1 AND expires_at > now()")
            .bind(hash_token(&token))
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            // Expired or revoked: stop carrying it so the cookie is cleared.
            self.set_token(None);
            return Ok(None);
        };
        Ok(Some(Session { token, user_id: row.get("user_id") }))
    }

    async fn sign_in(&self, identifier: &str, secret: &str) -> Result<Session, SignInError> {
        let Some(email) = normalize_email(identifier) else {
            return Err(SignInError::InvalidCredentials);
        };
        if secret.is_empty() {
            return Err(SignInError::InvalidCredentials);
        }

        let row = sqlx::query("SELECT id, password_hash FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            password::burn_verification(secret.to_owned()).await;
            return Err(SignInError::InvalidCredentials);
        };

        let stored: String = row.get("password_hash");
        match password::verify_off_thread(secret.to_owned(), stored).await {
            Ok(()) => {}
            Err(PasswordError::Misconfigured) => {
                tracing::warn!(%email, "user has malformed password hash");
                return Err(SignInError::InvalidCredentials);
            }
            Err(PasswordError::Hash(e)) => {
                tracing::error!(error = %e, "password verification task failed");
                return Err(SignInError::InvalidCredentials);
            }
            Err(PasswordError::Wrong) => return Err(SignInError::InvalidCredentials),
        }

        // The session held so far is revoked in the same transaction that
        // issues the new one, and forgotten even if that transaction fails.
        let previous = self.token();
        self.set_token(None);

        let user_id: Uuid = row.get("id");
        let token = generate_token();
        let mut tx = self.pool.begin().await?;
        if let Some(previous) = previous {
            sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
                .bind(hash_token(&previous))
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query(
            "INSERT INTO sessions (token_hash, user_id, expires_at)
             VALUES ($1, $2, now() + make_interval(hours => $3))",
        )
        .bind(hash_token(&token))
        .bind(user_id)
        .bind(self.ttl_hours)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        self.set_token(Some(token.clone()));
        Ok(Session { token, user_id })
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        let Some(token) = self.token() else {
            return Ok(());
        };
        // Forgotten before the DELETE so a failed revoke never re-issues the cookie.
        self.set_token(None);

        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(hash_token(&token))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
