//! First-run bootstrap of the initial admin.
//!
//! DESIGN
//! ======
//! The gate sends every visitor to setup while the directory is empty. This
//! service creates the first user and its super-admin record in a single
//! transaction that holds an exclusive lock on `admins`, so two concurrent
//! setup submissions cannot both succeed.

use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::directory::{AdminDirectory, AdminRecord};
use super::password;
use super::session::normalize_email;

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("setup already completed")]
    AlreadyConfigured,
    #[error("invalid email")]
    InvalidEmail,
    #[error("password must be at least {} characters", password::MIN_PASSWORD_LEN)]
    WeakPassword,
    #[error("password hashing failed: {0}")]
    Password(#[from] password::PasswordError),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Validated setup form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdmin {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl NewAdmin {
    /// Normalize and validate raw form input. An empty name falls back to the
    /// local part of the e-mail address.
    ///
    /// # Errors
    ///
    /// `InvalidEmail` or `WeakPassword`.
    pub fn parse(email: &str, name: &str, password: &str) -> Result<Self, SetupError> {
        let email = normalize_email(email).ok_or(SetupError::InvalidEmail)?;
        if !password::is_acceptable(password) {
            return Err(SetupError::WeakPassword);
        }
        let name = match name.trim() {
            "" => email.split('@').next().unwrap_or_default().to_owned(),
            trimmed => trimmed.to_owned(),
        };
        Ok(Self { email, name, password: password.to_owned() })
    }
}

/// Whether the setup page should be offered. A failed count reports `false`.
pub async fn setup_needed(directory: &dyn AdminDirectory) -> bool {
    match directory.count().await {
        Ok(n) => n == 0,
        Err(e) => {
            tracing::error!(error = %e, "admin count failed; hiding setup");
            false
        }
    }
}

/// Create the first admin. Does not sign them in.
///
/// # Errors
///
/// `AlreadyConfigured` if any admin exists when the lock is taken.
pub async fn create_first_admin(pool: &PgPool, admin: &NewAdmin) -> Result<AdminRecord, SetupError> {
    let password_hash = password::hash_off_thread(admin.password.clone()).await?;

    let mut tx = pool.begin().await?;
    sqlx::query("LOCK TABLE admins IN EXCLUSIVE MODE")
        .execute(&mut *tx)
        .await?;

    let existing: i64 = sqlx::query("SELECT COUNT(*) AS n FROM admins")
        .fetch_one(&mut *tx)
        .await?
        .get("n");
    if existing > 0 {
        return Err(SetupError::AlreadyConfigured);
    }

    let user_id: Uuid = sqlx::query(
        r"INSERT INTO users (email, name, password_hash)
          VALUES ($1, $2, $3)
          ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name, password_hash = EXCLUDED.password_hash
          RETURNING id",
    )
    .bind(&admin.email)
    .bind(&admin.name)
    .bind(&password_hash)
    .fetch_one(&mut *tx)
    .await?
    .get("id");

    sqlx::query("INSERT INTO admins (user_id, is_super_admin) VALUES ($1, true)")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!(%user_id, email = %admin.email, "first admin created");

    Ok(AdminRecord { user_id, is_super_admin: true })
}

#[cfg(test)]
#[path = "setup_test.rs"]
mod tests;
