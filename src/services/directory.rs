//! Admin directory — which users are authorized admins.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `admins` row per authorized admin, keyed by user id. The gate and the
//! auth context only ever ask two questions of it: how many admins exist, and
//! whether a given user id has a record.

use sqlx::{PgPool, Row};
use uuid::Uuid;

/// An authorized admin.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AdminRecord {
    pub user_id: Uuid,
    pub is_super_admin: bool,
}

/// Result of a directory lookup that reached the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminLookup {
    Found(AdminRecord),
    NotFound,
}

impl AdminLookup {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[async_trait::async_trait]
pub trait AdminDirectory: Send + Sync {
    /// Total number of admin records.
    async fn count(&self) -> Result<i64, DirectoryError>;

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<AdminLookup, DirectoryError>;
}

/// Directory backed by the `admins` table.
#[derive(Clone)]
pub struct PgAdminDirectory {
    pool: PgPool,
}

impl PgAdminDirectory {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AdminDirectory for PgAdminDirectory {
    async fn count(&self) -> Result<i64, DirectoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM admins")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<AdminLookup, DirectoryError> {
        let row = sqlx::query("SELECT user_id, is_super_admin FROM admins WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match row {
            Some(r) => AdminLookup::Found(AdminRecord { user_id: r.get("user_id"), is_super_admin: r.get("is_super_admin") }),
            None => AdminLookup::NotFound,
        })
    }
}

#[cfg(test)]
#[path = "directory_test.rs"]
mod tests;
