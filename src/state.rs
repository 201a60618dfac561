//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds only process-wide, read-mostly resources: the pool and the config.
//! Per-visitor auth state (`AuthContext`, `AuthGate`) is built per request
//! from these and never stored here.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;

/// Clone is required by Axum; all fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self { pool, config: Arc::new(config) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
