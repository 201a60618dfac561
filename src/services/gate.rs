//! Admin route guard.
//!
//! ARCHITECTURE
//! ============
//! `AuthGate` combines the admin directory and the session store into one of
//! three decisions. Order matters:
//!
//! 1. zero admins       -> `SetupNeeded` (bootstrap before login means anything)
//! 2. no session        -> `Unauthenticated`
//! 3. session + record  -> `AuthenticatedAdmin`
//!
//! Every failed read resolves to the more restrictive branch. A failed count
//! never becomes `SetupNeeded`, otherwise a flaky directory would reopen the
//! setup flow to anyone.
//!
//! TRADE-OFFS
//! ==========
//! Reads are single attempt. A retry would only delay a security decision
//! that already has a safe fallback.

use std::sync::Arc;

use tokio::sync::OnceCell;

use super::directory::{AdminDirectory, AdminLookup};
use super::session::SessionStore;

pub const SETUP_ROUTE: &str = "/admin/setup";
pub const LOGIN_ROUTE: &str = "/admin/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthDecision {
    SetupNeeded,
    Unauthenticated,
    AuthenticatedAdmin,
}

impl AuthDecision {
    /// Where a guarded page sends the visitor, or `None` to render it.
    #[must_use]
    pub fn redirect_target(self) -> Option<&'static str> {
        match self {
            Self::SetupNeeded => Some(SETUP_ROUTE),
            Self::Unauthenticated => Some(LOGIN_ROUTE),
            Self::AuthenticatedAdmin => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Verifying,
    Decided(AuthDecision),
}

/// What a guarded page shows for a given gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardView {
    /// Neutral placeholder: neither protected content nor a redirect.
    Loading,
    Redirect(&'static str),
    Render,
}

impl GateState {
    #[must_use]
    pub fn view(self) -> GuardView {
        match self {
            Self::Verifying => GuardView::Loading,
            Self::Decided(decision) => decision.redirect_target().map_or(GuardView::Render, GuardView::Redirect),
        }
    }
}

/// Guard for one evaluation scope (a page mount, or one request).
///
/// The first `evaluate` does the reads; later calls return the cached
/// decision until `recheck` is called.
pub struct AuthGate {
    sessions: Arc<dyn SessionStore>,
    directory: Arc<dyn AdminDirectory>,
    decision: OnceCell<AuthDecision>,
}

impl AuthGate {
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionStore>, directory: Arc<dyn AdminDirectory>) -> Self {
        Self { sessions, directory, decision: OnceCell::new() }
    }

    #[must_use]
    pub fn state(&self) -> GateState {
        self.decision
            .get()
            .copied()
            .map_or(GateState::Verifying, GateState::Decided)
    }

    pub async fn evaluate(&self) -> AuthDecision {
        *self
            .decision
            .get_or_init(|| decide(self.sessions.as_ref(), self.directory.as_ref()))
            .await
    }

    /// Drop the cached decision, e.g. after a login or logout.
    pub fn recheck(&mut self) {
        self.decision = OnceCell::new();
    }
}

/// One full, uncached decision.
pub async fn decide(sessions: &dyn SessionStore, directory: &dyn AdminDirectory) -> AuthDecision {
    match directory.count().await {
        Ok(0) => return AuthDecision::SetupNeeded,
        Ok(_) => {}
        Err(e) => {
            tracing::error!(error = %e, "admin count failed; denying access");
            return AuthDecision::Unauthenticated;
        }
    }

    verify_admin_session(sessions, directory).await
}

/// Session -> membership check, skipping the first-run count.
async fn verify_admin_session(sessions: &dyn SessionStore, directory: &dyn AdminDirectory) -> AuthDecision {
    let session = match sessions.current_session().await {
        Ok(Some(session)) => session,
        Ok(None) => return AuthDecision::Unauthenticated,
        Err(e) => {
            tracing::error!(error = %e, "session lookup failed; denying access");
            return AuthDecision::Unauthenticated;
        }
    };

    match directory.find_by_user_id(session.user_id).await {
        Ok(AdminLookup::Found(_)) => AuthDecision::AuthenticatedAdmin,
        Ok(AdminLookup::NotFound) => {
            tracing::warn!(user_id = %session.user_id, "session user is not an admin");
            AuthDecision::Unauthenticated
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = %session.user_id, "admin lookup failed; denying access");
            AuthDecision::Unauthenticated
        }
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
