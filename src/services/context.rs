//! Admin session lifecycle for one visitor.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthContext` is the single owner of "is this visitor an authenticated
//! admin". It is built once per visitor scope and handed by reference to the
//! handlers that need it; there is no process-global flag.
//!
//! The flag is written in exactly three places: `login`, `logout` and
//! `reconcile`. It only becomes true right after a directory membership check
//! that found the user. The continuity hint mirrors the flag for the UI and
//! is never read back as a trust signal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::directory::{AdminDirectory, AdminLookup};
use super::gate::{self, AuthDecision};
use super::hints::{ADMIN_AUTHENTICATED_KEY, ContinuityStore};
use super::session::{SessionStore, SignInError};

/// Public route a visitor lands on after logging out.
pub const HOME_ROUTE: &str = "/";

const HINT_VALUE: &str = "true";

/// Why a login did not produce an admin session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginFailure {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("access denied")]
    AccessDenied,
    #[error("auth service unavailable")]
    Unavailable,
}

impl LoginFailure {
    /// Visitor-facing wording. Never includes service error detail.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Invalid email or password.",
            Self::AccessDenied => "Access denied. This account is not an administrator.",
            Self::Unavailable => "Sign-in is temporarily unavailable. Please try again.",
        }
    }
}

pub struct AuthContext {
    sessions: Arc<dyn SessionStore>,
    directory: Arc<dyn AdminDirectory>,
    hints: Arc<dyn ContinuityStore>,
    authenticated: AtomicBool,
}

impl AuthContext {
    /// Starts unauthenticated; call [`AuthContext::reconcile`] on mount.
    #[must_use]
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        directory: Arc<dyn AdminDirectory>,
        hints: Arc<dyn ContinuityStore>,
    ) -> Self {
        Self { sessions, directory, hints, authenticated: AtomicBool::new(false) }
    }

    /// The authoritative flag for this visitor.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Whether the last visit ended signed in. UI latency only; never gates access.
    #[must_use]
    pub fn probably_authenticated(&self) -> bool {
        self.hints.get(ADMIN_AUTHENTICATED_KEY).as_deref() == Some(HINT_VALUE)
    }

    /// Verify credentials, then require a directory record for the user.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` leaves all state untouched. `AccessDenied` and
    /// `Unavailable` leave the visitor signed out; after a successful sign-in
    /// they revoke the new session first.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<(), LoginFailure> {
        let session = match self.sessions.sign_in(identifier, secret).await {
            Ok(session) => session,
            Err(SignInError::InvalidCredentials) => return Err(LoginFailure::InvalidCredentials),
            Err(SignInError::Unavailable(e)) => {
                tracing::error!(error = %e, "sign-in failed");
                self.set_authenticated(false);
                return Err(LoginFailure::Unavailable);
            }
        };

        let failure = match self.directory.find_by_user_id(session.user_id).await {
            Ok(AdminLookup::Found(_)) => {
                self.set_authenticated(true);
                tracing::info!(user_id = %session.user_id, "admin signed in");
                return Ok(());
            }
            Ok(AdminLookup::NotFound) => {
                tracing::warn!(user_id = %session.user_id, "non-admin sign-in rejected");
                LoginFailure::AccessDenied
            }
            Err(e) => {
                tracing::error!(error = %e, user_id = %session.user_id, "admin lookup after sign-in failed");
                LoginFailure::Unavailable
            }
        };

        if let Err(e) = self.sessions.sign_out().await {
            tracing::error!(error = %e, user_id = %session.user_id, "failed to revoke non-admin session");
        }
        self.set_authenticated(false);
        Err(failure)
    }

    /// Sign out remotely and always clear local state.
    ///
    /// Returns the route to send the visitor to.
    pub async fn logout(&self) -> &'static str {
        if let Err(e) = self.sessions.sign_out().await {
            tracing::error!(error = %e, "sign-out failed; clearing local state anyway");
        }
        self.set_authenticated(false);
        HOME_ROUTE
    }

    /// Mount-time check: recompute from the services and overwrite the flag and hint.
    pub async fn reconcile(&self) -> AuthDecision {
        let decision = gate::decide(self.sessions.as_ref(), self.directory.as_ref()).await;
        self.set_authenticated(decision == AuthDecision::AuthenticatedAdmin);
        decision
    }

    fn set_authenticated(&self, value: bool) {
        self.authenticated.store(value, Ordering::SeqCst);
        if value {
            self.hints.set(ADMIN_AUTHENTICATED_KEY, HINT_VALUE);
        } else {
            self.hints.remove(ADMIN_AUTHENTICATED_KEY);
        }
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
