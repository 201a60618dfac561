//! Admin auth routes — guard extractor, login, logout, status.

use std::sync::Arc;

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use super::cookies;
use crate::services::context::{AuthContext, LoginFailure};
use crate::services::directory::{AdminDirectory, AdminLookup, PgAdminDirectory};
use crate::services::gate::{AuthDecision, AuthGate, GuardView, LOGIN_ROUTE};
use crate::services::hints::MemoryHints;
use crate::services::session::{PgSessionStore, SessionStore};
use crate::state::AppState;

// =============================================================================
// VISITOR SCOPE
// =============================================================================

/// Per-request collaborators for one visitor, built from their cookies.
struct Visitor {
    sessions: Arc<PgSessionStore>,
    directory: Arc<PgAdminDirectory>,
    hints: Arc<MemoryHints>,
}

impl Visitor {
    fn from_jar(state: &AppState, jar: &CookieJar) -> Self {
        Self {
            sessions: Arc::new(PgSessionStore::new(
                state.pool.clone(),
                state.config.session_ttl_hours,
                cookies::session_token(jar),
            )),
            directory: Arc::new(PgAdminDirectory::new(state.pool.clone())),
            hints: Arc::new(cookies::hints_from_jar(jar)),
        }
    }

    fn context(&self) -> AuthContext {
        AuthContext::new(self.sessions.clone(), self.directory.clone(), self.hints.clone())
    }

    /// Mirror the session token and hints back into response cookies.
    fn write_back(&self, jar: CookieJar, secure: bool) -> CookieJar {
        let jar = cookies::with_session(jar, self.sessions.token(), secure);
        cookies::with_hints(jar, &self.hints, secure)
    }
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Proof that the request comes from an authenticated admin.
/// Use as a handler parameter to guard a route; other visitors are redirected
/// to setup or login.
pub struct AdminGuard;

impl<S> axum::extract::FromRequestParts<S> for AdminGuard
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let visitor = Visitor::from_jar(&app_state, &jar);

        let gate = AuthGate::new(visitor.sessions.clone(), visitor.directory.clone());
        gate.evaluate().await;
        match gate.state().view() {
            GuardView::Render => Ok(Self),
            GuardView::Redirect(target) => Err(Redirect::temporary(target).into_response()),
            GuardView::Loading => Err(StatusCode::SERVICE_UNAVAILABLE.into_response()),
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

pub(crate) fn login_failure_to_status(failure: LoginFailure) -> StatusCode {
    match failure {
        LoginFailure::InvalidCredentials => StatusCode::UNAUTHORIZED,
        LoginFailure::AccessDenied => StatusCode::FORBIDDEN,
        LoginFailure::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// `GET /admin/login` — tell the login page where to post and whether the
/// visitor was signed in last time.
pub async fn login_page(State(state): State<AppState>, jar: CookieJar) -> Json<serde_json::Value> {
    let visitor = Visitor::from_jar(&state, &jar);
    let ctx = visitor.context();
    Json(serde_json::json!({
        "login": "/api/admin/login",
        "probably_authenticated": ctx.probably_authenticated(),
    }))
}

/// `POST /api/admin/login` — sign in, require an admin record, set cookies.
pub async fn login(State(state): State<AppState>, jar: CookieJar, Json(body): Json<LoginRequest>) -> Response {
    let visitor = Visitor::from_jar(&state, &jar);
    let ctx = visitor.context();
    let result = ctx.login(&body.email, &body.password).await;
    let secure = state.config.cookie_secure;
    let jar = visitor.write_back(jar, secure);

    match result {
        Ok(()) => (StatusCode::NO_CONTENT, jar).into_response(),
        Err(failure) => {
            // Bad credentials never touch the held session. Any other failure
            // ends it, even if the remote revoke did not go through.
            let jar = match failure {
                LoginFailure::InvalidCredentials => jar,
                LoginFailure::AccessDenied | LoginFailure::Unavailable => cookies::with_session(jar, None, secure),
            };
            (
                login_failure_to_status(failure),
                jar,
                Json(ErrorBody { error: failure.message() }),
            )
                .into_response()
        }
    }
}

/// `POST /api/admin/logout` — revoke the session and always clear cookies.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let visitor = Visitor::from_jar(&state, &jar);
    let target = visitor.context().logout().await;

    let secure = state.config.cookie_secure;
    let jar = cookies::with_session(jar, None, secure);
    let jar = cookies::with_hints(jar, &visitor.hints, secure);
    (jar, Redirect::to(target)).into_response()
}

#[derive(Serialize)]
pub struct StatusBody {
    decision: AuthDecision,
    authenticated: bool,
}

/// `GET /api/admin/status` — authoritative re-check; refreshes the hint cookie
/// and drops a session cookie whose session no longer exists.
pub async fn status(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<StatusBody>) {
    let visitor = Visitor::from_jar(&state, &jar);
    let ctx = visitor.context();
    let decision = ctx.reconcile().await;
    let body = StatusBody { decision, authenticated: ctx.is_authenticated() };
    (visitor.write_back(jar, state.config.cookie_secure), Json(body))
}

#[derive(Serialize)]
pub struct AdminSummary {
    user_id: uuid::Uuid,
    is_super_admin: bool,
}

/// `GET /admin` — guarded landing data for the admin panel.
pub async fn dashboard(
    _guard: AdminGuard,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<AdminSummary>, Response> {
    let visitor = Visitor::from_jar(&state, &jar);
    let session = visitor
        .sessions
        .current_session()
        .await
        .map_err(|e| unavailable(&e))?
        .ok_or_else(|| Redirect::temporary(LOGIN_ROUTE).into_response())?;

    match visitor.directory.find_by_user_id(session.user_id).await {
        Ok(AdminLookup::Found(record)) => {
            Ok(Json(AdminSummary { user_id: record.user_id, is_super_admin: record.is_super_admin }))
        }
        Ok(AdminLookup::NotFound) => Err(Redirect::temporary(LOGIN_ROUTE).into_response()),
        Err(e) => Err(unavailable(&e)),
    }
}

fn unavailable(e: &dyn std::fmt::Display) -> Response {
    tracing::error!(error = %e, "admin summary lookup failed");
    StatusCode::SERVICE_UNAVAILABLE.into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
