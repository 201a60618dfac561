//! Public-site helpers: cosmetic role choice and navigation flags.
//!
//! Nothing here grants access. The role hint only decides whether the Admin
//! link is drawn; the link target is still guarded.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::cookies;
use crate::services::hints::{self, ContinuityStore, ROLE_SELECTED_KEY};
use crate::state::AppState;

const MAX_ROLE_LEN: usize = 32;

#[derive(Deserialize)]
pub struct RoleRequest {
    role: Option<String>,
}

/// `POST /api/role` — remember (or forget) the visitor's chosen role.
pub async fn select_role(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RoleRequest>,
) -> impl IntoResponse {
    let role = body
        .role
        .map(|r| r.trim().to_ascii_lowercase())
        .filter(|r| !r.is_empty());
    if role.as_ref().is_some_and(|r| r.len() > MAX_ROLE_LEN) {
        return (jar, StatusCode::BAD_REQUEST);
    }

    let hints = cookies::hints_from_jar(&jar);
    match role {
        Some(role) => hints.set(ROLE_SELECTED_KEY, &role),
        None => hints.remove(ROLE_SELECTED_KEY),
    }
    (cookies::with_hints(jar, &hints, state.config.cookie_secure), StatusCode::NO_CONTENT)
}

/// `GET /api/nav` — navigation flags for the public layout.
pub async fn nav(jar: CookieJar) -> Json<serde_json::Value> {
    let hints = cookies::hints_from_jar(&jar);
    Json(serde_json::json!({ "show_admin_link": hints::show_admin_link(&hints) }))
}
