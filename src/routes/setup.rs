//! First-run setup routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use crate::services::directory::PgAdminDirectory;
use crate::services::gate::LOGIN_ROUTE;
use crate::services::setup::{self, NewAdmin, SetupError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SetupRequest {
    email: String,
    password: String,
    #[serde(default)]
    name: String,
}

pub(crate) fn setup_error_to_status(err: &SetupError) -> StatusCode {
    match err {
        SetupError::AlreadyConfigured => StatusCode::CONFLICT,
        SetupError::InvalidEmail | SetupError::WeakPassword => StatusCode::BAD_REQUEST,
        SetupError::Password(_) | SetupError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `GET /admin/setup` — whether the first admin still needs to be created.
pub async fn setup_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let directory = PgAdminDirectory::new(state.pool.clone());
    let needed = setup::setup_needed(&directory).await;
    Json(serde_json::json!({ "setup_needed": needed }))
}

/// `POST /admin/setup` — create the first super admin, then send them to login.
pub async fn complete_setup(State(state): State<AppState>, Json(body): Json<SetupRequest>) -> Response {
    let result = match NewAdmin::parse(&body.email, &body.name, &body.password) {
        Ok(admin) => setup::create_first_admin(&state.pool, &admin).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(record) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "user_id": record.user_id, "next": LOGIN_ROUTE })),
        )
            .into_response(),
        Err(e) => {
            let status = setup_error_to_status(&e);
            if status.is_server_error() {
                tracing::error!(error = %e, "first admin setup failed");
                return (status, Json(serde_json::json!({ "error": "setup failed" }))).into_response();
            }
            (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
        }
    }
}

#[cfg(test)]
#[path = "setup_test.rs"]
mod tests;
