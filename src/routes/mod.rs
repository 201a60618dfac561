//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the admin auth endpoints, first-run setup and the small public-site
//! helpers under one Axum router. Public page content and the admin CRUD
//! screens are served elsewhere; `/admin` here only proves the guard.

pub mod auth;
pub mod cookies;
pub mod setup;
pub mod site;

use std::any::Any;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

const PANIC_PAGE: &str = r#"<!doctype html>
<html>
  <head><title>Something went wrong</title></head>
  <body>
    <h1>Something went wrong</h1>
    <p>An unexpected error occurred while loading this page.</p>
    <p><a href="">Reload</a> &middot; <a href="/">Go home</a></p>
  </body>
</html>"#;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/admin", get(auth::dashboard))
        .route("/admin/login", get(auth::login_page))
        .route("/admin/setup", get(setup::setup_status).post(setup::complete_setup))
        .route("/api/admin/login", post(auth::login))
        .route("/api/admin/logout", post(auth::logout))
        .route("/api/admin/status", get(auth::status))
        .route("/api/role", post(site::select_role))
        .route("/api/nav", get(site::nav))
        .layer(CatchPanicLayer::custom(panic_fallback))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Last-resort boundary for unexpected handler panics.
fn panic_fallback(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, Html(PANIC_PAGE)).into_response()
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
