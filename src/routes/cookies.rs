//! Cookie plumbing for the admin session and the continuity hints.
//!
//! The session cookie is `HttpOnly`. Hint cookies are readable by page
//! scripts because their only job is to let the UI render optimistically.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::services::hints::{ADMIN_AUTHENTICATED_KEY, ContinuityStore, MemoryHints, ROLE_SELECTED_KEY};

pub const SESSION_COOKIE: &str = "admin_session";

const HINT_KEYS: [&str; 2] = [ADMIN_AUTHENTICATED_KEY, ROLE_SELECTED_KEY];

#[must_use]
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn build(name: &'static str, value: String, http_only: bool, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(http_only)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn expired(name: &'static str, http_only: bool, secure: bool) -> Cookie<'static> {
    let mut cookie = build(name, String::new(), http_only, secure);
    cookie.set_max_age(Duration::ZERO);
    cookie
}

/// Set the session cookie to `token`, or clear it when `None`.
#[must_use]
pub fn with_session(jar: CookieJar, token: Option<String>, secure: bool) -> CookieJar {
    match token {
        Some(token) => jar.add(build(SESSION_COOKIE, token, true, secure)),
        None => jar.add(expired(SESSION_COOKIE, true, secure)),
    }
}

/// Load the known hint cookies into a fresh in-memory store.
#[must_use]
pub fn hints_from_jar(jar: &CookieJar) -> MemoryHints {
    let hints = MemoryHints::new();
    for key in HINT_KEYS {
        if let Some(cookie) = jar.get(key) {
            hints.set(key, cookie.value());
        }
    }
    hints
}

/// Write every known hint back out, expiring the ones that were removed.
#[must_use]
pub fn with_hints(mut jar: CookieJar, hints: &MemoryHints, secure: bool) -> CookieJar {
    let entries = hints.entries();
    for key in HINT_KEYS {
        jar = match entries.get(key) {
            Some(value) => jar.add(build(key, value.clone(), false, secure)),
            None => jar.add(expired(key, false, secure)),
        };
    }
    jar
}
