//! Local continuity hints.
//!
//! DESIGN
//! ======
//! A small string key-value store scoped to one visitor. It exists only to
//! make the UI feel fast ("probably signed in") and to remember a cosmetic
//! role choice. Nothing that decides access reads from it; every hint is
//! overwritten by the next authoritative check.

use std::collections::HashMap;
use std::sync::Mutex;

/// Set to `"true"` after a verified admin login or reconcile.
pub const ADMIN_AUTHENTICATED_KEY: &str = "admin_authenticated";
/// The role a visitor picked on the landing page. Only toggles the Admin nav link.
pub const ROLE_SELECTED_KEY: &str = "role_selected";

pub const ADMIN_ROLE: &str = "admin";

pub trait ContinuityStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Whether the Admin navigation link should be shown. Cosmetic only.
#[must_use]
pub fn show_admin_link(hints: &dyn ContinuityStore) -> bool {
    hints.get(ROLE_SELECTED_KEY).as_deref() == Some(ADMIN_ROLE)
}

/// In-memory hint store.
#[derive(Default)]
pub struct MemoryHints {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryHints {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries, used to write them back out as cookies.
    #[must_use]
    pub fn entries(&self) -> HashMap<String, String> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ContinuityStore for MemoryHints {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_owned(), value.to_owned());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}
