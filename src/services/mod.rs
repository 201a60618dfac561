//! Domain services behind the admin routes.
//!
//! ARCHITECTURE
//! ============
//! `session` and `directory` wrap the external collaborators (sign-in and
//! the admin table) behind traits. `gate` and `context` hold all access
//! decisions and only talk to those traits, so route handlers stay focused on
//! cookie and redirect plumbing.

pub mod context;
pub mod directory;
pub mod gate;
pub mod hints;
pub mod password;
pub mod session;
pub mod setup;

#[cfg(test)]
pub(crate) mod test_support;
