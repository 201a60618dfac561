use uuid::Uuid;

use super::*;
use crate::services::hints::MemoryHints;
use crate::services::test_support::{FakeDirectory, FakeSessions};

fn u1() -> Uuid {
    Uuid::from_u128(1)
}

fn u2() -> Uuid {
    Uuid::from_u128(2)
}

struct Harness {
    ctx: AuthContext,
    sessions: Arc<FakeSessions>,
    directory: Arc<FakeDirectory>,
    hints: Arc<MemoryHints>,
}

fn harness(sessions: FakeSessions, directory: FakeDirectory) -> Harness {
    let sessions = Arc::new(sessions);
    let directory = Arc::new(directory);
    let hints = Arc::new(MemoryHints::new());
    let ctx = AuthContext::new(sessions.clone(), directory.clone(), hints.clone());
    Harness { ctx, sessions, directory, hints }
}

fn standard_users() -> FakeSessions {
    FakeSessions::default()
        .with_user("u1@site.test", "correctpass", u1())
        .with_user("u2@site.test", "correctpass", u2())
}

// =============================================================================
// login
// =============================================================================

#[tokio::test]
async fn admin_login_sets_flag_and_hint() {
    let h = harness(standard_users(), FakeDirectory::with_admins(&[u1()]));
    assert_eq!(h.ctx.login("u1@site.test", "correctpass").await, Ok(()));
    assert!(h.ctx.is_authenticated());
    assert!(h.ctx.probably_authenticated());
    assert_eq!(h.hints.get(ADMIN_AUTHENTICATED_KEY).as_deref(), Some("true"));
    assert_eq!(h.sessions.current().map(|s| s.user_id), Some(u1()));
}

#[tokio::test]
async fn successful_login_implies_directory_record() {
    let h = harness(standard_users(), FakeDirectory::with_admins(&[u1()]));
    h.ctx.login("u1@site.test", "correctpass").await.unwrap();

    let user_id = h.sessions.current().unwrap().user_id;
    let lookup = h.directory.find_by_user_id(user_id).await.unwrap();
    assert!(lookup.is_found());
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials_and_leaves_flag() {
    let h = harness(standard_users(), FakeDirectory::with_admins(&[u1()]));
    assert_eq!(h.ctx.login("u1@site.test", "wrongpass").await, Err(LoginFailure::InvalidCredentials));
    assert!(!h.ctx.is_authenticated());
    assert_eq!(h.sessions.sign_outs(), 0);
}

#[tokio::test]
async fn failed_login_does_not_clear_an_existing_admin_flag() {
    let h = harness(standard_users(), FakeDirectory::with_admins(&[u1()]));
    h.ctx.login("u1@site.test", "correctpass").await.unwrap();
    assert_eq!(h.ctx.login("u1@site.test", "typo").await, Err(LoginFailure::InvalidCredentials));
    assert!(h.ctx.is_authenticated());
}

#[tokio::test]
async fn non_admin_login_is_denied_and_session_revoked() {
    let h = harness(standard_users(), FakeDirectory::with_admins(&[u1()]));
    let result = h.ctx.login("u2@site.test", "correctpass").await;

    assert_eq!(result, Err(LoginFailure::AccessDenied));
    assert_eq!(h.sessions.sign_outs(), 1);
    assert_eq!(h.sessions.current(), None);
    assert!(!h.ctx.is_authenticated());
    assert_eq!(h.hints.get(ADMIN_AUTHENTICATED_KEY), None);
    assert!(result.unwrap_err().message().contains("Access denied"));
}

#[tokio::test]
async fn non_admin_login_fails_closed_when_revoke_fails() {
    let sessions = FakeSessions { fail_sign_out: true, ..standard_users() };
    let h = harness(sessions, FakeDirectory::with_admins(&[u1()]));

    assert_eq!(h.ctx.login("u2@site.test", "correctpass").await, Err(LoginFailure::AccessDenied));
    assert_eq!(h.sessions.sign_outs(), 1);
    assert_eq!(h.sessions.current(), None);
    assert!(!h.ctx.is_authenticated());
    assert_eq!(h.hints.get(ADMIN_AUTHENTICATED_KEY), None);
}

#[tokio::test]
async fn non_admin_login_over_an_admin_session_revokes_both() {
    let h = harness(standard_users(), FakeDirectory::with_admins(&[u1()]));
    h.ctx.login("u1@site.test", "correctpass").await.unwrap();
    let admin_token = h.sessions.current().unwrap().token;

    assert_eq!(h.ctx.login("u2@site.test", "correctpass").await, Err(LoginFailure::AccessDenied));
    let revoked = h.sessions.revoked_tokens();
    assert!(revoked.contains(&admin_token));
    assert_eq!(revoked.len(), 2);
    assert_eq!(h.sessions.current(), None);
    assert!(!h.ctx.is_authenticated());
}

#[tokio::test]
async fn lookup_error_after_sign_in_fails_closed() {
    let directory = FakeDirectory { fail_lookup: true, ..FakeDirectory::with_admins(&[u1()]) };
    let h = harness(standard_users(), directory);

    assert_eq!(h.ctx.login("u1@site.test", "correctpass").await, Err(LoginFailure::Unavailable));
    assert_eq!(h.sessions.current(), None);
    assert!(!h.ctx.is_authenticated());
}

#[tokio::test]
async fn sign_in_outage_is_unavailable() {
    let sessions = FakeSessions { fail_sign_in: true, ..standard_users() };
    let h = harness(sessions, FakeDirectory::with_admins(&[u1()]));
    assert_eq!(h.ctx.login("u1@site.test", "correctpass").await, Err(LoginFailure::Unavailable));
    assert_eq!(h.directory.lookup_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn sign_in_outage_clears_a_stale_hint() {
    let sessions = FakeSessions { fail_sign_in: true, ..standard_users() };
    let h = harness(sessions, FakeDirectory::with_admins(&[u1()]));
    h.hints.set(ADMIN_AUTHENTICATED_KEY, "true");

    assert_eq!(h.ctx.login("u1@site.test", "correctpass").await, Err(LoginFailure::Unavailable));
    assert!(!h.ctx.is_authenticated());
    assert!(!h.ctx.probably_authenticated());
}

#[test]
fn failure_messages_are_non_technical() {
    for failure in [LoginFailure::InvalidCredentials, LoginFailure::AccessDenied, LoginFailure::Unavailable] {
        let msg = failure.message();
        assert!(!msg.contains("database"));
        assert!(!msg.is_empty());
    }
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test]
async fn logout_clears_state_and_returns_home() {
    let h = harness(standard_users(), FakeDirectory::with_admins(&[u1()]));
    h.ctx.login("u1@site.test", "correctpass").await.unwrap();

    assert_eq!(h.ctx.logout().await, "/");
    assert!(!h.ctx.is_authenticated());
    assert!(!h.ctx.probably_authenticated());
    assert_eq!(h.sessions.current(), None);
}

#[tokio::test]
async fn logout_clears_local_state_when_remote_sign_out_fails() {
    let sessions = FakeSessions { fail_sign_out: true, ..standard_users() };
    let h = harness(sessions, FakeDirectory::with_admins(&[u1()]));
    h.ctx.login("u1@site.test", "correctpass").await.unwrap();
    assert!(h.ctx.is_authenticated());

    assert_eq!(h.ctx.logout().await, HOME_ROUTE);
    assert!(!h.ctx.is_authenticated());
    assert_eq!(h.hints.get(ADMIN_AUTHENTICATED_KEY), None);
    assert_eq!(h.sessions.sign_outs(), 1);
}

// =============================================================================
// reconcile
// =============================================================================

#[tokio::test]
async fn reconcile_ignores_a_stale_hint() {
    let h = harness(FakeSessions::default(), FakeDirectory::with_admins(&[u1()]));
    h.hints.set(ADMIN_AUTHENTICATED_KEY, "true");
    assert!(h.ctx.probably_authenticated());
    assert!(!h.ctx.is_authenticated());

    assert_eq!(h.ctx.reconcile().await, AuthDecision::Unauthenticated);
    assert!(!h.ctx.probably_authenticated());
}

#[tokio::test]
async fn reconcile_detects_removed_admin_record() {
    let h = harness(standard_users(), FakeDirectory::with_admins(&[u1(), u2()]));
    h.ctx.login("u1@site.test", "correctpass").await.unwrap();

    h.directory.remove(u1());
    assert_eq!(h.ctx.reconcile().await, AuthDecision::Unauthenticated);
    assert!(!h.ctx.is_authenticated());
}

#[tokio::test]
async fn reconcile_restores_flag_for_live_admin_session() {
    let h = harness(FakeSessions::default().signed_in_as(u1()), FakeDirectory::with_admins(&[u1()]));
    assert!(!h.ctx.is_authenticated());

    assert_eq!(h.ctx.reconcile().await, AuthDecision::AuthenticatedAdmin);
    assert!(h.ctx.is_authenticated());
    assert!(h.ctx.probably_authenticated());
}

#[tokio::test]
async fn reconcile_with_no_admins_reports_setup_needed() {
    let h = harness(FakeSessions::default().signed_in_as(u1()), FakeDirectory::default());
    assert_eq!(h.ctx.reconcile().await, AuthDecision::SetupNeeded);
    assert!(!h.ctx.is_authenticated());
}
