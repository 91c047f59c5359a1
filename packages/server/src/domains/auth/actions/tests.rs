use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};

use super::*;
use crate::common::{ApiError, ProfileId};
use crate::domains::auth::models::{PhoneIdentity, Session};
use crate::domains::auth::SimulatedVerifier;
use crate::domains::contacts::models::Contact;
use crate::domains::profile::models::Profile;
use crate::kernel::test_dependencies::InMemoryStore;
use crate::kernel::{
    BaseContactStore, BaseProfileStore, BaseSessionStore, BaseStore, ServerDeps,
    TestDependencies,
};

fn identity() -> PhoneIdentity {
    PhoneIdentity::normalize("6505551234", "+1")
}

async fn verified_session(test: &TestDependencies) -> String {
    let deps = test.server_deps();
    let sent = send_code(identity(), &deps).await.unwrap();
    let result = verify_code(identity(), "123456", &deps).await.unwrap();
    assert_eq!(
        result,
        VerifyCodeResult::Verified {
            session_id: sent.session_id.clone()
        }
    );
    sent.session_id
}

#[tokio::test]
async fn test_send_code_creates_pending_session() {
    let test = TestDependencies::new();
    let deps = test.server_deps();

    let sent = send_code(identity(), &deps).await.unwrap();

    let session = test.store.session(&sent.session_id).unwrap();
    assert!(!session.is_verified);
    assert_eq!(session.phone, "6505551234");
    assert_eq!(session.verification_code.len(), 6);
    assert_eq!(session.expires_at - session.created_at, Duration::minutes(5));
}

#[tokio::test]
async fn test_send_code_replaces_previous_sessions() {
    let test = TestDependencies::new();
    let deps = test.server_deps();

    let first = verified_session(&test).await;
    let second = send_code(identity(), &deps).await.unwrap();

    let sessions = test.store.sessions_for(&identity());
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, second.session_id);
    assert!(test.store.session(&first).is_none());
}

#[tokio::test]
async fn test_send_code_normalizes_identity() {
    let test = TestDependencies::new();
    let deps = test.server_deps();

    send_code(PhoneIdentity::normalize("(650) 555-1234", "1"), &deps)
        .await
        .unwrap();

    let result = verify_code(identity(), "654321", &deps).await.unwrap();
    assert!(matches!(result, VerifyCodeResult::Verified { .. }));
}

#[tokio::test]
async fn test_malformed_code_rejected_before_store() {
    let test = TestDependencies::new();
    let deps = test.server_deps();

    // No session exists at all: format is still what gets reported.
    for code in ["12345", "12345a", "1234567", ""] {
        assert_eq!(
            verify_code(identity(), code, &deps).await.unwrap(),
            VerifyCodeResult::InvalidFormat
        );
    }

    send_code(identity(), &deps).await.unwrap();
    assert_eq!(
        verify_code(identity(), "12345", &deps).await.unwrap(),
        VerifyCodeResult::InvalidFormat
    );
    assert!(!test.store.sessions_for(&identity())[0].is_verified);
}

#[tokio::test]
async fn test_verify_without_session() {
    let test = TestDependencies::new();
    let deps = test.server_deps();

    assert_eq!(
        verify_code(identity(), "123456", &deps).await.unwrap(),
        VerifyCodeResult::SessionNotFound
    );
}

#[tokio::test]
async fn test_verify_twice_finds_no_pending_session() {
    let test = TestDependencies::new();
    let deps = test.server_deps();

    verified_session(&test).await;
    assert_eq!(
        verify_code(identity(), "123456", &deps).await.unwrap(),
        VerifyCodeResult::SessionNotFound
    );
}

#[tokio::test]
async fn test_expired_pending_session_is_deleted() {
    let test = TestDependencies::new();
    let deps = test.server_deps();

    let stale = Session::new_pending(
        &identity(),
        "111111".to_string(),
        Utc::now() - Duration::minutes(6),
    );
    let stale_id = stale.id.clone();
    test.store.seed_session(stale);

    assert_eq!(
        verify_code(identity(), "111111", &deps).await.unwrap(),
        VerifyCodeResult::SessionExpired
    );
    assert!(test.store.session(&stale_id).is_none());
    assert_eq!(
        verify_code(identity(), "111111", &deps).await.unwrap(),
        VerifyCodeResult::SessionNotFound
    );
}

#[tokio::test]
async fn test_unverified_session_fails_check() {
    let test = TestDependencies::new();
    let deps = test.server_deps();

    let sent = send_code(identity(), &deps).await.unwrap();
    assert_eq!(
        check_session(&sent.session_id, &deps).await.unwrap(),
        SessionCheck::Invalid
    );
}

#[tokio::test]
async fn test_check_valid_session_returns_identity() {
    let test = TestDependencies::new();
    let deps = test.server_deps();

    let session_id = verified_session(&test).await;
    assert_eq!(
        check_session(&session_id, &deps).await.unwrap(),
        SessionCheck::Valid(identity())
    );
}

#[tokio::test]
async fn test_check_unknown_session() {
    let test = TestDependencies::new();
    let deps = test.server_deps();

    assert_eq!(
        check_session("does-not-exist", &deps).await.unwrap(),
        SessionCheck::Invalid
    );
}

#[tokio::test]
async fn test_verified_session_expires_after_24_hours() {
    let test = TestDependencies::new();
    let deps = test.server_deps();

    let mut session = Session::new_pending(
        &identity(),
        "123456".to_string(),
        Utc::now() - Duration::hours(25),
    );
    session.is_verified = true;
    let session_id = session.id.clone();
    test.store.seed_session(session);

    assert_eq!(
        check_session(&session_id, &deps).await.unwrap(),
        SessionCheck::Expired
    );
    assert!(test.store.session(&session_id).is_none());
    assert_eq!(
        check_session(&session_id, &deps).await.unwrap(),
        SessionCheck::Invalid
    );
}

#[tokio::test]
async fn test_verified_session_inside_window_ignores_code_expiry() {
    let test = TestDependencies::new();
    let deps = test.server_deps();

    // Created 2h ago: the 5 minute code window is long gone but the 24h
    // verified window is not.
    let mut session = Session::new_pending(
        &identity(),
        "123456".to_string(),
        Utc::now() - Duration::hours(2),
    );
    session.is_verified = true;
    let session_id = session.id.clone();
    test.store.seed_session(session);

    assert!(matches!(
        check_session(&session_id, &deps).await.unwrap(),
        SessionCheck::Valid(_)
    ));
}

#[tokio::test]
async fn test_require_verified_session_is_unauthorized_for_pending() {
    let test = TestDependencies::new();
    let deps = test.server_deps();

    let sent = send_code(identity(), &deps).await.unwrap();
    let result = require_verified_session(&sent.session_id, &deps).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_real_verification_requires_matching_code() {
    let test = TestDependencies::new().with_real_verification();
    let deps = test.server_deps();

    let sent = send_code(identity(), &deps).await.unwrap();
    let code = test.sms.last_code().unwrap();
    assert_eq!(test.sms.sent()[0].0, "+16505551234");

    let wrong = if code == "000000" { "111111" } else { "000000" };
    assert_eq!(
        verify_code(identity(), wrong, &deps).await.unwrap(),
        VerifyCodeResult::InvalidCode
    );
    // Mismatch leaves the session pending.
    assert!(!test.store.session(&sent.session_id).unwrap().is_verified);

    assert_eq!(
        verify_code(identity(), &code, &deps).await.unwrap(),
        VerifyCodeResult::Verified {
            session_id: sent.session_id
        }
    );
}

#[tokio::test]
async fn test_simulated_verification_sends_no_sms() {
    let test = TestDependencies::new();
    let deps = test.server_deps();

    send_code(identity(), &deps).await.unwrap();
    assert!(test.sms.sent().is_empty());
}

#[tokio::test]
async fn test_send_code_failure_leaves_no_session() {
    let test = TestDependencies::new().with_failing_sms();
    let deps = test.server_deps();

    assert!(send_code(identity(), &deps).await.is_err());
    assert!(test.store.sessions_for(&identity()).is_empty());
    assert_eq!(
        verify_code(identity(), "123456", &deps).await.unwrap(),
        VerifyCodeResult::SessionNotFound
    );
}

/// Store that lets a second `send_code` land between reading the pending
/// session and marking it verified.
struct ReplacingStore {
    inner: Arc<InMemoryStore>,
}

#[async_trait]
impl BaseSessionStore for ReplacingStore {
    async fn replace_session(&self, session: &Session) -> Result<()> {
        self.inner.replace_session(session).await
    }

    async fn find_pending_session(&self, identity: &PhoneIdentity) -> Result<Option<Session>> {
        let found = self.inner.find_pending_session(identity).await?;
        let newer = Session::new_pending(identity, "999999".to_string(), Utc::now());
        self.inner.replace_session(&newer).await?;
        Ok(found)
    }

    async fn find_verified_session(&self, session_id: &str) -> Result<Option<Session>> {
        self.inner.find_verified_session(session_id).await
    }

    async fn mark_session_verified(&self, session_id: &str) -> Result<bool> {
        self.inner.mark_session_verified(session_id).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.inner.delete_session(session_id).await
    }
}

#[async_trait]
impl BaseProfileStore for ReplacingStore {
    async fn find_profile(&self, identity: &PhoneIdentity) -> Result<Option<Profile>> {
        self.inner.find_profile(identity).await
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<Option<Profile>> {
        self.inner.insert_profile(profile).await
    }

    async fn update_profile(&self, profile: &Profile) -> Result<Profile> {
        self.inner.update_profile(profile).await
    }
}

#[async_trait]
impl BaseContactStore for ReplacingStore {
    async fn add_contact(&self, contact: &Contact) -> Result<Contact> {
        self.inner.add_contact(contact).await
    }

    async fn list_contacts(&self, user_id: ProfileId) -> Result<Vec<Contact>> {
        self.inner.list_contacts(user_id).await
    }
}

#[async_trait]
impl BaseStore for ReplacingStore {
    async fn ping(&self) -> Result<()> {
        self.inner.ping().await
    }
}

#[tokio::test]
async fn test_session_replaced_during_verify_is_not_found() {
    let test = TestDependencies::new();
    let sent = send_code(identity(), &test.server_deps()).await.unwrap();

    let deps = ServerDeps::new(
        Arc::new(ReplacingStore {
            inner: test.store.clone(),
        }),
        Arc::new(SimulatedVerifier),
        test.chat.clone(),
    );

    assert_eq!(
        verify_code(identity(), "123456", &deps).await.unwrap(),
        VerifyCodeResult::SessionNotFound
    );
    assert!(test.store.session(&sent.session_id).is_none());
    assert_eq!(
        check_session(&sent.session_id, &deps).await.unwrap(),
        SessionCheck::Invalid
    );
    // The replacement is still waiting for its own code.
    let sessions = test.store.sessions_for(&identity());
    assert_eq!(sessions.len(), 1);
    assert!(!sessions[0].is_verified);
}
