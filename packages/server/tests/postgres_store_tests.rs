//! Postgres store tests. Need Docker: `cargo test -- --ignored`.

mod common;

use chrono::Utc;
use common::{unique_phone, TestHarness};
use test_context::test_context;
use tontine_core::domains::auth::models::{PhoneIdentity, Session};
use tontine_core::domains::contacts::models::Contact;
use tontine_core::domains::profile::models::{NewProfile, Profile, ProfileChanges};
use tontine_core::kernel::{
    BaseContactStore, BaseProfileStore, BaseSessionStore, BaseStore, PostgresStore,
};

fn new_profile(identity: &PhoneIdentity, first_name: &str) -> Profile {
    Profile::new(
        identity,
        NewProfile {
            first_name: first_name.to_string(),
            last_name: "Test".to_string(),
            ..Default::default()
        },
        Utc::now(),
    )
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn ping_succeeds(ctx: &mut TestHarness) {
    ctx.store().ping().await.unwrap();
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn replace_session_keeps_one_row_per_identity(ctx: &mut TestHarness) {
    let store = ctx.store();
    let identity = PhoneIdentity::normalize(&unique_phone(), "+225");

    let first = Session::new_pending(&identity, "111111".to_string(), Utc::now());
    store.replace_session(&first).await.unwrap();
    assert!(store.mark_session_verified(&first.id).await.unwrap());
    assert!(!store.mark_session_verified(&first.id).await.unwrap());

    let second = Session::new_pending(&identity, "222222".to_string(), Utc::now());
    store.replace_session(&second).await.unwrap();
    assert!(!store.mark_session_verified(&first.id).await.unwrap());

    assert!(store.find_verified_session(&first.id).await.unwrap().is_none());
    let pending = store.find_pending_session(&identity).await.unwrap().unwrap();
    assert_eq!(pending.id, second.id);
    assert_eq!(pending.verification_code, "222222");

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sessions WHERE phone = $1 AND country_code = $2",
    )
    .bind(identity.phone())
    .bind(identity.country_code())
    .fetch_one(&ctx.db_pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn concurrent_replacements_leave_one_session(ctx: &mut TestHarness) {
    let identity = PhoneIdentity::normalize(&unique_phone(), "+33");

    let attempts: Vec<Session> = (0..8)
        .map(|i| Session::new_pending(&identity, format!("{:06}", i), Utc::now()))
        .collect();
    let handles: Vec<_> = attempts
        .into_iter()
        .map(|session| {
            let store = PostgresStore::new(ctx.db_pool.clone());
            tokio::spawn(async move { store.replace_session(&session).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sessions WHERE phone = $1 AND country_code = $2",
    )
    .bind(identity.phone())
    .bind(identity.country_code())
    .fetch_one(&ctx.db_pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn insert_profile_is_once_per_identity(ctx: &mut TestHarness) {
    let store = ctx.store();
    let identity = PhoneIdentity::normalize(&unique_phone(), "+225");

    let created = store
        .insert_profile(&new_profile(&identity, "Awa"))
        .await
        .unwrap();
    assert!(created.is_some());

    let duplicate = store
        .insert_profile(&new_profile(&identity, "Autre"))
        .await
        .unwrap();
    assert!(duplicate.is_none());

    let stored = store.find_profile(&identity).await.unwrap().unwrap();
    assert_eq!(stored.first_name, "Awa");
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn update_profile_round_trips(ctx: &mut TestHarness) {
    let store = ctx.store();
    let identity = PhoneIdentity::normalize(&unique_phone(), "+225");
    let mut profile = store
        .insert_profile(&new_profile(&identity, "Awa"))
        .await
        .unwrap()
        .unwrap();

    profile.apply(
        ProfileChanges {
            city: Some("Bouaké".to_string()),
            has_completed_tutorial: Some(true),
            ..Default::default()
        },
        Utc::now(),
    );
    let updated = store.update_profile(&profile).await.unwrap();

    assert_eq!(updated.city.as_deref(), Some("Bouaké"));
    assert!(updated.has_completed_tutorial);
    assert_eq!(updated.first_name, "Awa");
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn add_contact_is_idempotent(ctx: &mut TestHarness) {
    let store = ctx.store();
    let owner = store
        .insert_profile(&new_profile(
            &PhoneIdentity::normalize(&unique_phone(), "+225"),
            "Awa",
        ))
        .await
        .unwrap()
        .unwrap();
    let other = store
        .insert_profile(&new_profile(
            &PhoneIdentity::normalize(&unique_phone(), "+225"),
            "Yao",
        ))
        .await
        .unwrap()
        .unwrap();

    let first = store
        .add_contact(&Contact::new(&owner, &other, Utc::now()))
        .await
        .unwrap();
    let second = store
        .add_contact(&Contact::new(&owner, &other, Utc::now()))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    let contacts = store.list_contacts(owner.id).await.unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].contact_id, other.id);
    assert!(store.list_contacts(other.id).await.unwrap().is_empty());
}
