//! Postgres implementation of the store traits.
//!
//! SQL lives on the models; this type only routes trait calls to them.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::ProfileId;
use crate::domains::auth::models::{PhoneIdentity, Session};
use crate::domains::contacts::models::Contact;
use crate::domains::profile::models::Profile;
use crate::kernel::{BaseContactStore, BaseProfileStore, BaseSessionStore, BaseStore};

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BaseSessionStore for PostgresStore {
    async fn replace_session(&self, session: &Session) -> Result<()> {
        session.replace_for_identity(&self.pool).await
    }

    async fn find_pending_session(&self, identity: &PhoneIdentity) -> Result<Option<Session>> {
        Session::find_pending(identity, &self.pool).await
    }

    async fn find_verified_session(&self, session_id: &str) -> Result<Option<Session>> {
        Session::find_verified(session_id, &self.pool).await
    }

    async fn mark_session_verified(&self, session_id: &str) -> Result<bool> {
        Session::mark_verified(session_id, &self.pool).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        Session::delete(session_id, &self.pool).await
    }
}

#[async_trait]
impl BaseProfileStore for PostgresStore {
    async fn find_profile(&self, identity: &PhoneIdentity) -> Result<Option<Profile>> {
        Profile::find_by_identity(identity, &self.pool).await
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<Option<Profile>> {
        profile.insert(&self.pool).await
    }

    async fn update_profile(&self, profile: &Profile) -> Result<Profile> {
        profile.update(&self.pool).await
    }
}

#[async_trait]
impl BaseContactStore for PostgresStore {
    async fn add_contact(&self, contact: &Contact) -> Result<Contact> {
        contact.insert_or_existing(&self.pool).await
    }

    async fn list_contacts(&self, user_id: ProfileId) -> Result<Vec<Contact>> {
        Contact::find_for_user(user_id, &self.pool).await
    }
}

#[async_trait]
impl BaseStore for PostgresStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
