// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Actions in domains/ call these; Postgres, Twilio and Stream implement them
// in production and kernel::test_dependencies implements them for tests.
//
// Naming convention: Base* for trait names (e.g., BaseSessionStore)

use anyhow::Result;
use async_trait::async_trait;
use stream_chat::models::{ChannelData, ChannelSummary, ChatUser};

use crate::common::ProfileId;
use crate::domains::auth::models::{PhoneIdentity, Session};
use crate::domains::contacts::models::Contact;
use crate::domains::profile::models::Profile;

// =============================================================================
// Document store traits (one per collection)
// =============================================================================

#[async_trait]
pub trait BaseSessionStore: Send + Sync {
    /// Drop every session stored for the session's identity and store this one,
    /// as one atomic step.
    async fn replace_session(&self, session: &Session) -> Result<()>;

    async fn find_pending_session(&self, identity: &PhoneIdentity) -> Result<Option<Session>>;

    async fn find_verified_session(&self, session_id: &str) -> Result<Option<Session>>;

    /// Flip a pending session to verified. False when the session is gone or
    /// was already verified.
    async fn mark_session_verified(&self, session_id: &str) -> Result<bool>;

    async fn delete_session(&self, session_id: &str) -> Result<()>;
}

#[async_trait]
pub trait BaseProfileStore: Send + Sync {
    async fn find_profile(&self, identity: &PhoneIdentity) -> Result<Option<Profile>>;

    /// Returns `None` if the identity already owns a profile; nothing is written.
    async fn insert_profile(&self, profile: &Profile) -> Result<Option<Profile>>;

    async fn update_profile(&self, profile: &Profile) -> Result<Profile>;
}

#[async_trait]
pub trait BaseContactStore: Send + Sync {
    /// Insert the edge, or return the stored one for the same `(user_id, contact_id)`.
    async fn add_contact(&self, contact: &Contact) -> Result<Contact>;

    /// Newest first.
    async fn list_contacts(&self, user_id: ProfileId) -> Result<Vec<Contact>>;
}

/// Everything the application persists.
#[async_trait]
pub trait BaseStore: BaseSessionStore + BaseProfileStore + BaseContactStore {
    /// Cheap reachability check for the health endpoint.
    async fn ping(&self) -> Result<()>;
}

// =============================================================================
// SMS Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseSmsService: Send + Sync {
    /// Send a text message to an E.164 number
    async fn send_sms(&self, to: &str, body: &str) -> Result<()>;
}

// =============================================================================
// Chat Provider Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseChatProvider: Send + Sync {
    /// Public API key handed to mobile clients
    fn api_key(&self) -> &str;

    /// Token a client uses to connect as `user_id`
    fn issue_token(&self, user_id: &str) -> Result<String>;

    async fn upsert_user(&self, user: &ChatUser) -> Result<()>;

    async fn create_channel(
        &self,
        channel_type: &str,
        channel_id: &str,
        data: &ChannelData,
    ) -> Result<ChannelSummary>;

    async fn query_channels(&self, user_id: &str) -> Result<Vec<ChannelSummary>>;
}
