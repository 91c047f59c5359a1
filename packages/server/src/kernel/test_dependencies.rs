// TestDependencies - in-memory store and mock services for testing
//
// Provides implementations that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use stream_chat::models::{ChannelData, ChannelSummary, ChatUser};

use super::{
    BaseChatProvider, BaseContactStore, BaseProfileStore, BaseSessionStore, BaseSmsService,
    BaseStore, ServerDeps,
};
use crate::common::ProfileId;
use crate::domains::auth::models::{PhoneIdentity, Session};
use crate::domains::auth::{CodeVerifier, RealVerifier, SimulatedVerifier};
use crate::domains::contacts::models::Contact;
use crate::domains::profile::models::Profile;

// =============================================================================
// In-memory Store
// =============================================================================

#[derive(Default)]
struct StoreState {
    sessions: HashMap<String, Session>,
    profiles: HashMap<ProfileId, Profile>,
    contacts: Vec<Contact>,
}

/// Store with the same uniqueness guarantees as the Postgres schema.
///
/// Every operation runs under one lock, so "replace session" and "insert
/// profile" are atomic here too.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    ping_error: Mutex<Option<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a session in place as-is (backdated timestamps, pre-verified...).
    pub fn seed_session(&self, session: Session) {
        let mut state = self.state.lock().unwrap();
        state.sessions.insert(session.id.clone(), session);
    }

    pub fn session(&self, id: &str) -> Option<Session> {
        self.state.lock().unwrap().sessions.get(id).cloned()
    }

    pub fn sessions_for(&self, identity: &PhoneIdentity) -> Vec<Session> {
        self.state
            .lock()
            .unwrap()
            .sessions
            .values()
            .filter(|s| s.phone == identity.phone() && s.country_code == identity.country_code())
            .cloned()
            .collect()
    }

    pub fn profile_count(&self) -> usize {
        self.state.lock().unwrap().profiles.len()
    }

    pub fn contact_count(&self) -> usize {
        self.state.lock().unwrap().contacts.len()
    }

    /// Make every subsequent `ping` fail with `message`.
    pub fn fail_ping(&self, message: &str) {
        *self.ping_error.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl BaseSessionStore for InMemoryStore {
    async fn replace_session(&self, session: &Session) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .sessions
            .retain(|_, s| !(s.phone == session.phone && s.country_code == session.country_code));
        state.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn find_pending_session(&self, identity: &PhoneIdentity) -> Result<Option<Session>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .sessions
            .values()
            .find(|s| {
                !s.is_verified
                    && s.phone == identity.phone()
                    && s.country_code == identity.country_code()
            })
            .cloned())
    }

    async fn find_verified_session(&self, session_id: &str) -> Result<Option<Session>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .sessions
            .get(session_id)
            .filter(|s| s.is_verified)
            .cloned())
    }

    async fn mark_session_verified(&self, session_id: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.sessions.get_mut(session_id) {
            Some(session) if !session.is_verified => {
                session.is_verified = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.state.lock().unwrap().sessions.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl BaseProfileStore for InMemoryStore {
    async fn find_profile(&self, identity: &PhoneIdentity) -> Result<Option<Profile>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .profiles
            .values()
            .find(|p| p.phone == identity.phone() && p.country_code == identity.country_code())
            .cloned())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<Option<Profile>> {
        let mut state = self.state.lock().unwrap();
        let taken = state
            .profiles
            .values()
            .any(|p| p.phone == profile.phone && p.country_code == profile.country_code);
        if taken {
            return Ok(None);
        }
        state.profiles.insert(profile.id, profile.clone());
        Ok(Some(profile.clone()))
    }

    async fn update_profile(&self, profile: &Profile) -> Result<Profile> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .profiles
            .get_mut(&profile.id)
            .ok_or_else(|| anyhow::anyhow!("profile {} not found", profile.id))?;
        *stored = profile.clone();
        Ok(stored.clone())
    }
}

#[async_trait]
impl BaseContactStore for InMemoryStore {
    async fn add_contact(&self, contact: &Contact) -> Result<Contact> {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state
            .contacts
            .iter()
            .find(|c| c.user_id == contact.user_id && c.contact_id == contact.contact_id)
        {
            return Ok(existing.clone());
        }
        state.contacts.push(contact.clone());
        Ok(contact.clone())
    }

    async fn list_contacts(&self, user_id: ProfileId) -> Result<Vec<Contact>> {
        let state = self.state.lock().unwrap();
        let mut contacts: Vec<Contact> = state
            .contacts
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        contacts.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        Ok(contacts)
    }
}

#[async_trait]
impl BaseStore for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        match self.ping_error.lock().unwrap().as_ref() {
            Some(message) => anyhow::bail!("{}", message),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Mock SMS Service
// =============================================================================

pub struct MockSmsService {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl MockSmsService {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// Every send returns an error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// `(to, body)` of every message sent
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Six-digit code in the last message body
    pub fn last_code(&self) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        let (_, body) = sent.last()?;
        body.split_whitespace()
            .find(|word| word.len() == 6 && word.bytes().all(|b| b.is_ascii_digit()))
            .map(str::to_string)
    }
}

impl Default for MockSmsService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseSmsService for MockSmsService {
    async fn send_sms(&self, to: &str, body: &str) -> Result<()> {
        if self.fail {
            anyhow::bail!("SMS provider unavailable");
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}

// =============================================================================
// Mock Chat Provider
// =============================================================================

/// Channel recorded by the mock provider
#[derive(Debug, Clone)]
pub struct CreatedChannel {
    pub channel_type: String,
    pub channel_id: String,
    pub data: ChannelData,
}

pub struct MockChatProvider {
    users: Arc<Mutex<Vec<ChatUser>>>,
    channels: Arc<Mutex<Vec<CreatedChannel>>>,
}

impl MockChatProvider {
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(Vec::new())),
            channels: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn users(&self) -> Vec<ChatUser> {
        self.users.lock().unwrap().clone()
    }

    pub fn channels(&self) -> Vec<CreatedChannel> {
        self.channels.lock().unwrap().clone()
    }
}

impl Default for MockChatProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn summary(channel: &CreatedChannel) -> ChannelSummary {
    ChannelSummary {
        id: channel.channel_id.clone(),
        channel_type: channel.channel_type.clone(),
        cid: format!("{}:{}", channel.channel_type, channel.channel_id),
        name: channel.data.name.clone(),
        member_count: Some(channel.data.members.len() as i64),
        created_at: None,
    }
}

#[async_trait]
impl BaseChatProvider for MockChatProvider {
    fn api_key(&self) -> &str {
        "test_stream_key"
    }

    fn issue_token(&self, user_id: &str) -> Result<String> {
        Ok(format!("token:{}", user_id))
    }

    async fn upsert_user(&self, user: &ChatUser) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        users.retain(|u| u.id != user.id);
        users.push(user.clone());
        Ok(())
    }

    async fn create_channel(
        &self,
        channel_type: &str,
        channel_id: &str,
        data: &ChannelData,
    ) -> Result<ChannelSummary> {
        let channel = CreatedChannel {
            channel_type: channel_type.to_string(),
            channel_id: channel_id.to_string(),
            data: data.clone(),
        };
        let result = summary(&channel);
        self.channels.lock().unwrap().push(channel);
        Ok(result)
    }

    async fn query_channels(&self, user_id: &str) -> Result<Vec<ChannelSummary>> {
        let channels = self.channels.lock().unwrap();
        Ok(channels
            .iter()
            .filter(|c| c.data.members.iter().any(|m| m == user_id))
            .map(summary)
            .collect())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Bundle of test doubles, kept around so tests can inspect them after the
/// code under test ran.
pub struct TestDependencies {
    pub store: Arc<InMemoryStore>,
    pub sms: Arc<MockSmsService>,
    pub chat: Arc<MockChatProvider>,
    real_verification: bool,
}

impl TestDependencies {
    /// Simulated verification: any well-formed code is accepted.
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            sms: Arc::new(MockSmsService::new()),
            chat: Arc::new(MockChatProvider::new()),
            real_verification: false,
        }
    }

    /// Codes go through the mock SMS service and must match.
    pub fn with_real_verification(mut self) -> Self {
        self.real_verification = true;
        self
    }

    /// Real verification over an SMS service that rejects every send.
    pub fn with_failing_sms(mut self) -> Self {
        self.sms = Arc::new(MockSmsService::failing());
        self.real_verification = true;
        self
    }

    pub fn server_deps(&self) -> ServerDeps {
        let verifier: Arc<dyn CodeVerifier> = if self.real_verification {
            Arc::new(RealVerifier::new(self.sms.clone()))
        } else {
            Arc::new(SimulatedVerifier)
        };
        ServerDeps::new(self.store.clone(), verifier, self.chat.clone())
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
