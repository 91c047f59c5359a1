//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container used by all domain
//! actions. All external services use trait abstractions to enable testing.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use stream_chat::models::{ChannelData, ChannelSummary, ChatUser};
use stream_chat::StreamChatClient;
use twilio::TwilioService;

use crate::domains::auth::CodeVerifier;
use crate::kernel::{BaseChatProvider, BaseSmsService, BaseStore};

/// Channels returned per listing request.
const CHANNEL_QUERY_LIMIT: u32 = 30;

// =============================================================================
// TwilioService Adapter (implements BaseSmsService trait)
// =============================================================================

/// Wrapper around TwilioService that implements BaseSmsService trait
pub struct TwilioAdapter(pub Arc<TwilioService>);

impl TwilioAdapter {
    pub fn new(service: Arc<TwilioService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseSmsService for TwilioAdapter {
    async fn send_sms(&self, to: &str, body: &str) -> Result<()> {
        self.0
            .send_sms(to, body)
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("{}", e))
    }
}

// =============================================================================
// StreamChatClient Adapter (implements BaseChatProvider trait)
// =============================================================================

pub struct StreamChatAdapter(pub Arc<StreamChatClient>);

impl StreamChatAdapter {
    pub fn new(client: Arc<StreamChatClient>) -> Self {
        Self(client)
    }
}

#[async_trait]
impl BaseChatProvider for StreamChatAdapter {
    fn api_key(&self) -> &str {
        self.0.api_key()
    }

    fn issue_token(&self, user_id: &str) -> Result<String> {
        self.0.create_user_token(user_id, None).map_err(Into::into)
    }

    async fn upsert_user(&self, user: &ChatUser) -> Result<()> {
        self.0.upsert_user(user).await.map_err(Into::into)
    }

    async fn create_channel(
        &self,
        channel_type: &str,
        channel_id: &str,
        data: &ChannelData,
    ) -> Result<ChannelSummary> {
        self.0
            .create_channel(channel_type, channel_id, data)
            .await
            .map_err(Into::into)
    }

    async fn query_channels(&self, user_id: &str) -> Result<Vec<ChannelSummary>> {
        self.0
            .query_channels(user_id, CHANNEL_QUERY_LIMIT)
            .await
            .map_err(Into::into)
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to actions (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseStore>,
    /// Decides how codes are delivered and whether they must match.
    pub verifier: Arc<dyn CodeVerifier>,
    pub chat: Arc<dyn BaseChatProvider>,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BaseStore>,
        verifier: Arc<dyn CodeVerifier>,
        chat: Arc<dyn BaseChatProvider>,
    ) -> Self {
        Self {
            store,
            verifier,
            chat,
        }
    }
}
