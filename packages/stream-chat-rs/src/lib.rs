//! Server-side client for the Stream Chat REST API.
//!
//! Covers the calls a backend needs: user tokens, user upserts, channel
//! creation and membership queries. Requests are authenticated with a
//! server token signed from the API secret.

use std::collections::HashMap;

pub mod models;

use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::models::{
    ApiErrorBody, ChannelData, ChannelStateResponse, ChannelSummary, ChatUser,
    QueryChannelsResponse,
};

const DEFAULT_BASE_URL: &str = "https://chat.stream-io-api.com";

#[derive(Debug, Error)]
pub enum StreamChatError {
    #[error("failed to sign token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("request to Stream failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Stream returned {status}: {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, StreamChatError>;

#[derive(Debug, Clone)]
pub struct StreamChatOptions {
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Serialize)]
struct UserClaims<'a> {
    user_id: &'a str,
    iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

#[derive(Serialize)]
struct ServerClaims {
    server: bool,
}

#[derive(Clone)]
pub struct StreamChatClient {
    options: StreamChatOptions,
    encoding_key: EncodingKey,
    client: Client,
    base_url: String,
}

impl StreamChatClient {
    pub fn new(options: StreamChatOptions) -> Self {
        let encoding_key = EncodingKey::from_secret(options.api_secret.as_bytes());
        Self {
            options,
            encoding_key,
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.options.api_key
    }

    /// Sign a token a mobile client uses to connect as `user_id`.
    pub fn create_user_token(&self, user_id: &str, exp: Option<i64>) -> Result<String> {
        let claims = UserClaims {
            user_id,
            iat: chrono::Utc::now().timestamp(),
            exp,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    fn server_token(&self) -> Result<String> {
        Ok(encode(
            &Header::default(),
            &ServerClaims { server: true },
            &self.encoding_key,
        )?)
    }

    fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        Ok(builder
            .query(&[("api_key", self.options.api_key.as_str())])
            .header("Authorization", self.server_token()?)
            .header("stream-auth-type", "jwt"))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = self.authed(builder)?.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&raw)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or(raw);
        error!(status = status.as_u16(), %message, "Stream returned an error");
        Err(StreamChatError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Create or replace a user.
    pub async fn upsert_user(&self, user: &ChatUser) -> Result<()> {
        let mut users = HashMap::new();
        users.insert(user.id.as_str(), user);

        let url = format!("{}/users", self.base_url);
        self.send(self.client.post(url).json(&json!({ "users": users })))
            .await?;
        debug!(user_id = %user.id, "Upserted chat user");
        Ok(())
    }

    /// Get-or-create a channel with the given id.
    pub async fn create_channel(
        &self,
        channel_type: &str,
        channel_id: &str,
        data: &ChannelData,
    ) -> Result<ChannelSummary> {
        let url = format!(
            "{}/channels/{}/{}/query",
            self.base_url, channel_type, channel_id
        );
        let body = json!({ "data": data, "state": false });
        let response = self.send(self.client.post(url).json(&body)).await?;
        let state = response.json::<ChannelStateResponse>().await?;
        debug!(cid = %state.channel.cid, "Channel ready");
        Ok(state.channel)
    }

    /// Channels `user_id` is a member of, most recently active first.
    pub async fn query_channels(&self, user_id: &str, limit: u32) -> Result<Vec<ChannelSummary>> {
        let url = format!("{}/channels", self.base_url);
        let body = json!({
            "filter_conditions": { "members": { "$in": [user_id] } },
            "sort": [{ "field": "last_message_at", "direction": -1 }],
            "limit": limit,
            "user_id": user_id,
            "state": true,
        });
        let response = self.send(self.client.post(url).json(&body)).await?;
        let parsed = response.json::<QueryChannelsResponse>().await?;
        Ok(parsed.channels.into_iter().map(|c| c.channel).collect())
    }
}
