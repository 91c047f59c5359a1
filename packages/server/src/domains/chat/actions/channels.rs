use serde_json::{Map, Value};
use stream_chat::models::{ChannelData, ChannelSummary};
use tracing::info;
use uuid::Uuid;

use crate::common::ApiResult;
use crate::domains::chat::{as_chat_member, chat_user_id};
use crate::domains::profile::actions::require_profile;
use crate::kernel::ServerDeps;

/// Channel type used for tontine group chats.
const TONTINE_CHANNEL_TYPE: &str = "team";

#[derive(Debug, Clone, Default)]
pub struct ChannelRequest {
    pub channel_type: String,
    pub channel_id: Option<String>,
    pub channel_name: Option<String>,
    /// Profile ids or chat user ids; the caller is added regardless.
    pub members: Vec<String>,
    pub tontine_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreatedChannel {
    pub channel_id: String,
    pub channel_type: String,
}

impl ChannelRequest {
    /// Explicit id, then the tontine's channel, then a fresh one.
    fn resolve_id(&self) -> String {
        let given = self.channel_id.as_deref().map(str::trim).unwrap_or("");
        if !given.is_empty() {
            return given.to_string();
        }
        match self.tontine_id.as_deref().map(str::trim) {
            Some(tontine) if !tontine.is_empty() => format!("tontine_{}", tontine),
            _ => format!("channel_{}", Uuid::new_v4().simple()),
        }
    }

    fn resolve_type(&self) -> String {
        match self.channel_type.trim() {
            "" if self.tontine_id.is_some() => TONTINE_CHANNEL_TYPE.to_string(),
            "" => "messaging".to_string(),
            other => other.to_string(),
        }
    }
}

/// Create (or join) a channel with the caller as creator and member.
pub async fn create_channel(
    session_id: &str,
    request: ChannelRequest,
    deps: &ServerDeps,
) -> ApiResult<CreatedChannel> {
    let profile = require_profile(session_id, deps).await?;
    let caller = chat_user_id(profile.id);

    let mut members = vec![caller.clone()];
    for member in request.members.iter().filter(|m| !m.trim().is_empty()) {
        let member = as_chat_member(member);
        if !members.contains(&member) {
            members.push(member);
        }
    }

    let mut extra = Map::new();
    if let Some(tontine_id) = &request.tontine_id {
        extra.insert("tontine_id".to_string(), Value::String(tontine_id.clone()));
    }

    let channel_type = request.resolve_type();
    let channel_id = request.resolve_id();
    let data = ChannelData {
        created_by_id: caller,
        members,
        name: request.channel_name.clone(),
        extra,
    };

    let channel = deps
        .chat
        .create_channel(&channel_type, &channel_id, &data)
        .await?;

    info!(
        profile_id = %profile.id,
        cid = %channel.cid,
        members = data.members.len(),
        "Chat channel created"
    );

    Ok(CreatedChannel {
        channel_id: channel.id,
        channel_type: channel.channel_type,
    })
}

/// Channels the caller belongs to.
pub async fn list_channels(session_id: &str, deps: &ServerDeps) -> ApiResult<Vec<ChannelSummary>> {
    let profile = require_profile(session_id, deps).await?;
    let channels = deps.chat.query_channels(&chat_user_id(profile.id)).await?;
    Ok(channels)
}
