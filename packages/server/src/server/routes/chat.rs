use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::{Deserialize, Serialize};
use stream_chat::models::ChannelSummary;

use crate::common::ApiResult;
use crate::domains::chat::actions::{self, ChannelRequest};
use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatTokenRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatTokenResponse {
    pub success: bool,
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub stream_api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateChannelRequest {
    pub session_id: String,
    #[serde(default)]
    pub channel_type: String,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub channel_name: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub tontine_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateChannelResponse {
    pub success: bool,
    pub channel_id: String,
    pub channel_type: String,
}

#[derive(Debug, Serialize)]
pub struct ChannelsResponse {
    pub success: bool,
    pub channels: Vec<ChannelSummary>,
}

/// POST /api/chat/token
pub async fn chat_token_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<ChatTokenRequest>,
) -> ApiResult<Json<ChatTokenResponse>> {
    let issued = actions::issue_chat_token(&request.session_id, &state.deps).await?;
    Ok(Json(ChatTokenResponse {
        success: true,
        token: issued.token,
        user_id: issued.user_id,
        username: issued.username,
        stream_api_key: issued.api_key,
    }))
}

/// POST /api/chat/channel
pub async fn chat_channel_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<CreateChannelRequest>,
) -> ApiResult<Json<CreateChannelResponse>> {
    let channel_request = ChannelRequest {
        channel_type: request.channel_type,
        channel_id: request.channel_id,
        channel_name: request.channel_name,
        members: request.members,
        tontine_id: request.tontine_id,
    };
    let created = actions::create_channel(&request.session_id, channel_request, &state.deps).await?;
    Ok(Json(CreateChannelResponse {
        success: true,
        channel_id: created.channel_id,
        channel_type: created.channel_type,
    }))
}

/// GET /api/chat/channels/:session_id
pub async fn chat_channels_handler(
    Extension(state): Extension<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ChannelsResponse>> {
    let channels = actions::list_channels(&session_id, &state.deps).await?;
    Ok(Json(ChannelsResponse {
        success: true,
        channels,
    }))
}
