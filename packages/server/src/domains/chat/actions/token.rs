use stream_chat::models::ChatUser;
use tracing::info;

use crate::common::ApiResult;
use crate::domains::chat::chat_user_id;
use crate::domains::profile::actions::require_profile;
use crate::kernel::ServerDeps;

/// Everything a client needs to connect to the chat provider.
#[derive(Debug, Clone)]
pub struct ChatToken {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub api_key: String,
}

/// Register the caller with the chat provider and hand back a user token.
pub async fn issue_chat_token(session_id: &str, deps: &ServerDeps) -> ApiResult<ChatToken> {
    let profile = require_profile(session_id, deps).await?;
    let user_id = chat_user_id(profile.id);
    let username = profile.display_name();

    let mut user = ChatUser::new(&user_id).with_name(&username);
    user.image = profile.profile_photo.clone();
    deps.chat.upsert_user(&user).await?;

    let token = deps.chat.issue_token(&user_id)?;
    info!(profile_id = %profile.id, "Chat token issued");

    Ok(ChatToken {
        token,
        user_id,
        username,
        api_key: deps.chat.api_key().to_string(),
    })
}
