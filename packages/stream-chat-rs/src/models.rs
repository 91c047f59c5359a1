use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A chat user as Stream stores it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatUser {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    /// Custom fields are stored flat on the user object.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_role() -> String {
    "user".to_string()
}

impl ChatUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            image: None,
            role: default_role(),
            extra: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Data sent when creating (or fetching) a channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelData {
    pub created_by_id: String,
    pub members: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The subset of channel state callers care about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub channel_type: String,
    pub cid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub member_count: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelStateResponse {
    pub channel: ChannelSummary,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryChannelsResponse {
    #[serde(default)]
    pub channels: Vec<ChannelStateResponse>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
