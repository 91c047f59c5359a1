//! Chat domain - provider-backed messaging keyed by profile
//!
//! Profiles map onto chat users as `user_{profile_id}`. Channels live in the
//! provider; nothing chat-related is persisted locally.

pub mod actions;

use crate::common::ProfileId;

const CHAT_USER_PREFIX: &str = "user_";

/// Chat user id for a profile.
pub fn chat_user_id(profile_id: ProfileId) -> String {
    format!("{}{}", CHAT_USER_PREFIX, profile_id)
}

/// Accepts either a bare profile id or an already-prefixed chat user id.
pub fn as_chat_member(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with(CHAT_USER_PREFIX) {
        raw.to_string()
    } else {
        format!("{}{}", CHAT_USER_PREFIX, raw)
    }
}
