//! Session validity checks and identity resolution

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::common::ApiError;
use crate::domains::auth::models::PhoneIdentity;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCheck {
    Valid(PhoneIdentity),
    /// Unknown id, or a session that was never verified.
    Invalid,
    /// Verified more than 24 hours ago; deleted as a side effect.
    Expired,
}

pub async fn check_session(session_id: &str, deps: &ServerDeps) -> Result<SessionCheck> {
    let Some(session) = deps.store.find_verified_session(session_id).await? else {
        return Ok(SessionCheck::Invalid);
    };

    if session.is_verified_window_over(Utc::now()) {
        deps.store.delete_session(&session.id).await?;
        info!(session_id, "Verified session expired, deleted");
        return Ok(SessionCheck::Expired);
    }

    Ok(SessionCheck::Valid(session.identity()))
}

/// Resolve the identity behind a session id or fail with `Unauthorized`.
pub async fn require_verified_session(
    session_id: &str,
    deps: &ServerDeps,
) -> Result<PhoneIdentity, ApiError> {
    match check_session(session_id, deps).await? {
        SessionCheck::Valid(identity) => Ok(identity),
        SessionCheck::Invalid | SessionCheck::Expired => Err(ApiError::Unauthorized),
    }
}
