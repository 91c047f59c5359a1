//! Update profile action

use chrono::Utc;
use tracing::info;

use crate::common::{ApiError, ApiResult};
use crate::domains::auth::actions::require_verified_session;
use crate::domains::profile::models::{Profile, ProfileChanges};
use crate::kernel::ServerDeps;

/// Merge `changes` into the caller's profile.
///
/// Fails with `NotFound` when the identity has not created a profile yet.
pub async fn update_profile(
    session_id: &str,
    changes: ProfileChanges,
    deps: &ServerDeps,
) -> ApiResult<Profile> {
    let identity = require_verified_session(session_id, deps).await?;
    let mut profile = deps
        .store
        .find_profile(&identity)
        .await?
        .ok_or_else(|| ApiError::not_found("Profil non trouvé"))?;

    profile.apply(changes, Utc::now());
    let profile = deps.store.update_profile(&profile).await?;

    info!(identity = %identity, profile_id = %profile.id, "Profile updated");
    Ok(profile)
}
