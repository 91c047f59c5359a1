//! Create profile action

use chrono::Utc;
use tracing::info;

use crate::common::ApiResult;
use crate::domains::auth::actions::require_verified_session;
use crate::domains::profile::models::{NewProfile, Profile};
use crate::kernel::ServerDeps;

/// Result of creating a profile
#[derive(Debug, Clone)]
pub enum CreateProfileResult {
    Created(Profile),
    /// The identity already owns a profile; nothing was written.
    AlreadyExists,
}

/// Create the profile for the identity behind `session_id`.
pub async fn create_profile(
    session_id: &str,
    fields: NewProfile,
    deps: &ServerDeps,
) -> ApiResult<CreateProfileResult> {
    let identity = require_verified_session(session_id, deps).await?;
    let profile = Profile::new(&identity, fields, Utc::now());

    match deps.store.insert_profile(&profile).await? {
        Some(profile) => {
            info!(identity = %identity, profile_id = %profile.id, "Profile created");
            Ok(CreateProfileResult::Created(profile))
        }
        None => {
            info!(identity = %identity, "Profile already exists");
            Ok(CreateProfileResult::AlreadyExists)
        }
    }
}
