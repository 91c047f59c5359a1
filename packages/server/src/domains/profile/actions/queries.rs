//! Read-only profile lookups

use anyhow::Result;

use crate::common::{ApiError, ApiResult};
use crate::domains::auth::actions::require_verified_session;
use crate::domains::auth::models::PhoneIdentity;
use crate::domains::profile::models::{Profile, PublicProfile};
use crate::kernel::ServerDeps;

/// The caller's profile, if they created one.
pub async fn get_profile(session_id: &str, deps: &ServerDeps) -> ApiResult<Option<Profile>> {
    let identity = require_verified_session(session_id, deps).await?;
    Ok(deps.store.find_profile(&identity).await?)
}

/// The caller's profile, or `NotFound` for callers that need one to proceed.
pub async fn require_profile(session_id: &str, deps: &ServerDeps) -> ApiResult<Profile> {
    get_profile(session_id, deps)
        .await?
        .ok_or_else(|| ApiError::not_found("Profil non trouvé"))
}

/// Look someone up by phone number, in whatever format it was typed.
pub async fn search_by_phone(
    raw_phone: &str,
    raw_country_code: &str,
    deps: &ServerDeps,
) -> Result<Option<PublicProfile>> {
    let identity = PhoneIdentity::normalize(raw_phone, raw_country_code);
    if identity.phone().is_empty() {
        return Ok(None);
    }

    let profile = deps.store.find_profile(&identity).await?;
    Ok(profile.map(|p| p.public_view()))
}
