use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::ApiResult;
use crate::domains::profile::actions::{self, CreateProfileResult};
use crate::domains::profile::models::{NewProfile, Profile, ProfileChanges};
use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

impl ProfileResponse {
    fn with(message: &str, profile: Profile) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            profile: Some(profile),
        }
    }

    fn without(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            profile: None,
        }
    }
}

/// POST /api/profile/create?session_id=...
pub async fn create_profile_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<SessionQuery>,
    Json(fields): Json<NewProfile>,
) -> ApiResult<Json<ProfileResponse>> {
    let response = match actions::create_profile(&query.session_id, fields, &state.deps).await? {
        CreateProfileResult::Created(profile) => {
            ProfileResponse::with("Profil créé avec succès", profile)
        }
        CreateProfileResult::AlreadyExists => {
            ProfileResponse::without("Un profil existe déjà pour ce numéro")
        }
    };
    Ok(Json(response))
}

/// GET /api/profile/:session_id
pub async fn get_profile_handler(
    Extension(state): Extension<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let response = match actions::get_profile(&session_id, &state.deps).await? {
        Some(profile) => ProfileResponse::with("Profil trouvé", profile),
        None => ProfileResponse::without("Profil non trouvé"),
    };
    Ok(Json(response))
}

/// PUT /api/profile/:session_id
pub async fn update_profile_handler(
    Extension(state): Extension<AppState>,
    Path(session_id): Path<String>,
    Json(changes): Json<ProfileChanges>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = actions::update_profile(&session_id, changes, &state.deps).await?;
    Ok(Json(ProfileResponse::with(
        "Profil mis à jour avec succès",
        profile,
    )))
}
