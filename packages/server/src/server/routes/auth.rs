//! Phone verification endpoints.
//!
//! Business failures (bad code, no session, expiry) are 200 responses with
//! `success: false`; only unexpected failures become 500s.

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::common::ApiResult;
use crate::domains::auth::actions::{self, SessionCheck, VerifyCodeResult};
use crate::domains::auth::models::PhoneIdentity;
use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub phone: String,
    pub country_code: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub phone: String,
    pub country_code: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl AuthResponse {
    fn ok(message: &str, session_id: String) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            session_id: Some(session_id),
        }
    }

    fn failed(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            session_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckSessionResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckSessionResponse {
    fn invalid(message: &str) -> Self {
        Self {
            valid: false,
            phone: None,
            country_code: None,
            message: Some(message.to_string()),
        }
    }
}

/// POST /api/auth/send-code
pub async fn send_code_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<SendCodeRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let identity = PhoneIdentity::normalize(&request.phone, &request.country_code);
    let sent = actions::send_code(identity, &state.deps).await?;
    Ok(Json(AuthResponse::ok(
        "Code de vérification envoyé",
        sent.session_id,
    )))
}

/// POST /api/auth/verify-code
pub async fn verify_code_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<VerifyCodeRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let identity = PhoneIdentity::normalize(&request.phone, &request.country_code);
    let response = match actions::verify_code(identity, &request.code, &state.deps).await? {
        VerifyCodeResult::Verified { session_id } => {
            AuthResponse::ok("Connexion réussie", session_id)
        }
        VerifyCodeResult::InvalidFormat => {
            AuthResponse::failed("Le code doit contenir exactement 6 chiffres")
        }
        VerifyCodeResult::SessionNotFound => {
            AuthResponse::failed("Session non trouvée ou expirée")
        }
        VerifyCodeResult::SessionExpired => {
            AuthResponse::failed("Code expiré, veuillez demander un nouveau code")
        }
        VerifyCodeResult::InvalidCode => AuthResponse::failed("Code de vérification incorrect"),
    };
    Ok(Json(response))
}

/// GET /api/auth/check-session/:session_id
///
/// Never fails: store errors are reported as an invalid session.
pub async fn check_session_handler(
    Extension(state): Extension<AppState>,
    Path(session_id): Path<String>,
) -> Json<CheckSessionResponse> {
    let response = match actions::check_session(&session_id, &state.deps).await {
        Ok(SessionCheck::Valid(identity)) => CheckSessionResponse {
            valid: true,
            phone: Some(identity.phone().to_string()),
            country_code: Some(identity.country_code().to_string()),
            message: None,
        },
        Ok(SessionCheck::Invalid) => CheckSessionResponse::invalid("Session invalide"),
        Ok(SessionCheck::Expired) => CheckSessionResponse::invalid("Session expirée"),
        Err(e) => {
            error!(error = %e, "Session check failed");
            CheckSessionResponse::invalid("Erreur serveur")
        }
    };
    Json(response)
}
