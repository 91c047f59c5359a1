use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::{ApiResult, ProfileId};
use crate::domains::chat::chat_user_id;
use crate::domains::contacts::actions::{self as contact_actions, AddContactResult};
use crate::domains::contacts::models::ContactView;
use crate::domains::profile::actions::search_by_phone;
use crate::domains::profile::models::PublicProfile;
use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchUserRequest {
    pub phone: String,
    pub country_code: String,
}

/// A search hit. `user_id` is the chat user id, ready to pass as a channel
/// member.
#[derive(Debug, Serialize)]
pub struct UserData {
    #[serde(flatten)]
    pub profile: PublicProfile,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct SearchUserResponse {
    pub success: bool,
    pub message: String,
    pub user_found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<UserData>,
}

#[derive(Debug, Deserialize)]
pub struct AddContactRequest {
    pub session_id: String,
    pub contact_phone: String,
    pub contact_country_code: String,
}

#[derive(Debug, Serialize)]
pub struct AddContactResponse {
    pub success: bool,
    pub message: String,
    /// Profile id of the contact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<ProfileId>,
}

#[derive(Debug, Serialize)]
pub struct ContactsResponse {
    pub success: bool,
    pub contacts: Vec<ContactView>,
}

/// POST /api/users/search
pub async fn search_user_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<SearchUserRequest>,
) -> ApiResult<Json<SearchUserResponse>> {
    let found = search_by_phone(&request.phone, &request.country_code, &state.deps).await?;
    let response = match found {
        Some(profile) => SearchUserResponse {
            success: true,
            message: "Utilisateur trouvé".to_string(),
            user_found: true,
            user_data: Some(UserData {
                user_id: chat_user_id(profile.id),
                profile,
            }),
        },
        None => SearchUserResponse {
            success: true,
            message: "Utilisateur non trouvé".to_string(),
            user_found: false,
            user_data: None,
        },
    };
    Ok(Json(response))
}

/// POST /api/users/add-contact
pub async fn add_contact_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<AddContactRequest>,
) -> ApiResult<Json<AddContactResponse>> {
    let result = contact_actions::add_contact(
        &request.session_id,
        &request.contact_phone,
        &request.contact_country_code,
        &state.deps,
    )
    .await?;

    let (success, message) = match &result {
        AddContactResult::Added(_) => (true, "Contact ajouté avec succès"),
        AddContactResult::AlreadyAdded(_) => (true, "Contact déjà ajouté"),
        AddContactResult::SelfContact => {
            (false, "Vous ne pouvez pas vous ajouter comme contact")
        }
    };

    Ok(Json(AddContactResponse {
        success,
        message: message.to_string(),
        contact_id: result.contact().map(|c| c.contact_id),
    }))
}

/// GET /api/users/contacts/:session_id
pub async fn contacts_handler(
    Extension(state): Extension<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ContactsResponse>> {
    let contacts = contact_actions::list_contacts(&session_id, &state.deps).await?;
    Ok(Json(ContactsResponse {
        success: true,
        contacts,
    }))
}
