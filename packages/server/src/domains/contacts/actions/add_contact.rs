//! Add contact action

use chrono::Utc;
use tracing::info;

use crate::common::{ApiError, ApiResult};
use crate::domains::auth::models::PhoneIdentity;
use crate::domains::contacts::models::Contact;
use crate::domains::profile::actions::require_profile;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone)]
pub enum AddContactResult {
    Added(Contact),
    /// The edge was already there; this is the stored one.
    AlreadyAdded(Contact),
    /// The number resolves to the caller's own profile.
    SelfContact,
}

impl AddContactResult {
    pub fn contact(&self) -> Option<&Contact> {
        match self {
            Self::Added(contact) | Self::AlreadyAdded(contact) => Some(contact),
            Self::SelfContact => None,
        }
    }
}

/// Add the profile registered under `raw_phone` to the caller's contacts.
///
/// Fails with `NotFound` when the caller has no profile or nobody is
/// registered under that number.
pub async fn add_contact(
    session_id: &str,
    raw_phone: &str,
    raw_country_code: &str,
    deps: &ServerDeps,
) -> ApiResult<AddContactResult> {
    let owner = require_profile(session_id, deps).await?;

    let target = PhoneIdentity::normalize(raw_phone, raw_country_code);
    let contact = match target.phone() {
        "" => None,
        _ => deps.store.find_profile(&target).await?,
    };
    let Some(contact) = contact else {
        info!(owner = %owner.id, target = %target, "Contact has no profile");
        return Err(ApiError::not_found("Contact non trouvé"));
    };

    if contact.id == owner.id {
        return Ok(AddContactResult::SelfContact);
    }

    let candidate = Contact::new(&owner, &contact, Utc::now());
    let edge = deps.store.add_contact(&candidate).await?;

    if edge.id != candidate.id {
        return Ok(AddContactResult::AlreadyAdded(edge));
    }

    info!(
        owner = %owner.id,
        contact = %contact.id,
        edge = %edge.id,
        "Contact added"
    );
    Ok(AddContactResult::Added(edge))
}
