use crate::common::ApiResult;
use crate::domains::contacts::models::{Contact, ContactView};
use crate::domains::profile::actions::require_profile;
use crate::kernel::ServerDeps;

/// The caller's contacts, most recently added first.
pub async fn list_contacts(session_id: &str, deps: &ServerDeps) -> ApiResult<Vec<ContactView>> {
    let owner = require_profile(session_id, deps).await?;
    let contacts = deps.store.list_contacts(owner.id).await?;
    Ok(contacts.iter().map(Contact::view).collect())
}
