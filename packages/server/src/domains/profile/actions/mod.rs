//! Profile domain actions

mod create_profile;
mod queries;
mod update_profile;

pub use create_profile::{create_profile, CreateProfileResult};
pub use queries::{get_profile, require_profile, search_by_phone};
pub use update_profile::update_profile;
