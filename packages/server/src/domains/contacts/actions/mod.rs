//! Contacts domain actions

mod add_contact;
mod queries;

pub use add_contact::{add_contact, AddContactResult};
pub use queries::list_contacts;
