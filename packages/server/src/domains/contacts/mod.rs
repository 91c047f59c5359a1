pub mod actions;
pub mod models;

pub use models::{Contact, ContactView};
