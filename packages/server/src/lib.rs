// Tontine - API Core
//
// Backend for the tontine app: phone-number sign-in, user profiles, contacts
// and the chat provider integration. Every lookup is keyed by the normalized
// phone identity.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
