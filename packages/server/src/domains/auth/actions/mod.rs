//! Auth domain actions - business logic functions
//!
//! Called directly from the HTTP handlers in `server::routes::auth`.

mod check_session;
mod send_code;
mod verify_code;

pub use check_session::{check_session, require_verified_session, SessionCheck};
pub use send_code::{send_code, CodeSent};
pub use verify_code::{verify_code, VerifyCodeResult};

#[cfg(test)]
mod tests;
