//! Auth domain - phone verification sessions
//!
//! Responsibilities:
//! - Phone identity normalization (the lookup key for everything else)
//! - Verification sessions: issue, verify, expire
//! - Resolving a session id to the identity that owns it

pub mod actions;
pub mod models;
pub mod verifier;

pub use models::PhoneIdentity;
pub use verifier::{CodeVerifier, RealVerifier, SimulatedVerifier};
