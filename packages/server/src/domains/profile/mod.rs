//! Profile domain - the user record bound to a verified identity
//!
//! One profile per normalized phone identity. Created and edited only
//! through a verified session for that identity.

pub mod actions;
pub mod models;
