//! Typed IDs for the persisted entities.

pub use super::id::Id;

/// Marker type for user profiles.
pub struct Profile;

/// Marker type for contact edges.
pub struct ContactEdge;

pub type ProfileId = Id<Profile>;

pub type ContactId = Id<ContactEdge>;
