// HTTP routes
pub mod auth;
pub mod chat;
pub mod health;
pub mod profile;
pub mod users;

pub use auth::*;
pub use chat::*;
pub use health::*;
pub use profile::*;
pub use users::*;
