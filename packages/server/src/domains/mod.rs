// Business domains
pub mod auth;
pub mod chat;
pub mod contacts;
pub mod profile;
