//! HTTP handlers grouped by resource.

pub mod auth;
pub mod health;
pub mod profile;
pub mod sessions;
pub mod users;
