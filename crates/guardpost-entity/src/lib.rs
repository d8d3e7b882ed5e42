//! # guardpost-entity
//!
//! Domain entity models for GuardPost. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`.

pub mod permission;
pub mod session;
pub mod user;
