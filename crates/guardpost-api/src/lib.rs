//! # guardpost-api
//!
//! HTTP API layer for GuardPost built on Axum.
//!
//! Provides the auth, profile, session and user management endpoints,
//! the `AuthUser` extractor, RBAC guards, DTOs, CORS and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::AppState;
