//! Route definitions for the GuardPost HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(profile_routes())
        .merge(session_routes())
        .merge(user_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Public auth endpoints: register, login, refresh, logout, password reset
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/request-reset", post(handlers::auth::request_reset))
        .route("/auth/reset-password", post(handlers::auth::reset_password))
}

/// Caller's own profile and password
fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/auth/profile",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        .route("/auth/password", put(handlers::profile::change_password))
}

/// Caller's refresh sessions
fn session_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/settings/sessions",
            get(handlers::sessions::list_sessions)
                .delete(handlers::sessions::revoke_other_sessions),
        )
        .route(
            "/settings/sessions/{id}",
            delete(handlers::sessions::revoke_session),
        )
}

/// User management
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/{id}",
            get(handlers::users::get_user).delete(handlers::users::delete_user),
        )
        .route("/users/{id}/status", put(handlers::users::update_status))
        .route(
            "/users/{id}/permissions",
            put(handlers::users::update_permissions),
        )
}

/// Health checks
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
