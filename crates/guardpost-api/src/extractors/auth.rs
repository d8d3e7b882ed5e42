//! `AuthUser` extractor: pulls the bearer token from the Authorization
//! header and resolves it into a [`RequestContext`].

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, Header};

use guardpost_auth::RequestContext;
use guardpost_core::error::AppError;

use crate::state::AppState;

/// Message for a missing or non-bearer Authorization header.
pub const NO_TOKEN_MESSAGE: &str = "No token provided. Authorization denied.";

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = Authorization::<Bearer>::decode(&mut parts.headers.get_all(AUTHORIZATION).iter())
            .map_err(|_| AppError::unauthenticated(NO_TOKEN_MESSAGE))?;

        let ctx = state.authenticator.authenticate(bearer.token()).await?;

        Ok(AuthUser(ctx))
    }
}
