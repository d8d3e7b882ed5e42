//! Bearer token to request identity.

use std::sync::Arc;

use tracing::debug;

use guardpost_core::error::AppError;
use guardpost_database::UserRepository;

use crate::context::RequestContext;
use crate::jwt::JwtDecoder;

/// Message when the token verifies but the user row is gone.
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found. Authorization denied.";

/// Message when the user exists but is not `active`.
pub const INACTIVE_ACCOUNT_MESSAGE: &str = "Account is not active. Access denied.";

/// Resolves an access token into a [`RequestContext`].
///
/// The user row is reloaded on every call, so suspension and role
/// changes apply to tokens that are already issued.
#[derive(Clone)]
pub struct Authenticator {
    decoder: Arc<JwtDecoder>,
    users: Arc<dyn UserRepository>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Creates a new authenticator.
    pub fn new(decoder: Arc<JwtDecoder>, users: Arc<dyn UserRepository>) -> Self {
        Self { decoder, users }
    }

    /// Verifies `token` and loads the active user it names.
    pub async fn authenticate(&self, token: &str) -> Result<RequestContext, AppError> {
        let claims = self.decoder.verify_access(token)?;

        let user = self
            .users
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| AppError::unauthenticated(USER_NOT_FOUND_MESSAGE))?;

        if !user.is_active() {
            debug!(user_id = %user.id, status = %user.status, "Inactive account presented a token");
            return Err(AppError::forbidden(INACTIVE_ACCOUNT_MESSAGE));
        }

        Ok(RequestContext::new(&user, claims.sid))
    }
}
