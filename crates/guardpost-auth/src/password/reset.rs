//! Password reset: request a single-use token, then redeem it.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use guardpost_core::config::AuthConfig;
use guardpost_core::error::AppError;
use guardpost_database::UserRepository;

use super::hasher::PasswordHasher;
use crate::token::{RESET_TOKEN_BYTES, generate_token, hash_token};

/// Message for a reset token that is unknown, consumed, or expired.
pub const INVALID_RESET_TOKEN_MESSAGE: &str = "Invalid or expired reset token.";

/// Outcome of a reset request.
///
/// The token is only present when exposure is enabled and the email
/// belonged to an account. Callers must respond identically either way.
#[derive(Debug, Clone, Default)]
pub struct ResetRequest {
    /// Plain reset token, for development setups without email delivery.
    pub reset_token: Option<String>,
}

/// Issues and redeems password reset tokens.
#[derive(Clone)]
pub struct PasswordResetFlow {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    ttl: Duration,
    expose_token: bool,
}

impl std::fmt::Debug for PasswordResetFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordResetFlow")
            .field("ttl", &self.ttl)
            .field("expose_token", &self.expose_token)
            .finish_non_exhaustive()
    }
}

impl PasswordResetFlow {
    /// Creates the flow from auth configuration.
    pub fn new(users: Arc<dyn UserRepository>, hasher: PasswordHasher, config: &AuthConfig) -> Self {
        Self {
            users,
            hasher,
            ttl: Duration::minutes(config.reset_token_ttl_minutes as i64),
            expose_token: config.expose_reset_token,
        }
    }

    /// Starts a reset for `email`.
    ///
    /// Unknown emails succeed without side effects. A new request replaces
    /// any token issued before it.
    pub async fn request_reset(&self, email: &str) -> Result<ResetRequest, AppError> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.users.find_by_email(&email).await? else {
            debug!("Password reset requested for unknown email");
            return Ok(ResetRequest::default());
        };

        let token = generate_token(RESET_TOKEN_BYTES);
        let expires_at = Utc::now() + self.ttl;
        self.users
            .set_reset_token(user.id, &hash_token(&token), expires_at)
            .await?;

        // Delivery is out of band; the token itself is never logged.
        info!(user_id = %user.id, %expires_at, "Password reset token issued");

        Ok(ResetRequest {
            reset_token: self.expose_token.then_some(token),
        })
    }

    /// Redeems `token`, setting `new_password` and revoking every session
    /// of the account.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        if token.is_empty() {
            return Err(AppError::invalid_reset_token(INVALID_RESET_TOKEN_MESSAGE));
        }

        let token_hash = hash_token(token);
        // Cheap pre-check so a bad token does not pay for hashing.
        if self.users.find_by_reset_token(&token_hash).await?.is_none() {
            return Err(AppError::invalid_reset_token(INVALID_RESET_TOKEN_MESSAGE));
        }

        let password_hash = self.hasher.hash(new_password).await?;
        if !self
            .users
            .complete_password_reset(&token_hash, &password_hash)
            .await?
        {
            return Err(AppError::invalid_reset_token(INVALID_RESET_TOKEN_MESSAGE));
        }

        info!("Password reset completed");
        Ok(())
    }
}
