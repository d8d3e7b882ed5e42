//! JWT token creation with per-class secrets and TTLs.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use guardpost_core::config::AuthConfig;
use guardpost_core::error::AppError;
use guardpost_entity::user::UserRole;

use super::claims::{AccessClaims, RefreshClaims, TokenType};

/// A signed token together with its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The compact JWT string.
    pub token: String,
    /// When the token stops verifying.
    pub expires_at: DateTime<Utc>,
}

/// Creates signed access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    access_key: EncodingKey,
    refresh_key: EncodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_key: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_key: EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            access_ttl: Duration::minutes(config.access_token_ttl_minutes as i64),
            refresh_ttl: Duration::hours(config.refresh_token_ttl_hours as i64),
        }
    }

    /// Lifetime of refresh tokens (and of the sessions that back them).
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issues an access token for `user_id` with `role`.
    pub fn issue_access(
        &self,
        user_id: Uuid,
        role: UserRole,
        session_id: Option<Uuid>,
    ) -> Result<IssuedToken, AppError> {
        self.issue_access_at(user_id, role, session_id, Utc::now())
    }

    /// Issues an access token as if the current time were `now`.
    pub fn issue_access_at(
        &self,
        user_id: Uuid,
        role: UserRole,
        session_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        let expires_at = now + self.access_ttl;
        let claims = AccessClaims {
            sub: user_id,
            role,
            sid: session_id,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            typ: TokenType::Access,
        };

        let token = encode(&Header::default(), &claims, &self.access_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Issues a refresh token for `user_id`.
    pub fn issue_refresh(&self, user_id: Uuid) -> Result<IssuedToken, AppError> {
        self.issue_refresh_at(user_id, Utc::now())
    }

    /// Issues a refresh token as if the current time were `now`.
    pub fn issue_refresh_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        let expires_at = now + self.refresh_ttl;
        let claims = RefreshClaims {
            sub: user_id,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            typ: TokenType::Refresh,
        };

        let token = encode(&Header::default(), &claims, &self.refresh_key)
            .map_err(|e| AppError::internal(format!("Failed to encode refresh token: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }
}
