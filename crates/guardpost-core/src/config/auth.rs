//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Credential, token and password reset configuration.
///
/// Defaults are for local development only; deployments override both
/// secrets through `GUARDPOST__AUTH__ACCESS_TOKEN_SECRET` and
/// `GUARDPOST__AUTH__REFRESH_TOKEN_SECRET`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 secret for access tokens.
    #[serde(default = "default_access_secret")]
    pub access_token_secret: String,
    /// HMAC-SHA256 secret for refresh tokens. Must differ from the access secret.
    #[serde(default = "default_refresh_secret")]
    pub refresh_token_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: u64,
    /// Refresh token (and refresh session) TTL in hours.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_hours: u64,
    /// Argon2 time cost (iterations).
    #[serde(default = "default_hash_cost")]
    pub password_hash_cost: u32,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_hash_memory")]
    pub password_hash_memory_kib: u32,
    /// Lifetime of a password reset token in minutes.
    #[serde(default = "default_reset_ttl")]
    pub reset_token_ttl_minutes: u64,
    /// Return the raw reset token in the request-reset response.
    /// Never enable outside local development.
    #[serde(default)]
    pub expose_reset_token: bool,
    /// Issue a new refresh token on every refresh and revoke the old one.
    #[serde(default)]
    pub rotate_refresh_tokens: bool,
}

impl AuthConfig {
    /// Reject configurations that would make the two token classes
    /// interchangeable or the hasher unusable.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.access_token_secret.is_empty() || self.refresh_token_secret.is_empty() {
            return Err(AppError::configuration("Token secrets must not be empty"));
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err(AppError::configuration(
                "Access and refresh token secrets must differ",
            ));
        }
        if self.password_hash_cost == 0 {
            return Err(AppError::configuration(
                "password_hash_cost must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: default_access_secret(),
            refresh_token_secret: default_refresh_secret(),
            access_token_ttl_minutes: default_access_ttl(),
            refresh_token_ttl_hours: default_refresh_ttl(),
            password_hash_cost: default_hash_cost(),
            password_hash_memory_kib: default_hash_memory(),
            reset_token_ttl_minutes: default_reset_ttl(),
            expose_reset_token: false,
            rotate_refresh_tokens: false,
        }
    }
}

fn default_access_secret() -> String {
    "CHANGE_ME_ACCESS_SECRET".to_string()
}

fn default_refresh_secret() -> String {
    "CHANGE_ME_REFRESH_SECRET".to_string()
}

fn default_access_ttl() -> u64 {
    7 * 24 * 60
}

fn default_refresh_ttl() -> u64 {
    30 * 24
}

fn default_hash_cost() -> u32 {
    10
}

fn default_hash_memory() -> u32 {
    19_456
}

fn default_reset_ttl() -> u64 {
    60
}
