//! JWT token validation.
//!
//! Every failure (bad signature, expiry, wrong class, malformed input)
//! collapses into the same opaque `Unauthenticated` error. The cause is
//! only logged at debug level.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::de::DeserializeOwned;
use tracing::debug;

use guardpost_core::config::AuthConfig;
use guardpost_core::error::AppError;

use super::claims::{AccessClaims, RefreshClaims, TokenType};

/// Message returned for every token verification failure.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token. Authorization denied.";

/// Validates access and refresh tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    access_key: DecodingKey,
    refresh_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            access_key: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_key: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            validation,
        }
    }

    /// Verifies an access token's signature, expiry and class.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, AppError> {
        let claims: AccessClaims = self.decode_with(token, &self.access_key)?;
        if claims.typ != TokenType::Access {
            debug!("Rejected token: expected access token");
            return Err(invalid_token());
        }
        Ok(claims)
    }

    /// Verifies a refresh token's signature, expiry and class.
    ///
    /// This does not consult the session store.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, AppError> {
        let claims: RefreshClaims = self.decode_with(token, &self.refresh_key)?;
        if claims.typ != TokenType::Refresh {
            debug!("Rejected token: expected refresh token");
            return Err(invalid_token());
        }
        Ok(claims)
    }

    fn decode_with<T: DeserializeOwned>(
        &self,
        token: &str,
        key: &DecodingKey,
    ) -> Result<T, AppError> {
        decode::<T>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(reason = ?e.kind(), "Token verification failed");
                invalid_token()
            })
    }
}

fn invalid_token() -> AppError {
    AppError::unauthenticated(INVALID_TOKEN_MESSAGE)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use guardpost_core::error::ErrorKind;
    use guardpost_entity::user::UserRole;

    use super::*;
    use crate::jwt::JwtEncoder;

    fn config() -> AuthConfig {
        AuthConfig {
            access_token_secret: "test-access-secret".into(),
            refresh_token_secret: "test-refresh-secret".into(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();

        let issued = encoder
            .issue_access(user_id, UserRole::Guard, Some(session_id))
            .unwrap();
        let claims = decoder.verify_access(&issued.token).unwrap();

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.role, UserRole::Guard);
        assert_eq!(claims.sid, Some(session_id));
        assert_eq!(claims.expires_at().unwrap().timestamp(), issued.expires_at.timestamp());
    }

    #[test]
    fn test_access_token_lives_seven_days_by_default() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let now = Utc::now();
        let issued = encoder
            .issue_access_at(Uuid::new_v4(), UserRole::Client, None, now)
            .unwrap();
        assert_eq!(issued.expires_at - now, Duration::days(7));

        let refresh = encoder.issue_refresh_at(Uuid::new_v4(), now).unwrap();
        assert_eq!(refresh.expires_at - now, Duration::days(30));
    }

    #[test]
    fn test_expired_access_token_is_rejected() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);

        let issued_long_ago = Utc::now() - Duration::days(8);
        let issued = encoder
            .issue_access_at(Uuid::new_v4(), UserRole::Admin, None, issued_long_ago)
            .unwrap();

        let err = decoder.verify_access(&issued.token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthenticated);
        assert_eq!(err.message, INVALID_TOKEN_MESSAGE);
    }

    #[test]
    fn test_no_grace_period_after_expiry() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);

        let issued_at = Utc::now() - Duration::days(7) - Duration::seconds(3);
        let issued = encoder
            .issue_access_at(Uuid::new_v4(), UserRole::Guard, None, issued_at)
            .unwrap();
        assert!(issued.expires_at < Utc::now());
        assert!(decoder.verify_access(&issued.token).is_err());
    }

    #[test]
    fn test_expired_refresh_token_is_rejected() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);

        let issued = encoder
            .issue_refresh_at(Uuid::new_v4(), Utc::now() - Duration::days(31))
            .unwrap();
        assert!(decoder.verify_refresh(&issued.token).is_err());
    }

    #[test]
    fn test_token_classes_do_not_cross_verify() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);
        let user_id = Uuid::new_v4();

        let access = encoder.issue_access(user_id, UserRole::Guard, None).unwrap();
        let refresh = encoder.issue_refresh(user_id).unwrap();

        assert!(decoder.verify_refresh(&access.token).is_err());
        assert!(decoder.verify_access(&refresh.token).is_err());
    }

    #[test]
    fn test_failures_are_indistinguishable() {
        let config = config();
        let decoder = JwtDecoder::new(&config);

        let other = JwtEncoder::new(&AuthConfig {
            access_token_secret: "some-other-secret".into(),
            ..config.clone()
        });
        let forged = other
            .issue_access(Uuid::new_v4(), UserRole::Admin, None)
            .unwrap();

        let bad_signature = decoder.verify_access(&forged.token).unwrap_err();
        let garbage = decoder.verify_access("not.a.jwt").unwrap_err();

        assert_eq!(bad_signature.kind, garbage.kind);
        assert_eq!(bad_signature.message, garbage.message);
    }

    #[test]
    fn test_tokens_issued_in_same_instant_differ() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let now = Utc::now();
        let user_id = Uuid::new_v4();

        let a = encoder.issue_access_at(user_id, UserRole::Guard, None, now).unwrap();
        let b = encoder.issue_access_at(user_id, UserRole::Guard, None, now).unwrap();
        assert_ne!(a.token, b.token);
    }
}
