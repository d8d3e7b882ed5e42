//! Refresh session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted refresh token. Revoking the row revokes the token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshSession {
    /// Unique session identifier.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// SHA-256 hex digest of the refresh token.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// User-Agent header value at login.
    pub user_agent: Option<String>,
    /// Client IP address at login.
    pub ip_address: Option<String>,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// Last successful refresh.
    pub last_used_at: DateTime<Utc>,
}

impl RefreshSession {
    /// A session is valid only while `now < expires_at`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Check whether the session is still valid right now.
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }
}

/// Best-effort client information captured at login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientMetadata {
    /// User-Agent header.
    pub user_agent: Option<String>,
    /// Client IP address.
    pub ip_address: Option<String>,
}

/// Data required to create a new refresh session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    /// Pre-generated session id.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// SHA-256 hex digest of the refresh token.
    pub token_hash: String,
    /// Client metadata.
    pub metadata: ClientMetadata,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
}
