//! Verified identity attached to an authenticated request.

use serde::Serialize;
use uuid::Uuid;

use guardpost_entity::user::{User, UserRole, UserStatus};

/// Identity resolved from a bearer token and the live user row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    /// Authenticated user.
    pub user_id: Uuid,
    /// Refresh session the access token was minted from.
    pub session_id: Option<Uuid>,
    /// Current role, read from the user row rather than the token.
    pub role: UserRole,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Account status at authentication time.
    pub status: UserStatus,
}

impl RequestContext {
    /// Builds the context for `user`.
    pub fn new(user: &User, session_id: Option<Uuid>) -> Self {
        Self {
            user_id: user.id,
            session_id,
            role: user.role,
            name: user.name.clone(),
            email: user.email.clone(),
            status: user.status,
        }
    }

    /// Whether the caller is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
