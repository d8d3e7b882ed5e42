//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;
use super::status::UserStatus;

/// A user account. Aggregate root for sessions, permission grants and the
/// pending password reset.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Full name.
    pub name: String,
    /// Login email, unique.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Role (RBAC).
    pub role: UserRole,
    /// Department name.
    pub department: Option<String>,
    /// Account status.
    pub status: UserStatus,
    /// Last successful login.
    pub last_active: Option<DateTime<Utc>>,
    /// SHA-256 hex digest of the pending reset token.
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    /// When the pending reset token stops being accepted.
    #[serde(skip_serializing)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Check if the account may authenticate.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Data required to create a new user.
///
/// The id is chosen by the caller so that the user row and its first
/// refresh session can be written in one transaction.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Pre-generated user id.
    pub id: Uuid,
    /// Full name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Assigned role.
    pub role: UserRole,
    /// Department name.
    pub department: Option<String>,
}

/// Self-service profile changes. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    /// New name.
    pub name: Option<String>,
    /// New phone.
    pub phone: Option<String>,
    /// New department.
    pub department: Option<String>,
}

impl UpdateProfile {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.department.is_none()
    }
}
