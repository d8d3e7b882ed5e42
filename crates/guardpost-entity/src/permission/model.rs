//! Permission grant entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named permission granted to one user. Grants have set semantics.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PermissionGrant {
    /// The user holding the permission.
    pub user_id: Uuid,
    /// Exact permission name, e.g. `users.read`.
    pub permission_name: String,
    /// When the grant was written.
    pub created_at: DateTime<Utc>,
}
