//! RBAC enforcement: role allow-lists and per-user permission grants.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use guardpost_core::error::AppError;
use guardpost_database::PermissionRepository;
use guardpost_entity::user::UserRole;

/// Denial message for a role outside the allow-list.
pub const FORBIDDEN_ROLE_MESSAGE: &str = "You do not have permission to access this resource.";

/// Denial message for a missing permission grant.
pub const FORBIDDEN_PERMISSION_MESSAGE: &str = "You do not have this permission.";

/// Enforces role allow-lists and named permission grants.
#[derive(Clone)]
pub struct RbacEnforcer {
    permissions: Arc<dyn PermissionRepository>,
}

impl std::fmt::Debug for RbacEnforcer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RbacEnforcer").finish_non_exhaustive()
    }
}

impl RbacEnforcer {
    /// Creates a new enforcer backed by the grant repository.
    pub fn new(permissions: Arc<dyn PermissionRepository>) -> Self {
        Self { permissions }
    }

    /// Passes only if `role` is one of `allowed`.
    pub fn require_role(&self, role: UserRole, allowed: &[UserRole]) -> Result<(), AppError> {
        if allowed.contains(&role) {
            Ok(())
        } else {
            debug!(role = %role, ?allowed, "Role check denied");
            Err(AppError::forbidden(FORBIDDEN_ROLE_MESSAGE))
        }
    }

    /// Passes for `Admin`, or when the user holds the exact `permission`.
    pub async fn require_permission(
        &self,
        user_id: Uuid,
        role: UserRole,
        permission: &str,
    ) -> Result<(), AppError> {
        if role.is_admin() {
            return Ok(());
        }

        if self.permissions.has_permission(user_id, permission).await? {
            Ok(())
        } else {
            debug!(user_id = %user_id, permission, "Permission check denied");
            Err(AppError::forbidden(FORBIDDEN_PERMISSION_MESSAGE))
        }
    }
}
