//! RBAC helpers for role- and permission-gated handlers.

use guardpost_core::error::AppError;
use guardpost_entity::user::UserRole;

use crate::extractors::AuthUser;
use crate::state::AppState;

/// Checks that the authenticated user's role is in `allowed`.
pub fn require_role(state: &AppState, auth: &AuthUser, allowed: &[UserRole]) -> Result<(), AppError> {
    state.rbac.require_role(auth.role, allowed)
}

/// Checks that the authenticated user has the Admin role.
pub fn require_admin(state: &AppState, auth: &AuthUser) -> Result<(), AppError> {
    require_role(state, auth, &[UserRole::Admin])
}

/// Checks that the authenticated user holds `permission` (Admin always does).
pub async fn require_permission(
    state: &AppState,
    auth: &AuthUser,
    permission: &str,
) -> Result<(), AppError> {
    state
        .rbac
        .require_permission(auth.user_id, auth.role, permission)
        .await
}
