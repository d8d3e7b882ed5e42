//! User management handlers. Lookups are permission-gated, mutations are
//! Admin only.

use axum::Json;
use axum::extract::{Path, State};

use guardpost_core::error::AppError;
use guardpost_entity::user::UserStatus;

use crate::dto::request::{UpdatePermissionsRequest, UpdateStatusRequest};
use crate::dto::response::{ApiResponse, PermissionsResponse, UserResponse};
use crate::extractors::path::parse_uuid;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::middleware::rbac::{require_admin, require_permission};
use crate::state::AppState;

/// Permission required to look up other users.
pub const USERS_READ: &str = "users.read";

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    require_permission(&state, &auth, USERS_READ).await?;
    let user_id = parse_uuid(&id)?;

    let found = state.accounts.get_user(user_id).await?;
    Ok(Json(ApiResponse::ok(
        UserResponse::from(found.user).with_permissions(found.permissions),
    )))
}

/// PUT /api/users/{id}/status
///
/// Suspending or deactivating a user also drops their refresh sessions.
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    require_admin(&state, &auth)?;
    let user_id = parse_uuid(&id)?;
    let status: UserStatus = req.status.parse()?;

    let user = state.accounts.set_status(user_id, status).await?;
    let verb = match status {
        UserStatus::Active => "activated",
        UserStatus::Suspended => "suspended",
        UserStatus::Inactive => "deactivated",
    };
    Ok(Json(ApiResponse::ok_with_message(
        format!("User {verb} successfully."),
        UserResponse::from(user),
    )))
}

/// PUT /api/users/{id}/permissions
pub async fn update_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdatePermissionsRequest>,
) -> Result<Json<ApiResponse<PermissionsResponse>>, AppError> {
    require_admin(&state, &auth)?;
    let user_id = parse_uuid(&id)?;

    let permissions = state
        .accounts
        .set_permissions(user_id, req.permissions)
        .await?;
    Ok(Json(ApiResponse::ok_with_message(
        "Permissions updated successfully.",
        PermissionsResponse { permissions },
    )))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_admin(&state, &auth)?;
    let user_id = parse_uuid(&id)?;

    state.accounts.delete_user(auth.user_id, user_id).await?;
    Ok(Json(ApiResponse::message("User deleted successfully.")))
}
