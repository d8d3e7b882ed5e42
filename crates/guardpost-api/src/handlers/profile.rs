//! Handlers for the caller's own account.

use axum::Json;
use axum::extract::State;

use guardpost_core::error::AppError;

use crate::dto::request::{ChangePasswordRequest, UpdateProfileRequest};
use crate::dto::response::{ApiResponse, RevokedResponse, UserResponse};
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/auth/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let found = state.accounts.get_user(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(
        UserResponse::from(found.user).with_permissions(found.permissions),
    )))
}

/// PUT /api/auth/profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = state
        .accounts
        .update_profile(auth.user_id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok_with_message(
        "Profile updated successfully.",
        UserResponse::from(user),
    )))
}

/// PUT /api/auth/password
///
/// Every session is revoked, including the caller's.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<RevokedResponse>>, AppError> {
    let revoked = state
        .accounts
        .change_password(auth.user_id, &req.current_password, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::ok_with_message(
        "Password changed successfully. Please login again.",
        RevokedResponse { revoked },
    )))
}
