//! Auth handlers: register, login, refresh, logout and password reset.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use guardpost_auth::{AuthOutcome, Registration};
use guardpost_core::error::AppError;

use crate::dto::request::{
    LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest, RequestResetRequest,
    ResetPasswordRequest,
};
use crate::dto::response::{
    ApiResponse, AuthResponse, RefreshResponse, ResetTokenResponse, UserResponse,
};
use crate::extractors::{ClientInfo, ValidatedJson};
use crate::state::AppState;

/// Message returned by the reset request whether or not the account exists.
pub const RESET_REQUESTED_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent.";

fn auth_response(outcome: AuthOutcome) -> AuthResponse {
    AuthResponse {
        user: UserResponse::from(outcome.user).with_permissions(outcome.permissions),
        access_token: outcome.access_token.token,
        refresh_token: outcome.refresh_token.token,
        access_expires_at: outcome.access_token.expires_at,
        refresh_expires_at: outcome.refresh_token.expires_at,
    }
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ClientInfo(metadata): ClientInfo,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), AppError> {
    let registration = Registration {
        name: req.name,
        email: req.email.unwrap_or_default(),
        password: req.password,
        role: req.role,
        phone: req.phone,
        department: req.department,
    };

    let outcome = state.session_manager.register(registration, metadata).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            "User registered successfully.",
            auth_response(outcome),
        )),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ClientInfo(metadata): ClientInfo,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let outcome = state
        .session_manager
        .login(&req.email, &req.password, metadata)
        .await?;

    Ok(Json(ApiResponse::ok_with_message(
        "Login successful.",
        auth_response(outcome),
    )))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ClientInfo(metadata): ClientInfo,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<RefreshResponse>>, AppError> {
    let outcome = state
        .session_manager
        .refresh(&req.refresh_token, metadata)
        .await?;

    Ok(Json(ApiResponse::ok_with_message(
        "Token refreshed successfully.",
        RefreshResponse {
            access_token: outcome.access_token.token,
            access_expires_at: outcome.access_token.expires_at,
            refresh_token: outcome.refresh_token.map(|t| t.token),
        },
    )))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LogoutRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state
        .session_manager
        .logout(req.refresh_token.as_deref())
        .await?;

    Ok(Json(ApiResponse::message("Logout successful.")))
}

/// POST /api/auth/request-reset
pub async fn request_reset(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RequestResetRequest>,
) -> Result<Json<ApiResponse<ResetTokenResponse>>, AppError> {
    let result = state.reset_flow.request_reset(&req.email).await?;

    Ok(Json(ApiResponse {
        success: true,
        message: Some(RESET_REQUESTED_MESSAGE.to_string()),
        data: result
            .reset_token
            .map(|reset_token| ResetTokenResponse { reset_token }),
    }))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state
        .reset_flow
        .reset_password(&req.token, &req.new_password)
        .await?;

    Ok(Json(ApiResponse::message(
        "Password reset successful. Please login with your new password.",
    )))
}
