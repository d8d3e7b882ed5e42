//! Session listing and revocation for the caller.

use axum::Json;
use axum::extract::{Path, State};

use guardpost_core::error::AppError;

use crate::dto::response::{ApiResponse, RevokedResponse, SessionResponse};
use crate::extractors::AuthUser;
use crate::extractors::path::parse_uuid;
use crate::state::AppState;

/// GET /api/settings/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<SessionResponse>>>, AppError> {
    let sessions = state.session_store.list(auth.user_id).await?;
    let rows = sessions
        .into_iter()
        .map(|s| SessionResponse::new(s, auth.session_id))
        .collect();
    Ok(Json(ApiResponse::ok(rows)))
}

/// DELETE /api/settings/sessions/{id}
pub async fn revoke_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let session_id = parse_uuid(&id)?;
    state.session_store.revoke(auth.user_id, session_id).await?;
    Ok(Json(ApiResponse::message("Session revoked")))
}

/// DELETE /api/settings/sessions
pub async fn revoke_other_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<RevokedResponse>>, AppError> {
    let revoked = state
        .session_store
        .revoke_all(auth.user_id, auth.session_id)
        .await?;
    Ok(Json(ApiResponse::ok_with_message(
        "All other sessions revoked",
        RevokedResponse { revoked },
    )))
}
