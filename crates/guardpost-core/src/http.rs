//! Maps domain `AppError` to HTTP responses.
//!
//! Lives in `guardpost-core` (behind the `axum` feature) because the orphan
//! rule forbids implementing axum's `IntoResponse` for `AppError` elsewhere.
//! Re-exported from `guardpost_api::error`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Present and `true` when the same request may succeed on retry.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::InvalidResetToken => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Database
        | ErrorKind::StorageUnavailable
        | ErrorKind::Internal
        | ErrorKind::Configuration
        | ErrorKind::Serialization => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(self.kind);
        let retryable = self.is_retryable();

        // Server faults are logged in full and returned without detail.
        let message = if self.is_server_error() {
            tracing::error!(
                kind = %self.kind,
                error = %self.message,
                source = ?self.source,
                retryable,
                "Request failed with server error"
            );
            if retryable {
                "Service temporarily unavailable. Please try again.".to_string()
            } else {
                "An internal server error occurred.".to_string()
            }
        } else {
            self.message
        };

        let body = ApiErrorResponse {
            success: false,
            error: self.kind.code().to_string(),
            message,
            retryable,
        };

        (status, Json(body)).into_response()
    }
}
