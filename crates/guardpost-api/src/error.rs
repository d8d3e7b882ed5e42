//! Maps domain `AppError` to HTTP responses.
//!
//! The `IntoResponse` impl lives in `guardpost_core::http` (orphan rule);
//! its types are re-exported here.

pub use guardpost_core::http::{ApiErrorResponse, status_for};
