//! Convenience result type alias for GuardPost.

use crate::error::AppError;

/// A specialized `Result` type for GuardPost operations.
pub type AppResult<T> = Result<T, AppError>;
