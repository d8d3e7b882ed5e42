//! Classification of sqlx failures into [`AppError`] kinds.
//!
//! Connection-level failures (pool exhaustion, I/O, statement timeout)
//! become `StorageUnavailable` and are safe to retry. Everything else is
//! a fatal `Database` error.

use guardpost_core::error::{AppError, ErrorKind};

/// SQLSTATE raised when `statement_timeout` cancels a query.
const QUERY_CANCELED: &str = "57014";

/// Build a `map_err` adapter that classifies a sqlx error with context.
pub fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |err| classify(context, err)
}

/// Classify a sqlx error.
pub fn classify(context: &str, err: sqlx::Error) -> AppError {
    let kind = match &err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => ErrorKind::StorageUnavailable,
        sqlx::Error::Database(db) if db.code().as_deref() == Some(QUERY_CANCELED) => {
            ErrorKind::StorageUnavailable
        }
        _ => ErrorKind::Database,
    };

    if kind == ErrorKind::StorageUnavailable {
        tracing::warn!(context, error = %err, "Database unavailable");
    }

    AppError::with_source(kind, context.to_string(), err)
}

/// Return true when `err` is a unique violation of `constraint`.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.constraint() == Some(constraint))
}
