//! # guardpost-core
//!
//! Core crate for GuardPost. Contains configuration schemas and the
//! unified error system shared by every other crate.
//!
//! This crate has **no** internal dependencies on other GuardPost crates.

pub mod config;
pub mod error;
#[cfg(feature = "axum")]
pub mod http;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
