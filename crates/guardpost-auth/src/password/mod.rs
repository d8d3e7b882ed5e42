//! Password hashing and the password reset flow.

pub mod hasher;
pub mod reset;

pub use hasher::PasswordHasher;
pub use reset::{PasswordResetFlow, ResetRequest};
