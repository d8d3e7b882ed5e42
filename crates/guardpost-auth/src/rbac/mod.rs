//! Role and named-permission checks.

pub mod enforcer;

pub use enforcer::{FORBIDDEN_PERMISSION_MESSAGE, FORBIDDEN_ROLE_MESSAGE, RbacEnforcer};
