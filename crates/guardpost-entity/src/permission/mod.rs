//! Named permission grants.

pub mod model;

pub use model::PermissionGrant;
