//! PostgreSQL repository implementations.

pub mod permission;
pub mod session;
pub mod user;

pub use permission::PgPermissionRepository;
pub use session::PgSessionRepository;
pub use user::PgUserRepository;
