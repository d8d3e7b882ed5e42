//! # guardpost-database
//!
//! PostgreSQL connection management, the repository traits consumed by
//! the auth layer, and two implementations of them: PostgreSQL
//! (`repositories`) and in-process (`memory`) for single-node
//! development and tests.

pub mod connection;
pub mod error;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod repository;

pub use connection::DatabasePool;
pub use memory::MemoryDatabase;
pub use repository::{PermissionRepository, SessionRepository, UserRepository};
