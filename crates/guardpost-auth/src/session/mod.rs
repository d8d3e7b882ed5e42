//! Refresh sessions: persistence, lifecycle flows and housekeeping.

pub mod cleanup;
pub mod manager;
pub mod store;

pub use cleanup::SessionCleanup;
pub use manager::{AuthOutcome, RefreshOutcome, Registration, SessionManager};
pub use store::SessionStore;
