//! # guardpost-auth
//!
//! Authentication, session management and authorization for GuardPost.
//!
//! ## Modules
//!
//! - `jwt`: access and refresh token issuing and verification
//! - `password`: Argon2id hashing and the password reset flow
//! - `session`: refresh session store, login/refresh/logout flows, cleanup
//! - `rbac`: role allow-lists and named permission grants
//! - `authenticator`: bearer token to [`RequestContext`]
//! - `account`: profile, password change and admin user management

pub mod account;
pub mod authenticator;
pub mod context;
pub mod jwt;
pub mod password;
pub mod rbac;
pub mod session;
pub mod token;

pub use account::{AccountService, UserWithPermissions};
pub use authenticator::Authenticator;
pub use context::RequestContext;
pub use jwt::{AccessClaims, IssuedToken, JwtDecoder, JwtEncoder, RefreshClaims};
pub use password::{PasswordHasher, PasswordResetFlow, ResetRequest};
pub use rbac::RbacEnforcer;
pub use session::{
    AuthOutcome, RefreshOutcome, Registration, SessionCleanup, SessionManager, SessionStore,
};
