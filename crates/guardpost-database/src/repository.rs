//! Repository traits consumed by the auth layer.
//!
//! Each method is one statement or one transaction. "No matching row" is
//! reported through `Option`/`bool`/counts, never as an error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use guardpost_core::result::AppResult;
use guardpost_entity::session::{CreateSession, RefreshSession};
use guardpost_entity::user::{CreateUser, UpdateProfile, User, UserStatus};

/// User accounts, including the pending password reset.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a user and its first refresh session atomically.
    ///
    /// Fails with `Conflict` when the email is taken.
    async fn create_with_session(
        &self,
        user: &CreateUser,
        session: &CreateSession,
    ) -> AppResult<(User, RefreshSession)>;

    /// Apply profile changes. Returns `None` if the user does not exist.
    async fn update_profile(&self, id: Uuid, changes: &UpdateProfile) -> AppResult<Option<User>>;

    /// Change account status. Returns `None` if the user does not exist.
    async fn update_status(&self, id: Uuid, status: UserStatus) -> AppResult<Option<User>>;

    /// Change account status and delete every refresh session of the user,
    /// in one transaction. Returns `None` if the user does not exist.
    async fn update_status_and_revoke(
        &self,
        id: Uuid,
        status: UserStatus,
    ) -> AppResult<Option<(User, u64)>>;

    /// Record a successful login. Returns the updated row, or `None` if the
    /// user no longer exists.
    async fn touch_last_active(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Store a reset token digest, overwriting any previous one.
    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Find the user holding an unexpired reset token with this digest.
    async fn find_by_reset_token(&self, token_hash: &str) -> AppResult<Option<User>>;

    /// Consume a reset token: set the new password, clear the token, and
    /// delete every refresh session of the user, in one transaction.
    ///
    /// Returns `false` if the token was no longer valid when the
    /// transaction ran.
    async fn complete_password_reset(
        &self,
        token_hash: &str,
        new_password_hash: &str,
    ) -> AppResult<bool>;

    /// Set a new password and delete every refresh session of the user,
    /// in one transaction. Returns the number of sessions removed.
    async fn change_password(&self, id: Uuid, new_password_hash: &str) -> AppResult<u64>;

    /// Delete a user. Sessions and grants go with it.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Persisted refresh sessions. Rows are keyed by the token's digest.
#[async_trait]
pub trait SessionRepository: Send + Sync + 'static {
    /// Insert a new session.
    async fn create(&self, session: &CreateSession) -> AppResult<RefreshSession>;

    /// Atomically check that a non-expired session with this digest belongs
    /// to `user_id` and bump its `last_used_at`.
    async fn touch_if_active(
        &self,
        token_hash: &str,
        user_id: Uuid,
    ) -> AppResult<Option<RefreshSession>>;

    /// Consume the non-expired session with `old_token_hash` owned by
    /// `user_id` and insert `replacement`, in one transaction.
    ///
    /// Returns `None`, writing nothing, if the old session was already gone.
    async fn rotate(
        &self,
        old_token_hash: &str,
        user_id: Uuid,
        replacement: &CreateSession,
    ) -> AppResult<Option<RefreshSession>>;

    /// Non-expired sessions of a user, most recently used first.
    async fn find_active_by_user(&self, user_id: Uuid) -> AppResult<Vec<RefreshSession>>;

    /// Delete one session, only if it belongs to `user_id`.
    async fn delete_for_user(&self, user_id: Uuid, session_id: Uuid) -> AppResult<bool>;

    /// Delete every session of a user except `keep` (if given).
    async fn delete_all_for_user(&self, user_id: Uuid, keep: Option<Uuid>) -> AppResult<u64>;

    /// Delete the session holding this token digest.
    async fn delete_by_token_hash(&self, token_hash: &str) -> AppResult<bool>;

    /// Delete sessions whose expiry has passed.
    async fn delete_expired(&self) -> AppResult<u64>;
}

/// Named permission grants.
#[async_trait]
pub trait PermissionRepository: Send + Sync + 'static {
    /// Every permission name granted to a user, sorted.
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<String>>;

    /// Whether the user holds this exact permission.
    async fn has_permission(&self, user_id: Uuid, permission: &str) -> AppResult<bool>;

    /// Replace the user's grants with `permissions` in one transaction.
    async fn replace_for_user(&self, user_id: Uuid, permissions: &[String]) -> AppResult<()>;
}
