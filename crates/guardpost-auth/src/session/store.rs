//! Refresh session operations on top of the session repository.
//!
//! Tokens never reach the repository in plain form: every call hashes the
//! presented refresh token first.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use guardpost_core::error::AppError;
use guardpost_database::SessionRepository;
use guardpost_entity::session::{ClientMetadata, CreateSession, RefreshSession};

use crate::token::hash_token;

/// Revocable refresh sessions keyed by user.
#[derive(Clone)]
pub struct SessionStore {
    repo: Arc<dyn SessionRepository>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Creates a new session store.
    pub fn new(repo: Arc<dyn SessionRepository>) -> Self {
        Self { repo }
    }

    /// Builds the row for a new session without writing it.
    pub fn prepare(
        user_id: Uuid,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
        metadata: ClientMetadata,
    ) -> CreateSession {
        CreateSession {
            id: Uuid::new_v4(),
            user_id,
            token_hash: hash_token(refresh_token),
            metadata,
            expires_at,
        }
    }

    /// Persists a new session for `refresh_token`.
    pub async fn create(
        &self,
        user_id: Uuid,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
        metadata: ClientMetadata,
    ) -> Result<RefreshSession, AppError> {
        let session = Self::prepare(user_id, refresh_token, expires_at, metadata);
        let created = self.repo.create(&session).await?;
        debug!(user_id = %user_id, session_id = %created.id, "Refresh session created");
        Ok(created)
    }

    /// Returns the session if `refresh_token` belongs to `user_id` and has
    /// not expired, bumping its last-used time in the same statement.
    pub async fn find_active(
        &self,
        refresh_token: &str,
        user_id: Uuid,
    ) -> Result<Option<RefreshSession>, AppError> {
        self.repo
            .touch_if_active(&hash_token(refresh_token), user_id)
            .await
    }

    /// Replaces the session behind `refresh_token` with one for
    /// `replacement`. The old row is consumed atomically, so only one of
    /// several concurrent rotations with the same token succeeds.
    pub async fn rotate(
        &self,
        refresh_token: &str,
        user_id: Uuid,
        replacement: &str,
        expires_at: DateTime<Utc>,
        metadata: ClientMetadata,
    ) -> Result<Option<RefreshSession>, AppError> {
        let session = Self::prepare(user_id, replacement, expires_at, metadata);
        let rotated = self
            .repo
            .rotate(&hash_token(refresh_token), user_id, &session)
            .await?;
        if let Some(row) = &rotated {
            debug!(user_id = %user_id, session_id = %row.id, "Refresh session rotated");
        }
        Ok(rotated)
    }

    /// Whether a matching, non-expired session exists.
    pub async fn is_active(&self, refresh_token: &str, user_id: Uuid) -> Result<bool, AppError> {
        Ok(self.find_active(refresh_token, user_id).await?.is_some())
    }

    /// Non-expired sessions of a user, most recently used first.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<RefreshSession>, AppError> {
        self.repo.find_active_by_user(user_id).await
    }

    /// Revokes one of the user's sessions.
    ///
    /// Another user's session id is reported as not found.
    pub async fn revoke(&self, user_id: Uuid, session_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_for_user(user_id, session_id).await? {
            return Err(AppError::not_found("Session not found"));
        }
        info!(user_id = %user_id, session_id = %session_id, "Session revoked");
        Ok(())
    }

    /// Revokes every session of the user except `current`.
    pub async fn revoke_all(&self, user_id: Uuid, current: Option<Uuid>) -> Result<u64, AppError> {
        let revoked = self.repo.delete_all_for_user(user_id, current).await?;
        info!(user_id = %user_id, revoked, kept = ?current, "Other sessions revoked");
        Ok(revoked)
    }

    /// Revokes every session of the user, with no exception.
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, AppError> {
        let revoked = self.repo.delete_all_for_user(user_id, None).await?;
        info!(user_id = %user_id, revoked, "All sessions revoked");
        Ok(revoked)
    }

    /// Revokes the session holding `refresh_token`. Idempotent.
    pub async fn revoke_token(&self, refresh_token: &str) -> Result<bool, AppError> {
        self.repo
            .delete_by_token_hash(&hash_token(refresh_token))
            .await
    }

    /// Deletes sessions whose expiry has passed.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        self.repo.delete_expired().await
    }
}
