//! PostgreSQL refresh session repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use guardpost_core::result::AppResult;
use guardpost_entity::session::{CreateSession, RefreshSession};

use crate::error::db_error;
use crate::repository::SessionRepository;

/// Repository for `refresh_sessions` rows.
#[derive(Debug, Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, session: &CreateSession) -> AppResult<RefreshSession> {
        sqlx::query_as::<_, RefreshSession>(
            "INSERT INTO refresh_sessions (id, user_id, token_hash, user_agent, ip_address, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.token_hash)
        .bind(&session.metadata.user_agent)
        .bind(&session.metadata.ip_address)
        .bind(session.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create session"))
    }

    async fn touch_if_active(
        &self,
        token_hash: &str,
        user_id: Uuid,
    ) -> AppResult<Option<RefreshSession>> {
        sqlx::query_as::<_, RefreshSession>(
            "UPDATE refresh_sessions SET last_used_at = NOW() \
             WHERE token_hash = $1 AND user_id = $2 AND expires_at > NOW() \
             RETURNING *",
        )
        .bind(token_hash)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to validate session"))
    }

    async fn rotate(
        &self,
        old_token_hash: &str,
        user_id: Uuid,
        replacement: &CreateSession,
    ) -> AppResult<Option<RefreshSession>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin session rotation"))?;

        let consumed = sqlx::query(
            "DELETE FROM refresh_sessions \
             WHERE token_hash = $1 AND user_id = $2 AND expires_at > NOW()",
        )
        .bind(old_token_hash)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to consume rotated session"))?
        .rows_affected();

        if consumed == 0 {
            return Ok(None);
        }

        let created = sqlx::query_as::<_, RefreshSession>(
            "INSERT INTO refresh_sessions (id, user_id, token_hash, user_agent, ip_address, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(replacement.id)
        .bind(replacement.user_id)
        .bind(&replacement.token_hash)
        .bind(&replacement.metadata.user_agent)
        .bind(&replacement.metadata.ip_address)
        .bind(replacement.expires_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create rotated session"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit session rotation"))?;

        Ok(Some(created))
    }

    async fn find_active_by_user(&self, user_id: Uuid) -> AppResult<Vec<RefreshSession>> {
        sqlx::query_as::<_, RefreshSession>(
            "SELECT * FROM refresh_sessions WHERE user_id = $1 AND expires_at > NOW() \
             ORDER BY last_used_at DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list sessions"))
    }

    async fn delete_for_user(&self, user_id: Uuid, session_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE id = $1 AND user_id = $2")
            .bind(session_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to revoke session"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_for_user(&self, user_id: Uuid, keep: Option<Uuid>) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM refresh_sessions WHERE user_id = $1 AND ($2::uuid IS NULL OR id <> $2)",
        )
        .bind(user_id)
        .bind(keep)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to revoke sessions"))?;
        Ok(result.rows_affected())
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete session by token"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to purge expired sessions"))?;
        Ok(result.rows_affected())
    }
}
