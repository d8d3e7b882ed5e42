//! PostgreSQL user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use guardpost_core::error::AppError;
use guardpost_core::result::AppResult;
use guardpost_entity::session::{CreateSession, RefreshSession};
use guardpost_entity::user::{CreateUser, UpdateProfile, User, UserStatus};

use crate::error::{classify, db_error, is_unique_violation};
use crate::repository::UserRepository;

/// Repository for user rows.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by id"))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by email"))
    }

    async fn create_with_session(
        &self,
        user: &CreateUser,
        session: &CreateSession,
    ) -> AppResult<(User, RefreshSession)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin registration"))?;

        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, password_hash, phone, role, department) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING *",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(user.role)
        .bind(&user.department)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "users_email_key") {
                AppError::conflict("User with this email already exists.")
            } else {
                classify("Failed to create user", e)
            }
        })?;

        let first_session = sqlx::query_as::<_, RefreshSession>(
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
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create initial session"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit registration"))?;

        Ok((created, first_session))
    }

    async fn update_profile(&self, id: Uuid, changes: &UpdateProfile) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                phone = COALESCE($3, phone), \
                department = COALESCE($4, department), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.phone)
        .bind(&changes.department)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update profile"))
    }

    async fn update_status(&self, id: Uuid, status: UserStatus) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update user status"))
    }

    async fn update_status_and_revoke(
        &self,
        id: Uuid,
        status: UserStatus,
    ) -> AppResult<Option<(User, u64)>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin status change"))?;

        let Some(user) = sqlx::query_as::<_, User>(
            "UPDATE users SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to update user status"))?
        else {
            return Ok(None);
        };

        let revoked = sqlx::query("DELETE FROM refresh_sessions WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to revoke sessions after status change"))?
            .rows_affected();

        tx.commit()
            .await
            .map_err(db_error("Failed to commit status change"))?;

        Ok(Some((user, revoked)))
    }

    async fn touch_last_active(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET last_active = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update last active"))
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET reset_token_hash = $2, reset_token_expires_at = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to store reset token"))?;
        Ok(())
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE reset_token_hash = $1 AND reset_token_expires_at > NOW()",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find user by reset token"))
    }

    async fn complete_password_reset(
        &self,
        token_hash: &str,
        new_password_hash: &str,
    ) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin password reset"))?;

        let user_id: Option<Uuid> = sqlx::query_scalar(
            "UPDATE users SET \
                password_hash = $2, \
                reset_token_hash = NULL, \
                reset_token_expires_at = NULL, \
                updated_at = NOW() \
             WHERE reset_token_hash = $1 AND reset_token_expires_at > NOW() \
             RETURNING id",
        )
        .bind(token_hash)
        .bind(new_password_hash)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to reset password"))?;

        let Some(user_id) = user_id else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM refresh_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to revoke sessions after reset"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit password reset"))?;

        Ok(true)
    }

    async fn change_password(&self, id: Uuid, new_password_hash: &str) -> AppResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin password change"))?;

        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(new_password_hash)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to change password"))?;

        let revoked = sqlx::query("DELETE FROM refresh_sessions WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to revoke sessions after password change"))?
            .rows_affected();

        tx.commit()
            .await
            .map_err(db_error("Failed to commit password change"))?;

        Ok(revoked)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete user"))?;
        Ok(result.rows_affected() > 0)
    }
}
