//! PostgreSQL permission grant repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use guardpost_core::result::AppResult;

use crate::error::db_error;
use crate::repository::PermissionRepository;

/// Repository for `user_permissions` rows.
#[derive(Debug, Clone)]
pub struct PgPermissionRepository {
    pool: PgPool,
}

impl PgPermissionRepository {
    /// Create a new permission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for PgPermissionRepository {
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT permission_name FROM user_permissions WHERE user_id = $1 \
             ORDER BY permission_name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load permissions"))
    }

    async fn has_permission(&self, user_id: Uuid, permission: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM user_permissions \
             WHERE user_id = $1 AND permission_name = $2)",
        )
        .bind(user_id)
        .bind(permission)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check permission"))
    }

    async fn replace_for_user(&self, user_id: Uuid, permissions: &[String]) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin permission update"))?;

        sqlx::query("DELETE FROM user_permissions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to clear permissions"))?;

        if !permissions.is_empty() {
            sqlx::query(
                "INSERT INTO user_permissions (user_id, permission_name) \
                 SELECT $1, UNNEST($2::varchar[]) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(user_id)
            .bind(permissions)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to insert permissions"))?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit permission update"))?;

        Ok(())
    }
}
