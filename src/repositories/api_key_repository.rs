//! PostgreSQL API key store.

use async_trait::async_trait;

use crate::{
    db::DbPool,
    error::AppError,
    models::api_key::{ApiKey, NewApiKey},
};

use super::ApiKeyRepository;

#[derive(Debug, Clone)]
pub struct PgApiKeyRepository {
    pool: DbPool,
}

impl PgApiKeyRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyRepository for PgApiKeyRepository {
    async fn create(&self, key: NewApiKey) -> Result<ApiKey, AppError> {
        let created = sqlx::query_as::<_, ApiKey>(
            r#"
            INSERT INTO api_keys (user_id, name, key_hash, key_prefix, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, name, key_hash, key_prefix, expires_at, is_revoked, created_at
            "#,
        )
        .bind(key.user_id)
        .bind(&key.name)
        .bind(&key.key_hash)
        .bind(&key.key_prefix)
        .bind(key.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_by_key_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError> {
        let found = sqlx::query_as::<_, ApiKey>(
            r#"
            SELECT id, user_id, name, key_hash, key_prefix, expires_at, is_revoked, created_at
            FROM api_keys
            WHERE key_hash = $1
            "#,
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<ApiKey>, AppError> {
        let keys = sqlx::query_as::<_, ApiKey>(
            r#"
            SELECT id, user_id, name, key_hash, key_prefix, expires_at, is_revoked, created_at
            FROM api_keys
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(keys)
    }

    async fn revoke(&self, id: i64, user_id: i64) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE api_keys SET is_revoked = true WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64, user_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
