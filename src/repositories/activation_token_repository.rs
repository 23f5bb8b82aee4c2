//! PostgreSQL activation token store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{db::DbPool, error::AppError, models::activation_token::ActivationToken};

use super::ActivationTokenRepository;

#[derive(Debug, Clone)]
pub struct PgActivationTokenRepository {
    pool: DbPool,
}

impl PgActivationTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivationTokenRepository for PgActivationTokenRepository {
    async fn create(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<ActivationToken, AppError> {
        let created = sqlx::query_as::<_, ActivationToken>(
            r#"
            INSERT INTO activation_tokens (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token, created_at, expires_at
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn consume(&self, token: &str) -> Result<Option<ActivationToken>, AppError> {
        let consumed = sqlx::query_as::<_, ActivationToken>(
            r#"
            DELETE FROM activation_tokens
            WHERE token = $1
            RETURNING id, user_id, token, created_at, expires_at
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(consumed)
    }

    async fn delete(&self, token: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM activation_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM activation_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
