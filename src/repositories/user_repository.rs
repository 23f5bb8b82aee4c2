//! PostgreSQL user store.

use async_trait::async_trait;

use crate::{
    db::{self, DbPool},
    error::AppError,
    models::user::{NewUser, User},
};

use super::UserRepository;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, age, height, gender, \
                            language, activity_level, is_active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(err: sqlx::Error) -> AppError {
    if db::is_unique_violation(&err, db::USERS_EMAIL_UNIQUE) {
        AppError::UserAlreadyExists
    } else {
        AppError::Database(err)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    /// # Process
    ///
    /// 1. Start database transaction
    /// 2. Insert the user row
    /// 3. Copy `global_ingredients` for the user's language into `user_ingredients`
    /// 4. Commit (dropping the transaction on any error rolls both back)
    async fn create_with_starter_data(&self, user: NewUser) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, language, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.language)
        .bind(user.is_active)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        let copied = sqlx::query(
            r#"
            INSERT INTO user_ingredients (
                user_id, name, kcal_per_100g, fats, carbs, proteins, global_ingredient_id
            )
            SELECT $1, name, kcal_per_100g, fats, carbs, proteins, id
            FROM global_ingredients
            WHERE language = $2
            "#,
        )
        .bind(created.id)
        .bind(&user.language)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        tracing::debug!(
            user_id = created.id,
            language = %user.language,
            ingredients = copied,
            "user created with starter data"
        );

        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn activate(&self, id: i64) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE users SET is_active = true, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
