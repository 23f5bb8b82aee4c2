//! Store contracts for the identity core.
//!
//! Services depend on these traits only; the Postgres implementations live
//! beside them and an in-memory implementation backs the unit tests.
//! Methods that target a single row by key return `bool` (row affected or
//! not) and leave the domain meaning of "nothing matched" to the caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::activation_token::ActivationToken;
use crate::models::api_key::{ApiKey, NewApiKey};
use crate::models::user::{NewUser, User};

pub mod activation_token_repository;
pub mod api_key_repository;
pub mod user_repository;

#[cfg(test)]
pub mod memory;

pub use activation_token_repository::PgActivationTokenRepository;
pub use api_key_repository::PgApiKeyRepository;
pub use user_repository::PgUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert the user and copy the starter ingredient set for
    /// `user.language` in one transaction. A duplicate email yields
    /// [`AppError::UserAlreadyExists`].
    async fn create_with_starter_data(&self, user: NewUser) -> Result<User, AppError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Set `is_active = true`.
    async fn activate(&self, id: i64) -> Result<bool, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ActivationTokenRepository: Send + Sync {
    async fn create(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<ActivationToken, AppError>;

    /// Delete the token and return the removed row. Of several concurrent
    /// calls with the same token at most one gets `Some`.
    async fn consume(&self, token: &str) -> Result<Option<ActivationToken>, AppError>;

    async fn delete(&self, token: &str) -> Result<bool, AppError>;

    /// Remove every token with `expires_at <= now`; returns how many went.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    async fn create(&self, key: NewApiKey) -> Result<ApiKey, AppError>;

    /// Lookup by SHA-256 of the raw key. There is no lookup by raw value.
    async fn get_by_key_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError>;

    /// Newest first.
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<ApiKey>, AppError>;

    /// Scoped to `user_id`: a key owned by someone else is not touched.
    async fn revoke(&self, id: i64, user_id: i64) -> Result<bool, AppError>;

    /// Scoped to `user_id`: a key owned by someone else is not touched.
    async fn delete(&self, id: i64, user_id: i64) -> Result<bool, AppError>;
}
