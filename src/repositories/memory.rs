//! In-memory stores for unit tests.
//!
//! One [`MemoryStore`] implements all three store traits over shared maps,
//! with switches to make individual operations fail.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::activation_token::ActivationToken;
use crate::models::api_key::{ApiKey, NewApiKey};
use crate::models::user::{NewUser, User};

use super::{ActivationTokenRepository, ApiKeyRepository, UserRepository};

#[derive(Default)]
pub struct MemoryStore {
    next_id: AtomicI64,
    users: Mutex<Vec<User>>,
    tokens: Mutex<Vec<ActivationToken>>,
    keys: Mutex<Vec<ApiKey>>,

    pub fail_user_create: AtomicBool,
    pub fail_user_activate: AtomicBool,
    pub fail_user_delete: AtomicBool,
    pub fail_token_create: AtomicBool,
    pub fail_token_delete: AtomicBool,
}

fn injected(what: &str) -> AppError {
    AppError::Internal(format!("injected failure: {what}"))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn users(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    pub fn tokens(&self) -> Vec<ActivationToken> {
        self.tokens.lock().unwrap().clone()
    }

    pub fn keys(&self) -> Vec<ApiKey> {
        self.keys.lock().unwrap().clone()
    }

    pub fn tokens_for(&self, user_id: i64) -> Vec<ActivationToken> {
        self.tokens()
            .into_iter()
            .filter(|t| t.user_id == user_id)
            .collect()
    }

    /// Store a token row directly, bypassing the registration flow.
    pub fn insert_token(&self, user_id: i64, token: &str, expires_at: DateTime<Utc>) {
        let row = ActivationToken {
            id: self.id(),
            user_id,
            token: token.to_string(),
            created_at: Utc::now(),
            expires_at,
        };
        self.tokens.lock().unwrap().push(row);
    }

    /// Overwrite a key row's expiry.
    pub fn set_key_expiry(&self, id: i64, expires_at: Option<DateTime<Utc>>) {
        let mut keys = self.keys.lock().unwrap();
        if let Some(key) = keys.iter_mut().find(|k| k.id == id) {
            key.expires_at = expires_at;
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_with_starter_data(&self, user: NewUser) -> Result<User, AppError> {
        if self.fail_user_create.load(Ordering::SeqCst) {
            return Err(injected("user create"));
        }

        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::UserAlreadyExists);
        }

        let now = Utc::now();
        let row = User {
            id: self.id(),
            email: user.email,
            password_hash: user.password_hash,
            first_name: None,
            last_name: None,
            age: None,
            height: None,
            gender: None,
            language: user.language,
            activity_level: None,
            is_active: user.is_active,
            created_at: now,
            updated_at: now,
        };
        users.push(row.clone());
        Ok(row)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn activate(&self, id: i64) -> Result<bool, AppError> {
        if self.fail_user_activate.load(Ordering::SeqCst) {
            return Err(injected("user activate"));
        }

        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.is_active = true;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        if self.fail_user_delete.load(Ordering::SeqCst) {
            return Err(injected("user delete"));
        }

        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

#[async_trait]
impl ActivationTokenRepository for MemoryStore {
    async fn create(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<ActivationToken, AppError> {
        if self.fail_token_create.load(Ordering::SeqCst) {
            return Err(injected("token create"));
        }

        let row = ActivationToken {
            id: self.id(),
            user_id,
            token: token.to_string(),
            created_at: Utc::now(),
            expires_at,
        };
        self.tokens.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn consume(&self, token: &str) -> Result<Option<ActivationToken>, AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        let position = tokens.iter().position(|t| t.token == token);
        Ok(position.map(|i| tokens.remove(i)))
    }

    async fn delete(&self, token: &str) -> Result<bool, AppError> {
        if self.fail_token_delete.load(Ordering::SeqCst) {
            return Err(injected("token delete"));
        }

        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| t.token != token);
        Ok(tokens.len() < before)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| t.expires_at > now);
        Ok((before - tokens.len()) as u64)
    }
}

#[async_trait]
impl ApiKeyRepository for MemoryStore {
    async fn create(&self, key: NewApiKey) -> Result<ApiKey, AppError> {
        let row = ApiKey {
            id: self.id(),
            user_id: key.user_id,
            name: key.name,
            key_hash: key.key_hash,
            key_prefix: key.key_prefix,
            expires_at: key.expires_at,
            is_revoked: false,
            created_at: Utc::now(),
        };
        self.keys.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn get_by_key_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError> {
        Ok(self
            .keys
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.key_hash == key_hash)
            .cloned())
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<ApiKey>, AppError> {
        let mut keys: Vec<ApiKey> = self
            .keys
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.user_id == user_id)
            .cloned()
            .collect();
        keys.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(keys)
    }

    async fn revoke(&self, id: i64, user_id: i64) -> Result<bool, AppError> {
        let mut keys = self.keys.lock().unwrap();
        match keys.iter_mut().find(|k| k.id == id && k.user_id == user_id) {
            Some(key) => {
                key.is_revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64, user_id: i64) -> Result<bool, AppError> {
        let mut keys = self.keys.lock().unwrap();
        let before = keys.len();
        keys.retain(|k| !(k.id == id && k.user_id == user_id));
        Ok(keys.len() < before)
    }
}
