//! API key lifecycle and validation.
//!
//! Raw keys exist only in the creation response. Storage holds the SHA-256
//! of the key plus an 8-character display prefix, and validation looks keys
//! up by that hash.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::auth::tokens;
use crate::error::AppError;
use crate::models::api_key::{ApiKey, MAX_EXPIRY_DAYS, NewApiKey};
use crate::repositories::ApiKeyRepository;

#[derive(Clone)]
pub struct ApiKeyService {
    keys: Arc<dyn ApiKeyRepository>,
}

impl ApiKeyService {
    pub fn new(keys: Arc<dyn ApiKeyRepository>) -> Self {
        Self { keys }
    }

    /// Create a key for `user_id`.
    ///
    /// Returns the stored row and the raw key. The raw key cannot be
    /// recovered afterwards. `expiry_days` outside `1..=MAX_EXPIRY_DAYS`
    /// is an `InvalidRequest`.
    pub async fn create_key(
        &self,
        user_id: i64,
        name: &str,
        expiry_days: Option<i64>,
    ) -> Result<(ApiKey, String), AppError> {
        let expires_at = expiry_days.map(expiry_from_now).transpose()?;
        let raw_key = tokens::generate_token();

        let key = self
            .keys
            .create(NewApiKey {
                user_id,
                name: name.trim().to_string(),
                key_hash: tokens::hash_token(&raw_key),
                key_prefix: tokens::key_prefix(&raw_key).to_string(),
                expires_at,
            })
            .await?;

        tracing::info!(
            user_id,
            api_key_id = key.id,
            prefix = %key.key_prefix,
            "api key created"
        );

        Ok((key, raw_key))
    }

    /// Resolve a presented key to its row.
    ///
    /// # Errors
    ///
    /// `ApiKeyInvalid`, `ApiKeyRevoked` or `ApiKeyExpired`. Callers should
    /// answer all three the same way.
    pub async fn validate_key(&self, raw_key: &str) -> Result<ApiKey, AppError> {
        let key_hash = tokens::hash_token(raw_key);

        let Some(key) = self.keys.get_by_key_hash(&key_hash).await? else {
            tracing::warn!(key = %tokens::preview(raw_key), "unknown api key");
            return Err(AppError::ApiKeyInvalid);
        };

        if key.is_valid() {
            return Ok(key);
        }

        if key.is_revoked {
            tracing::warn!(api_key_id = key.id, user_id = key.user_id, "revoked api key presented");
            return Err(AppError::ApiKeyRevoked);
        }

        tracing::warn!(api_key_id = key.id, user_id = key.user_id, "expired api key presented");
        Err(AppError::ApiKeyExpired)
    }

    pub async fn list_keys(&self, user_id: i64) -> Result<Vec<ApiKey>, AppError> {
        self.keys.list_by_user(user_id).await
    }

    /// Keys owned by another user count as not found.
    pub async fn revoke_key(&self, id: i64, user_id: i64) -> Result<(), AppError> {
        if !self.keys.revoke(id, user_id).await? {
            return Err(AppError::ApiKeyNotFound);
        }
        tracing::info!(user_id, api_key_id = id, "api key revoked");
        Ok(())
    }

    /// Keys owned by another user count as not found.
    pub async fn delete_key(&self, id: i64, user_id: i64) -> Result<(), AppError> {
        if !self.keys.delete(id, user_id).await? {
            return Err(AppError::ApiKeyNotFound);
        }
        tracing::info!(user_id, api_key_id = id, "api key deleted");
        Ok(())
    }
}

fn expiry_from_now(days: i64) -> Result<DateTime<Utc>, AppError> {
    let invalid =
        || AppError::InvalidRequest(format!("expiry_days must be between 1 and {MAX_EXPIRY_DAYS}"));

    if !(1..=MAX_EXPIRY_DAYS).contains(&days) {
        return Err(invalid());
    }
    Duration::try_days(days)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryStore;

    fn service() -> (ApiKeyService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (ApiKeyService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_create_key_stores_hash_and_prefix_only() {
        let (service, store) = service();

        let (key, raw) = service.create_key(7, "  Home Assistant ", Some(30)).await.unwrap();

        assert_eq!(raw.len(), 64);
        assert_eq!(key.name, "Home Assistant");
        assert_eq!(key.key_prefix, &raw[..8]);
        assert_eq!(key.key_hash, tokens::hash_token(&raw));
        assert_ne!(key.key_hash, raw);
        assert!(key.expires_at.unwrap() > Utc::now() + Duration::days(29));

        let stored = store.keys();
        assert_eq!(stored.len(), 1);
        assert!(stored.iter().all(|k| k.key_hash != raw));
    }

    #[tokio::test]
    async fn test_create_key_rejects_out_of_range_expiry() {
        let (service, store) = service();

        for days in [0, -1, MAX_EXPIRY_DAYS + 1, i64::MAX, i64::MIN] {
            let err = service.create_key(1, "bad", Some(days)).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidRequest(_)), "days = {days}");
        }
        assert!(store.keys().is_empty());

        let (key, _) = service.create_key(1, "long", Some(MAX_EXPIRY_DAYS)).await.unwrap();
        assert!(key.expires_at.unwrap() > Utc::now() + Duration::days(MAX_EXPIRY_DAYS - 1));
    }

    #[tokio::test]
    async fn test_key_without_expiry_never_expires() {
        let (service, _) = service();
        let (key, raw) = service.create_key(1, "forever", None).await.unwrap();

        assert!(key.expires_at.is_none());
        assert_eq!(service.validate_key(&raw).await.unwrap().id, key.id);
    }

    #[tokio::test]
    async fn test_validate_key_until_revoked() {
        let (service, _) = service();
        let (key, raw) = service.create_key(1, "script", None).await.unwrap();

        for _ in 0..3 {
            assert_eq!(service.validate_key(&raw).await.unwrap().user_id, 1);
        }

        service.revoke_key(key.id, 1).await.unwrap();

        let err = service.validate_key(&raw).await.unwrap_err();
        assert!(matches!(err, AppError::ApiKeyRevoked));
        assert!(err.is_api_key_rejection());
    }

    #[tokio::test]
    async fn test_expired_key_is_rejected() {
        let (service, store) = service();
        let (key, raw) = service.create_key(1, "old", Some(1)).await.unwrap();
        store.set_key_expiry(key.id, Some(Utc::now() - Duration::seconds(1)));

        let err = service.validate_key(&raw).await.unwrap_err();
        assert!(matches!(err, AppError::ApiKeyExpired));
    }

    #[tokio::test]
    async fn test_unknown_key_is_invalid() {
        let (service, _) = service();
        let err = service.validate_key(&"f".repeat(64)).await.unwrap_err();
        assert!(matches!(err, AppError::ApiKeyInvalid));
    }

    #[tokio::test]
    async fn test_other_users_key_is_not_found() {
        let (service, _) = service();
        let (key, raw) = service.create_key(1, "mine", None).await.unwrap();

        assert!(matches!(
            service.revoke_key(key.id, 2).await,
            Err(AppError::ApiKeyNotFound)
        ));
        assert!(matches!(
            service.delete_key(key.id, 2).await,
            Err(AppError::ApiKeyNotFound)
        ));

        assert!(service.validate_key(&raw).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_and_list() {
        let (service, _) = service();
        let (first, _) = service.create_key(1, "first", None).await.unwrap();
        service.create_key(1, "second", None).await.unwrap();
        service.create_key(2, "someone else", None).await.unwrap();

        assert_eq!(service.list_keys(1).await.unwrap().len(), 2);

        service.delete_key(first.id, 1).await.unwrap();

        let remaining = service.list_keys(1).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "second");
        assert!(matches!(
            service.delete_key(first.id, 1).await,
            Err(AppError::ApiKeyNotFound)
        ));
    }
}
