//! API Key model for machine-to-machine authentication.
//!
//! API keys authenticate clients of the data endpoint. They are stored in the
//! database as SHA-256 hashes plus a short display prefix; the raw key is
//! shown to its owner exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on `expiry_days` (ten years).
pub const MAX_EXPIRY_DAYS: i64 = 3650;

/// Upper bound on key name length.
pub const MAX_NAME_LENGTH: usize = 100;

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table with columns:
/// - `id`: Unique identifier
/// - `user_id`: Owner
/// - `name`: Label chosen by the owner
/// - `key_hash`: SHA-256 hash of the raw key
/// - `key_prefix`: First 8 characters of the raw key, for display only
/// - `expires_at`: Optional expiry; `NULL` never expires
/// - `is_revoked`: One-way revocation flag
/// - `created_at`: When the key was created
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    pub id: i64,

    pub user_id: i64,

    pub name: String,

    /// SHA-256 hash of the actual API key (64 hex characters)
    ///
    /// When a request comes in with `X-API-Key: abc123`, we:
    /// 1. Hash "abc123" with SHA-256
    /// 2. Look up this hash in the database
    /// 3. Check revocation and expiry on the row found
    pub key_hash: String,

    pub key_prefix: String,

    pub expires_at: Option<DateTime<Utc>>,

    /// Revoked keys are rejected during authentication but kept for listing.
    pub is_revoked: bool,

    pub created_at: DateTime<Utc>,
}

impl ApiKey {
    /// Keys without `expires_at` never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if now >= expires_at)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_valid(&self) -> bool {
        !self.is_revoked && !self.is_expired()
    }
}

/// Values needed to insert an API key row.
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub user_id: i64,
    pub name: String,
    pub key_hash: String,
    pub key_prefix: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request body for `POST /api/api-keys`.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "Home Assistant",
///   "expiry_days": 90
/// }
/// ```
///
/// # Validation
///
/// - `name`: 1 to 100 characters
/// - `expiry_days`: Optional, 1 to 3650; absent means the key never expires
#[derive(Debug, Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: String,

    #[serde(default)]
    pub expiry_days: Option<i64>,
}

impl CreateApiKeyRequest {
    pub fn validate(&self) -> Result<(), String> {
        let name_len = self.name.trim().chars().count();
        if name_len == 0 || name_len > MAX_NAME_LENGTH {
            return Err(format!(
                "name must be between 1 and {MAX_NAME_LENGTH} characters"
            ));
        }
        if let Some(days) = self.expiry_days {
            if !(1..=MAX_EXPIRY_DAYS).contains(&days) {
                return Err(format!(
                    "expiry_days must be between 1 and {MAX_EXPIRY_DAYS}"
                ));
            }
        }
        Ok(())
    }
}

/// API key as listed to its owner. Never includes the hash or raw key.
#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub id: i64,
    pub name: String,
    pub key_prefix: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            name: key.name,
            key_prefix: key.key_prefix,
            expires_at: key.expires_at,
            is_revoked: key.is_revoked,
            created_at: key.created_at,
        }
    }
}

/// Creation response. `key` is the raw key and this is the only time it is returned.
#[derive(Debug, Serialize)]
pub struct CreatedApiKeyResponse {
    pub id: i64,
    pub name: String,
    pub key: String,
    pub key_prefix: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl CreatedApiKeyResponse {
    pub fn new(key: ApiKey, raw_key: String) -> Self {
        Self {
            id: key.id,
            name: key.name,
            key: raw_key,
            key_prefix: key.key_prefix,
            expires_at: key.expires_at,
            created_at: key.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn key(expires_at: Option<DateTime<Utc>>, is_revoked: bool) -> ApiKey {
        ApiKey {
            id: 1,
            user_id: 1,
            name: "test".to_string(),
            key_hash: "0".repeat(64),
            key_prefix: "01234567".to_string(),
            expires_at,
            is_revoked,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_validity_rules() {
        let now = Utc::now();
        assert!(key(None, false).is_valid());
        assert!(key(Some(now + Duration::days(1)), false).is_valid());
        assert!(!key(Some(now - Duration::seconds(1)), false).is_valid());
        assert!(!key(None, true).is_valid());
        assert!(!key(Some(now + Duration::days(1)), true).is_valid());
    }

    #[test]
    fn test_create_request_validation() {
        let req = |name: &str, days: Option<i64>| CreateApiKeyRequest {
            name: name.to_string(),
            expiry_days: days,
        };
        assert!(req("laptop", None).validate().is_ok());
        assert!(req("laptop", Some(1)).validate().is_ok());
        assert!(req("laptop", Some(MAX_EXPIRY_DAYS)).validate().is_ok());
        assert!(req("", None).validate().is_err());
        assert!(req("   ", None).validate().is_err());
        assert!(req(&"x".repeat(101), None).validate().is_err());
        assert!(req("laptop", Some(0)).validate().is_err());
        assert!(req("laptop", Some(MAX_EXPIRY_DAYS + 1)).validate().is_err());
    }

    #[test]
    fn test_response_never_exposes_hash() {
        let json = serde_json::to_value(ApiKeyResponse::from(key(None, false))).unwrap();
        assert!(json.get("key_hash").is_none());
        assert!(json.get("key").is_none());
        assert_eq!(json["key_prefix"], "01234567");
    }
}
