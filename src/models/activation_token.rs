//! Email activation token model.

use chrono::{DateTime, Utc};

/// Single-use, time-boxed proof that a registrant controls their email.
///
/// # Database Table
///
/// Maps to `activation_tokens`. `token` is the external lookup key; the
/// numeric `id` is never exposed. Rows are created at registration, deleted
/// on activation or by the expiry sweep, and never updated.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivationToken {
    pub id: i64,
    pub user_id: i64,

    /// 64 hex characters of CSPRNG output, embedded in the activation link
    pub token: String,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ActivationToken {
    /// A token is usable only while `now < expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let token = ActivationToken {
            id: 1,
            user_id: 1,
            token: "t".repeat(64),
            created_at: now - Duration::hours(24),
            expires_at: now,
        };

        assert!(!token.is_expired_at(now - Duration::seconds(1)));
        assert!(token.is_expired_at(now));
        assert!(token.is_expired_at(now + Duration::seconds(1)));
    }
}
