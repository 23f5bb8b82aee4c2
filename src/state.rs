//! Shared application state, built once at startup.

use std::sync::Arc;

use crate::auth::{JwtService, SecretHasher};
use crate::config::Config;
use crate::db::DbPool;
use crate::repositories::{PgActivationTokenRepository, PgApiKeyRepository, PgUserRepository};
use crate::services::{ApiKeyService, EmailSender, IdentityService};

/// Handed to every handler and middleware through `State`.
///
/// Cloning is cheap: the pool and services are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub jwt: JwtService,
    pub identity: IdentityService,
    pub api_keys: ApiKeyService,
}

impl AppState {
    /// Wire the Postgres stores and the given mailer into the services.
    pub fn new(pool: DbPool, config: &Config, email: Arc<dyn EmailSender>) -> Self {
        let jwt = JwtService::new(
            &config.jwt_secret,
            chrono::Duration::hours(config.jwt_expiry_hours),
        );

        let identity = IdentityService::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgActivationTokenRepository::new(pool.clone())),
            email,
            SecretHasher::default(),
            jwt.clone(),
            config,
        );
        let api_keys = ApiKeyService::new(Arc::new(PgApiKeyRepository::new(pool.clone())));

        Self {
            pool,
            jwt,
            identity,
            api_keys,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State backed by in-memory stores. The pool is lazy and never
    /// connects unless a handler queries it.
    pub fn for_tests(
        store: Arc<crate::repositories::memory::MemoryStore>,
        email: Arc<dyn EmailSender>,
    ) -> Self {
        let config = Config::for_tests();
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let jwt = JwtService::new(&config.jwt_secret, chrono::Duration::hours(1));

        let identity = IdentityService::new(
            store.clone(),
            store.clone(),
            email,
            SecretHasher::fast_for_tests(),
            jwt.clone(),
            &config,
        );

        Self {
            pool,
            jwt,
            identity,
            api_keys: ApiKeyService::new(store),
        }
    }
}
