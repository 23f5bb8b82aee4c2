//! Registration, activation, login and account lifecycle.
//!
//! # Registration
//!
//! Public registration spans the database and an SMTP relay, so it cannot be
//! one transaction. It runs as a [`Saga`]:
//!
//! 1. Hash the password
//! 2. Create the user (inactive) plus starter data in one transaction
//! 3. Store an activation token (compensation: delete the user)
//! 4. Send the activation email (compensation: delete the token)
//!
//! On any failure after step 2 the recorded compensations run newest first
//! and the caller gets the error that triggered them. The whole flow runs on
//! its own task so a dropped request cannot stop it halfway.
//!
//! Trusted registration (`skip_activation`) stops after step 2 with an
//! active user and returns a session token immediately.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::OnceCell;

use crate::auth::{JwtService, SecretHasher, tokens};
use crate::config::Config;
use crate::error::AppError;
use crate::models::user::{NewUser, User};
use crate::repositories::{ActivationTokenRepository, UserRepository};
use crate::services::email_service::EmailSender;
use crate::services::saga::Saga;

#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn ActivationTokenRepository>,
    email: Arc<dyn EmailSender>,
    hasher: SecretHasher,
    jwt: JwtService,
    activation_ttl: chrono::Duration,
    email_timeout: Duration,
    /// Verified against when a login names no known user, so that path
    /// costs the same Argon2 work as a real password check.
    decoy_hash: Arc<OnceCell<String>>,
}

const DECOY_PASSWORD: &str = "decoy-password-never-assigned";

impl IdentityService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn ActivationTokenRepository>,
        email: Arc<dyn EmailSender>,
        hasher: SecretHasher,
        jwt: JwtService,
        config: &Config,
    ) -> Self {
        Self {
            users,
            tokens,
            email,
            hasher,
            jwt,
            activation_ttl: config.activation_token_ttl(),
            email_timeout: config.email_timeout(),
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Register a new user.
    ///
    /// Returns the created user and a session token. The token is empty for
    /// public registration: no session is granted before activation.
    ///
    /// # Errors
    ///
    /// - `UserAlreadyExists` if the email is taken (including a lost race)
    /// - `EmailDeliveryFailed` if the activation email could not be sent in
    ///   time; nothing from this attempt remains stored
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        language: &str,
        skip_activation: bool,
    ) -> Result<(User, String), AppError> {
        let service = self.clone();
        let email = email.to_string();
        let password = password.to_string();
        let language = language.to_string();

        tokio::spawn(async move {
            service
                .run_registration(email, password, language, skip_activation)
                .await
        })
        .await
        .map_err(|e| AppError::Internal(format!("registration task failed: {e}")))?
    }

    async fn run_registration(
        &self,
        email: String,
        password: String,
        language: String,
        skip_activation: bool,
    ) -> Result<(User, String), AppError> {
        if self.users.get_by_email(&email).await?.is_some() {
            tracing::info!(email = %email, "registration rejected: email already registered");
            return Err(AppError::UserAlreadyExists);
        }

        let password_hash = self.hasher.hash(&password).await?;

        let user = self
            .users
            .create_with_starter_data(NewUser {
                email,
                password_hash,
                language,
                is_active: skip_activation,
            })
            .await?;

        if skip_activation {
            let session = self.jwt.generate_token(user.id, &user.email)?;
            tracing::info!(user_id = user.id, email = %user.email, "user created without activation");
            return Ok((user, session));
        }

        let mut saga = Saga::new("registration");

        let users = self.users.clone();
        let user_id = user.id;
        saga.on_rollback("delete user", move || async move {
            users.delete(user_id).await.map(|_| ())
        });

        let raw_token = tokens::generate_token();
        let expires_at = Utc::now() + self.activation_ttl;
        if let Err(e) = self.tokens.create(user.id, &raw_token, expires_at).await {
            return Err(saga.abort(e).await);
        }

        let token_store = self.tokens.clone();
        let stored_token = raw_token.clone();
        saga.on_rollback("delete activation token", move || async move {
            token_store.delete(&stored_token).await.map(|_| ())
        });

        let send = self
            .email
            .send_activation_email(&user.email, &raw_token, &user.language);
        match tokio::time::timeout(self.email_timeout, send).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(user_id, error = %e, "activation email failed");
                return Err(saga.abort(AppError::EmailDeliveryFailed).await);
            }
            Err(_) => {
                tracing::error!(
                    user_id,
                    timeout_secs = self.email_timeout.as_secs_f64(),
                    "activation email timed out"
                );
                return Err(saga.abort(AppError::EmailDeliveryFailed).await);
            }
        }

        saga.commit();
        tracing::info!(
            user_id,
            email = %user.email,
            token = %tokens::preview(&raw_token),
            "user registered; awaiting activation"
        );

        Ok((user, String::new()))
    }

    /// Redeem an activation token.
    ///
    /// Unknown, used and expired tokens all yield `InvalidActivationToken`.
    /// The token row is consumed before the user is touched, so concurrent
    /// redemptions of one token cannot both succeed. If activating the user
    /// fails the token is put back and the link keeps working.
    pub async fn activate_user(&self, raw_token: &str) -> Result<(), AppError> {
        let Some(record) = self.tokens.consume(raw_token).await? else {
            tracing::debug!(token = %tokens::preview(raw_token), "activation token not found");
            return Err(AppError::InvalidActivationToken);
        };

        if record.is_expired() {
            tracing::info!(user_id = record.user_id, "activation token expired");
            return Err(AppError::InvalidActivationToken);
        }

        let mut saga = Saga::new("activation");
        let token_store = self.tokens.clone();
        let user_id = record.user_id;
        let expires_at = record.expires_at;
        let token = record.token;
        saga.on_rollback("restore activation token", move || async move {
            token_store
                .create(user_id, &token, expires_at)
                .await
                .map(|_| ())
        });

        match self.users.activate(user_id).await {
            Ok(true) => {
                saga.commit();
                tracing::info!(user_id, "user activated");
                Ok(())
            }
            Ok(false) => {
                saga.commit();
                Err(AppError::InvalidActivationToken)
            }
            Err(e) => Err(saga.abort(e).await),
        }
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown email and wrong password are the same `InvalidCredentials`.
    /// Correct credentials on an inactive account give `UserNotActivated`.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AppError> {
        let Some(user) = self.users.get_by_email(email).await? else {
            let decoy = self
                .decoy_hash
                .get_or_try_init(|| self.hasher.hash(DECOY_PASSWORD))
                .await?;
            self.hasher.verify(decoy, password).await?;
            tracing::debug!("login failed: unknown email");
            return Err(AppError::InvalidCredentials);
        };

        if !self.hasher.verify(&user.password_hash, password).await? {
            tracing::debug!(user_id = user.id, "login failed: password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            tracing::info!(user_id = user.id, "login refused: account not activated");
            return Err(AppError::UserNotActivated);
        }

        let session = self.jwt.generate_token(user.id, &user.email)?;
        tracing::info!(user_id = user.id, "user logged in");

        Ok((user, session))
    }

    pub async fn get_current_user(&self, user_id: i64) -> Result<User, AppError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    /// Hard delete. Tokens, keys and tracked data go with the user row.
    pub async fn delete_account(&self, user_id: i64) -> Result<(), AppError> {
        if !self.users.delete(user_id).await? {
            return Err(AppError::UserNotFound);
        }
        tracing::info!(user_id, "account deleted");
        Ok(())
    }

    /// Bulk delete activation tokens whose window has closed.
    pub async fn purge_expired_activation_tokens(&self) -> Result<u64, AppError> {
        let purged = self.tokens.delete_expired(Utc::now()).await?;
        tracing::info!(purged, "expired activation tokens removed");
        Ok(purged)
    }
}
