//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;
use std::time::Duration;

/// Minimum JWT secret length (bytes) accepted in production.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Placeholder secrets that ship in sample `.env` files and must never sign real tokens.
const INSECURE_JWT_SECRETS: &[&str] = &[
    "default-secret-key",
    "your-jwt-secret-key-change-this-in-production",
    "a-very-secret-key",
    "changeme",
    "secret",
];

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `JWT_SECRET` (required): HS256 signing secret for session tokens
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `JWT_EXPIRY_HOURS` (optional): session token lifetime, defaults to 24
/// - `ENVIRONMENT` (optional): `development` or `production`
/// - `APP_URL` (optional): public base URL used in activation links
/// - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER`, `SMTP_PASSWORD`, `SMTP_FROM`: outbound mail relay
/// - `EMAIL_TIMEOUT_SECS` (optional): upper bound on one activation email send
/// - `ACTIVATION_TOKEN_TTL_HOURS` (optional): activation link validity window
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    pub jwt_secret: String,

    #[serde(default = "default_jwt_expiry_hours")]
    pub jwt_expiry_hours: i64,

    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_app_url")]
    pub app_url: String,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_user: String,

    #[serde(default)]
    pub smtp_password: String,

    #[serde(default = "default_smtp_from")]
    pub smtp_from: String,

    #[serde(default = "default_email_timeout_secs")]
    pub email_timeout_secs: u64,

    #[serde(default = "default_activation_token_ttl_hours")]
    pub activation_token_ttl_hours: i64,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_jwt_expiry_hours() -> i64 {
    24
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_app_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_from() -> String {
    "noreply@nutrition-tracker.local".to_string()
}

fn default_email_timeout_secs() -> u64 {
    10
}

fn default_activation_token_ttl_hours() -> i64 {
    24
}

/// Configuration values that parse but cannot be used to run the server.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("JWT_SECRET is a known placeholder value; set a unique secret")]
    InsecureJwtSecret,

    #[error("JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} bytes in production (got {0})")]
    JwtSecretTooShort(usize),

    #[error("{0} must be positive")]
    NonPositive(&'static str),

    #[error("APP_URL is not a valid URL: {0}")]
    InvalidAppUrl(#[from] url::ParseError),
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL, JWT_SECRET)
    /// - Environment variable values cannot be parsed into expected types
    /// - The loaded values fail [`Config::validate`]
    pub fn from_env() -> Result<Self, ConfigError> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: jwt_secret -> JWT_SECRET
        let config = envy::from_env::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make issued credentials unsafe.
    ///
    /// A placeholder secret is always rejected. A short secret is rejected in
    /// production and tolerated with a warning elsewhere.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secret = self.jwt_secret.trim();
        if secret.is_empty() || INSECURE_JWT_SECRETS.contains(&secret) {
            return Err(ConfigError::InsecureJwtSecret);
        }

        if self.jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            if self.is_production() {
                return Err(ConfigError::JwtSecretTooShort(self.jwt_secret.len()));
            }
            tracing::warn!(
                length = self.jwt_secret.len(),
                minimum = MIN_JWT_SECRET_LENGTH,
                "JWT_SECRET is shorter than recommended; this is rejected in production"
            );
        }

        if self.jwt_expiry_hours <= 0 {
            return Err(ConfigError::NonPositive("JWT_EXPIRY_HOURS"));
        }
        if self.activation_token_ttl_hours <= 0 {
            return Err(ConfigError::NonPositive("ACTIVATION_TOKEN_TTL_HOURS"));
        }
        if self.email_timeout_secs == 0 {
            return Err(ConfigError::NonPositive("EMAIL_TIMEOUT_SECS"));
        }

        url::Url::parse(&self.app_url)?;

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn email_timeout(&self) -> Duration {
        Duration::from_secs(self.email_timeout_secs)
    }

    pub fn activation_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.activation_token_ttl_hours)
    }
}

#[cfg(test)]
impl Config {
    /// A valid development configuration for tests that never touch the network.
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/nutrition_tracker_test".to_string(),
            server_port: default_port(),
            jwt_secret: "test-jwt-secret-with-enough-length-0123456789".to_string(),
            jwt_expiry_hours: default_jwt_expiry_hours(),
            environment: default_environment(),
            app_url: default_app_url(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_user: String::new(),
            smtp_password: String::new(),
            smtp_from: default_smtp_from(),
            email_timeout_secs: 1,
            activation_token_ttl_hours: default_activation_token_ttl_hours(),
        }
    }
}
