//! User data models and auth request/response types.
//!
//! This module defines:
//! - `User`: Database entity representing an identity record
//! - `NewUser`: Values written by the registration flows
//! - Request/response bodies for register, login and current-user endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Language used when a registrant does not pick one.
pub const DEFAULT_LANGUAGE: &str = "en_US";

/// Language codes with reference data and email templates.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en_US", "uk_UA", "ru_UA", "bg_BG"];

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Represents a user record from the database.
///
/// # Database Table
///
/// Maps to the `users` table. `email` is unique (constraint `users_email_key`)
/// and compared exactly as stored.
///
/// # Activation
///
/// Web registrations start with `is_active = false` and cannot log in until
/// an activation token is redeemed. Trusted (CLI) creation starts active.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,

    pub email: String,

    /// Argon2id PHC string. Never serialized.
    pub password_hash: String,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub gender: Option<String>,

    /// Preferred language; also selects the starter ingredient set
    pub language: String,

    pub activity_level: Option<String>,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values needed to insert a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub language: String,
    pub is_active: bool,
}

/// Request body for `POST /api/auth/register`.
///
/// # JSON Example
///
/// ```json
/// {
///   "email": "alice@example.com",
///   "password": "hunter22",
///   "language_code": "en_US"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,

    #[serde(default = "default_language")]
    pub language_code: String,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl RegisterRequest {
    /// Boundary checks applied before the registration flow runs.
    pub fn validate(&self) -> Result<(), String> {
        let email = self.email.trim();
        let Some((local, domain)) = email.split_once('@') else {
            return Err("A valid email address is required".to_string());
        };
        if local.is_empty() || domain.is_empty() || email.len() > 255 {
            return Err("A valid email address is required".to_string());
        }

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            ));
        }

        if !SUPPORTED_LANGUAGES.contains(&self.language_code.as_str()) {
            return Err(format!(
                "Unsupported language_code; expected one of {}",
                SUPPORTED_LANGUAGES.join(", ")
            ));
        }

        Ok(())
    }
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct ResponseUser {
    pub email: String,
}

/// Returned by login and by trusted registration.
///
/// ```json
/// { "token": "eyJhbGciOi...", "user": { "email": "alice@example.com" } }
/// ```
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: ResponseUser,
}

/// Returned by public registration; no session is granted until activation.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Profile returned by `GET /api/auth/me`.
///
/// Omits `password_hash`.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub gender: Option<String>,
    pub language: String,
    pub activity_level: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            age: user.age,
            height: user.height,
            gender: user.gender,
            language: user.language,
            activity_level: user.activity_level,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, password: &str, language: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            language_code: language.to_string(),
        }
    }

    #[test]
    fn test_register_request_validation() {
        assert!(request("alice@example.com", "hunter22", "en_US").validate().is_ok());
        assert!(request("alice@example.com", "hunter22", "uk_UA").validate().is_ok());

        assert!(request("alice.example.com", "hunter22", "en_US").validate().is_err());
        assert!(request("@example.com", "hunter22", "en_US").validate().is_err());
        assert!(request("alice@", "hunter22", "en_US").validate().is_err());
        assert!(request("alice@example.com", "12345", "en_US").validate().is_err());
        assert!(request("alice@example.com", "hunter22", "xx_XX").validate().is_err());
    }

    #[test]
    fn test_register_request_defaults_language() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@b.c","password":"secret1"}"#).unwrap();
        assert_eq!(req.language_code, DEFAULT_LANGUAGE);
    }
}
