//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Credential Errors**: bad login, unactivated account, bad or missing bearer token
/// - **Registration Errors**: duplicate email, dead activation link, undeliverable email
/// - **API Key Errors**: unknown, revoked or expired machine keys
/// - **Resource Errors**: requested user or key not found for the caller
/// - **Infrastructure Errors**: database and other internal failures (details hidden)
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// Returns HTTP 500 without exposing the underlying message.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unknown email or wrong password. Both cases share this variant so the
    /// response never reveals which half failed.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Password matched but the account has not been activated yet.
    ///
    /// Returns HTTP 403 so the client can prompt for activation.
    #[error("Account is not activated")]
    UserNotActivated,

    #[error("User already exists")]
    UserAlreadyExists,

    /// Activation token is unknown, already used or expired.
    #[error("Invalid or expired activation token")]
    InvalidActivationToken,

    /// The activation email could not be sent; registration was rolled back.
    ///
    /// Returns HTTP 503.
    #[error("Failed to send activation email")]
    EmailDeliveryFailed,

    #[error("Invalid API key")]
    ApiKeyInvalid,

    #[error("API key has been revoked")]
    ApiKeyRevoked,

    #[error("API key has expired")]
    ApiKeyExpired,

    /// Key does not exist or belongs to another user.
    #[error("API key not found")]
    ApiKeyNotFound,

    #[error("User not found")]
    UserNotFound,

    /// No usable credential was presented.
    #[error("Authentication required")]
    MissingCredentials,

    /// Bearer token failed signature, structure or expiry checks.
    #[error("Invalid or expired token")]
    TokenValidationFailed,

    /// Request body or parameters are invalid.
    ///
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// Non-database internal failure (hashing, signing, task join).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for the three API key rejections, which callers must not tell apart.
    pub fn is_api_key_rejection(&self) -> bool {
        matches!(
            self,
            AppError::ApiKeyInvalid | AppError::ApiKeyRevoked | AppError::ApiKeyExpired
        )
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidCredentials`, `MissingCredentials`, `TokenValidationFailed` → 401
/// - `ApiKeyInvalid`, `ApiKeyRevoked`, `ApiKeyExpired` → 401 with one shared message
/// - `UserNotActivated` → 403
/// - `UserNotFound`, `ApiKeyNotFound` → 404
/// - `UserAlreadyExists` → 409
/// - `InvalidActivationToken`, `InvalidRequest` → 400
/// - `EmailDeliveryFailed` → 503
/// - `Database`, `Internal` → 500 (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
            AppError::UserNotActivated => (
                StatusCode::FORBIDDEN,
                "user_not_activated",
                "Account is not activated. Check your email for the activation link.".to_string(),
            ),
            AppError::UserAlreadyExists => {
                (StatusCode::CONFLICT, "user_already_exists", self.to_string())
            }
            AppError::InvalidActivationToken => (
                StatusCode::BAD_REQUEST,
                "invalid_activation_token",
                self.to_string(),
            ),
            AppError::EmailDeliveryFailed => (
                StatusCode::SERVICE_UNAVAILABLE,
                "email_delivery_failed",
                "Could not send the activation email. Please try registering again later."
                    .to_string(),
            ),
            AppError::ApiKeyInvalid | AppError::ApiKeyRevoked | AppError::ApiKeyExpired => (
                StatusCode::UNAUTHORIZED,
                "invalid_api_key",
                "Invalid or expired API key".to_string(),
            ),
            AppError::ApiKeyNotFound => {
                (StatusCode::NOT_FOUND, "api_key_not_found", self.to_string())
            }
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found", self.to_string()),
            AppError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string())
            }
            AppError::TokenValidationFailed => {
                (StatusCode::UNAUTHORIZED, "invalid_token", self.to_string())
            }
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Database(ref e) => {
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Internal(ref msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_api_key_rejections_are_indistinguishable() {
        let (s1, b1) = body_json(AppError::ApiKeyInvalid).await;
        let (s2, b2) = body_json(AppError::ApiKeyRevoked).await;
        let (s3, b3) = body_json(AppError::ApiKeyExpired).await;

        assert_eq!(s1, StatusCode::UNAUTHORIZED);
        assert_eq!(s1, s2);
        assert_eq!(s2, s3);
        assert_eq!(b1, b2);
        assert_eq!(b2, b3);
    }

    #[tokio::test]
    async fn test_database_error_hides_details() {
        let (status, body) = body_json(AppError::Database(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "internal_error");
        assert_eq!(body["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn test_domain_status_codes() {
        assert_eq!(
            AppError::UserNotActivated.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::UserAlreadyExists.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::InvalidActivationToken.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::EmailDeliveryFailed.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
