//! API key management HTTP handlers.
//!
//! All routes sit behind the bearer chain and act on the caller's own keys:
//! - POST /api/api-keys - Create key (raw key returned once)
//! - GET /api/api-keys - List keys
//! - POST /api/api-keys/{id}/revoke - Revoke key
//! - DELETE /api/api-keys/{id} - Delete key

use crate::{
    error::AppError,
    middleware::auth::AuthUser,
    models::{
        api_key::{ApiKeyResponse, CreateApiKeyRequest, CreatedApiKeyResponse},
        user::MessageResponse,
    },
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

/// Create a new API key.
///
/// # Request Body
///
/// ```json
/// { "name": "Home Assistant", "expiry_days": 90 }
/// ```
///
/// # Response (201 Created)
///
/// ```json
/// {
///   "id": 3,
///   "name": "Home Assistant",
///   "key": "9f2c...64 hex chars",
///   "key_prefix": "9f2c41d0",
///   "expires_at": "2026-01-15T10:00:00Z",
///   "created_at": "2025-10-17T10:00:00Z"
/// }
/// ```
///
/// # Security
///
/// `key` appears in this response only. Store it immediately.
pub async fn create_api_key(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<CreatedApiKeyResponse>), AppError> {
    request.validate().map_err(AppError::InvalidRequest)?;

    let (key, raw_key) = state
        .api_keys
        .create_key(auth.user_id, &request.name, request.expiry_days)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedApiKeyResponse::new(key, raw_key)),
    ))
}

/// List the caller's keys, newest first. Hashes and raw keys are never included.
pub async fn list_api_keys(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ApiKeyResponse>>, AppError> {
    let keys = state.api_keys.list_keys(auth.user_id).await?;
    Ok(Json(keys.into_iter().map(ApiKeyResponse::from).collect()))
}

/// Revoke a key. Returns 404 if the key doesn't exist OR belongs to another user.
pub async fn revoke_api_key(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    state.api_keys.revoke_key(id, auth.user_id).await?;

    Ok(Json(MessageResponse {
        message: "API key revoked".to_string(),
    }))
}

/// Delete a key. Same ownership rule as revoke.
pub async fn delete_api_key(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.api_keys.delete_key(id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
