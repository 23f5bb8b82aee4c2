//! API key authentication middleware for machine routes.

use crate::{error::AppError, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Identity attached to requests that passed the API key chain.
#[derive(Debug, Clone)]
pub struct ApiKeyPrincipal {
    pub user_id: i64,
    pub api_key_id: i64,
}

/// # Flow
///
/// 1. Read the raw key from `X-API-Key`; absent means 401
/// 2. Hash it and resolve the stored key (unknown, revoked and expired keys
///    all become the same 401 response)
/// 3. Inject `ApiKeyPrincipal` and call the next handler
pub async fn require_api_key(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let raw_key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(AppError::MissingCredentials)?;

    let key = state.api_keys.validate_key(raw_key).await?;

    request.extensions_mut().insert(ApiKeyPrincipal {
        user_id: key.user_id,
        api_key_id: key.id,
    });

    Ok(next.run(request).await)
}
