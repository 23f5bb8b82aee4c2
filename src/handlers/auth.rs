//! Account HTTP handlers.
//!
//! This module implements the user-facing identity endpoints:
//! - POST /api/auth/register - Public registration (sends activation email)
//! - POST /api/auth/login - Exchange credentials for a session token
//! - GET /api/auth/activate/{token} - Redeem an activation link
//! - GET /api/auth/me - Current user profile
//! - DELETE /api/auth/me - Delete the current account

use crate::{
    error::AppError,
    middleware::auth::AuthUser,
    models::user::{
        LoginRequest, LoginResponse, MessageResponse, RegisterRequest, RegisterResponse,
        ResponseUser, UserResponse,
    },
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

/// Register a new account.
///
/// # Request Body
///
/// ```json
/// { "email": "alice@example.com", "password": "hunter22", "language_code": "en_US" }
/// ```
///
/// # Response
///
/// - **201 Created**: `{ "message": "...", "email": "alice@example.com" }`
/// - **400**: Validation failed
/// - **409**: Email already registered
/// - **503**: Activation email could not be sent; nothing was stored
///
/// No session token is returned. The account stays inactive until the
/// emailed link is followed.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    request.validate().map_err(AppError::InvalidRequest)?;

    let (user, _) = state
        .identity
        .register(
            request.email.trim(),
            &request.password,
            &request.language_code,
            false,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful. Please check your email to activate your account."
                .to_string(),
            email: user.email,
        }),
    ))
}

/// Log in.
///
/// # Response
///
/// - **200 OK**: `{ "token": "...", "user": { "email": "..." } }`
/// - **401**: Unknown email or wrong password (indistinguishable)
/// - **403**: Account not activated
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (user, token) = state
        .identity
        .login(request.email.trim(), &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        user: ResponseUser { email: user.email },
    }))
}

/// Redeem an activation token. Unknown, used and expired tokens all give 400.
pub async fn activate(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.identity.activate_user(&token).await?;

    Ok(Json(MessageResponse {
        message: "Account activated successfully. You can now log in.".to_string(),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.identity.get_current_user(auth.user_id).await?;
    Ok(Json(user.into()))
}

/// Delete the caller's account and everything it owns.
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<StatusCode, AppError> {
    state.identity.delete_account(auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
