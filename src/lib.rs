//! Nutrition Tracker identity and access server.
//!
//! Users register with email and password, confirm ownership through an
//! emailed activation link and then log in for a bearer token. Machine
//! clients use long-lived API keys created by their owner.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: JWT bearer tokens for users, SHA-256 hashed API keys for machines
//! - **Email**: SMTP via lettre, bounded by a timeout
//! - **Format**: JSON requests/responses

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Build the HTTP router.
///
/// # Route Groups
///
/// - Public: health, register, login, activate
/// - Bearer (`Authorization: Bearer <jwt>`): current user, API key management
/// - API key (`X-API-Key`): machine data export
pub fn app(state: AppState) -> Router {
    let user_routes = Router::new()
        .route(
            "/api/auth/me",
            get(handlers::auth::me).delete(handlers::auth::delete_me),
        )
        .route(
            "/api/api-keys",
            post(handlers::api_keys::create_api_key).get(handlers::api_keys::list_api_keys),
        )
        .route(
            "/api/api-keys/{id}/revoke",
            post(handlers::api_keys::revoke_api_key),
        )
        .route(
            "/api/api-keys/{id}",
            delete(handlers::api_keys::delete_api_key),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let machine_routes = Router::new()
        .route("/api/v1/data", get(handlers::data::get_data))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::api_key::require_api_key,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/auth/activate/{token}",
            get(handlers::auth::activate),
        )
        .merge(user_routes)
        .merge(machine_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
