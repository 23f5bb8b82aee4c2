//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers.
//! Both chains here authenticate the request, attach the caller's identity
//! as a request extension and reject with HTTP 401 otherwise. Neither holds
//! state of its own between requests.

/// Machine clients: `X-API-Key` header
pub mod api_key;
/// Interactive users: `Authorization: Bearer <jwt>`
pub mod auth;
