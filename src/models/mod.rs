//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! plus the request/response bodies built from them.

/// Email activation token model
pub mod activation_token;
/// API key authentication model
pub mod api_key;
/// Machine data endpoint read models
pub mod data;
/// User identity model
pub mod user;
