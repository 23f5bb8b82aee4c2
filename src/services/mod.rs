//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They reach storage only through the repository traits.

pub mod api_key_service;
pub mod email_service;
pub mod identity_service;
pub mod saga;

pub use api_key_service::ApiKeyService;
pub use email_service::{EmailSender, SmtpEmailSender};
pub use identity_service::IdentityService;
