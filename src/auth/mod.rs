//! Credential primitives: password hashing, random token material and
//! session tokens.

pub mod jwt;
pub mod password;
pub mod tokens;

pub use jwt::{Claims, JwtService};
pub use password::SecretHasher;
