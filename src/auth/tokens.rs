//! Random credential material and its one-way lookup hash.

use sha2::{Digest, Sha256};

/// Length of the non-secret display prefix kept for API keys.
pub const KEY_PREFIX_LEN: usize = 8;

/// Generate 32 bytes of CSPRNG output as 64 lowercase hex characters.
///
/// Used for activation tokens and raw API keys.
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// SHA-256 of the raw value, hex encoded. This is what gets stored and
/// indexed; the raw value never is.
pub fn hash_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// First [`KEY_PREFIX_LEN`] characters, or the whole value when shorter.
pub fn key_prefix(raw: &str) -> &str {
    raw.get(..KEY_PREFIX_LEN).unwrap_or(raw)
}

/// Log-safe preview of a secret: `abcd1234...`.
pub fn preview(raw: &str) -> String {
    format!("{}...", key_prefix(raw))
}
