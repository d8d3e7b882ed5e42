//! Opaque random tokens and their stored digests.

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// Bytes of entropy in a password reset token (256 bits).
pub const RESET_TOKEN_BYTES: usize = 32;

/// Generate `len` random bytes from the OS RNG, hex-encoded.
pub fn generate_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 hex digest used to store tokens at rest.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
