//! Loggable fingerprint of the session key.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

const FINGERPRINT_BYTES: usize = 8;

/// First 8 bytes of SHA-256 over the key's signing half, as lowercase hex.
///
/// Lets operators tell which key a running instance uses without logging
/// key material.
///
/// ```
/// use actix_web::cookie::Key;
/// use snippetbox::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fingerprint = key_fingerprint(&Key::generate());
/// assert_eq!(fingerprint.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
