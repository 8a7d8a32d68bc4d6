//! Message-at-rest obfuscation
//!
//! This module provides the reversible encoding applied to message text
//! before it is persisted. It XORs the bytes against a SHA-256-derived
//! keystream and wraps the result in base64. This is obfuscation against
//! casual inspection of the storage files, not authenticated encryption;
//! callers treat [`encode`] and [`decode`] as the seam where a stronger
//! scheme could be substituted.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha2::{Digest, Sha256};

/// Static seed for keystream derivation (consistent across all builds/versions)
///
/// This ensures that persisted messages remain readable across different
/// versions and builds of the application.
const KEY_SEED: &str = "com.calcvault.messages.obfuscation.v1";

/// Derive a keystream of `len` bytes from the static seed.
///
/// SHA-256 over seed || block counter, concatenated until `len` bytes are
/// available. Deterministic, so encode and decode share the same stream.
fn keystream(len: usize) -> Vec<u8> {
    let mut stream = Vec::with_capacity(len + 32);
    let mut counter: u64 = 0;
    while stream.len() < len {
        let mut hasher = Sha256::new();
        hasher.update(KEY_SEED.as_bytes());
        hasher.update(counter.to_be_bytes());
        stream.extend_from_slice(&hasher.finalize());
        counter += 1;
    }
    stream.truncate(len);
    stream
}

fn xor_keystream(data: &[u8]) -> Vec<u8> {
    data.iter()
        .zip(keystream(data.len()))
        .map(|(byte, key)| byte ^ key)
        .collect()
}

/// Encode message text for persistence.
///
/// Total: never fails. XOR against the keystream, then base64.
pub fn encode(plaintext: &str) -> String {
    BASE64.encode(xor_keystream(plaintext.as_bytes()))
}

/// Decode persisted message text.
///
/// Total: any failure (malformed base64, non-UTF-8 result) returns the
/// input unchanged with a warning, so one bad record never breaks a list.
pub fn decode(encoded: &str) -> String {
    let data = match BASE64.decode(encoded) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("Failed to decode stored message, returning raw token: {e}");
            return encoded.to_string();
        }
    };

    match String::from_utf8(xor_keystream(&data)) {
        Ok(plaintext) => plaintext,
        Err(e) => {
            log::warn!("Stored message is not valid UTF-8, returning raw token: {e}");
            encoded.to_string()
        }
    }
}
