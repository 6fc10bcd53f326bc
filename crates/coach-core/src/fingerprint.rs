//! Stable fingerprints for request identity.

use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a string.
///
/// Used to build deduplication keys from `(owner, session, message)` tuples
/// without holding raw message text in the in-flight table.
pub fn fingerprint(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}
