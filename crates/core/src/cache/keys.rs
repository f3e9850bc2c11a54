//! Cache identifier generation.
//!
//! Every cached collection is addressed by a key derived from the resource
//! name plus the canonical serialization of its query arguments, so distinct
//! argument sets never collide.

use sha2::{Digest, Sha256};

/// Compute the cache identifier for a (resource, params) pair.
pub fn cache_key(resource: &str, params_json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(resource.as_bytes());
    hasher.update(b"\n");
    hasher.update(params_json.as_bytes());
    hex::encode(hasher.finalize())
}
