//! Small shared helpers.

use sha2::{Digest, Sha256};

/// Compute a stable content-addressed id: a prefix followed by the
/// SHA-256 hex digest of the content.
pub fn compute_content_hash_id(content: &str, prefix: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{}{:x}", prefix, hasher.finalize())
}
