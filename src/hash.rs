//! Content hashing helpers
//!
//! All entity identity in the matcher rests on SHA-256 digests of normalised
//! content. Plugins decide what "normalised" means for their family; this
//! module only turns strings into hex digests.

use sha2::{Digest, Sha256};

/// SHA-256 digest of the given content, as lowercase hex
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// First `length` hex chars of the content hash
pub fn short_hash(content: &str, length: usize) -> String {
    let hash = content_hash(content);
    hash[..length.min(hash.len())].to_string()
}
