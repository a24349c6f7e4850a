//! SHA-256 checksum utilities
//!
//! A single canonical checksum format (`sha256:<hex>`) used to detect writes
//! that would not change a file.

use sha2::{Digest, Sha256};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of string content.
///
/// Returns a string in the canonical format `"sha256:<hex>"`.
pub fn compute_content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Whether two contents hash to the same checksum.
pub fn same_content(a: &str, b: &str) -> bool {
    compute_content_checksum(a) == compute_content_checksum(b)
}
