//! Key/value data cache abstraction for proxied images.
//!
//! The cache is externally owned: the sanitizer only reads a key before a
//! fetch and writes after a successful one. Implementations must tolerate
//! concurrent independent key reads/writes; no cross-key guarantee is asked
//! for. [`DiskCache`] is the filesystem-backed default.

mod disk;

pub use disk::DiskCache;

use std::time::Duration;

/// Write failure; surfaced to the operator as a warning, never fatal to a
/// sanitize call.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// Minimal key/value store with a per-entry TTL.
pub trait DataCache {
    /// Stored bytes, or `None` when the key is absent or expired.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store bytes under `key` for `ttl`.
    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;
}

/// Maps raw image URLs to cache keys.
pub trait NameFilter {
    fn filter(&self, name: &str) -> String;
}

/// Default key naming: SHA-256 of the URL as lowercase hex.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256NameFilter;

impl NameFilter for Sha256NameFilter {
    fn filter(&self, name: &str) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_name_filter_known_digest() {
        let key = Sha256NameFilter.filter("https://example.com/x.png");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        // Stable across calls.
        assert_eq!(key, Sha256NameFilter.filter("https://example.com/x.png"));
        assert_ne!(key, Sha256NameFilter.filter("https://example.com/y.png"));
    }
}
