//! Configuration-time errors.
//!
//! Tree filtering, attribute operations, and URL rewriting are total over the
//! parsed fragment; a missing attribute or unmatched tag is a no-op. Fetch and
//! cache-write failures are recovered where they occur and carry their own
//! types ([`crate::http::FetchError`], [`crate::cache::CacheError`]).

/// Rejected configuration; raised once when a sanitizer is built, never
/// during a sanitize call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `output_encoding` is not a known encoding label.
    #[error("unknown output encoding label {0:?}")]
    UnknownEncoding(String),
}
