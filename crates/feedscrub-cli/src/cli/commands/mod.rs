//! CLI command handlers, one file per command.

mod cache_key;
mod check_domain;
mod sanitize;

pub use cache_key::run_cache_key;
pub use check_domain::run_check_domain;
pub use sanitize::{run_sanitize, SanitizeFlags};
