pub mod cache;
pub mod config;
pub mod content;
pub mod dom;
pub mod encoding;
pub mod error;
pub mod escape;
pub mod http;
pub mod https_domains;
pub mod images;
pub mod logging;
pub mod rewrite;
pub mod sanitize;
