//! HTTP client abstraction for the image cache proxy.
//!
//! The sanitizer needs one blocking GET that follows redirects and reports
//! the final URI. The client is injected as a trait so tests can substitute
//! fakes; [`CurlClient`] is the libcurl-backed default.

mod client;

pub use client::CurlClient;

use std::collections::HashMap;

pub const METHOD_GET: &str = "GET";

/// A completed HTTP exchange.
///
/// Statuses are reported here, not as errors; callers judge them against
/// their own acceptance rules.
#[derive(Debug, Clone)]
pub struct Response {
    pub status_code: u32,
    /// Response headers, names lowercased; on redirects, later hops win.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    /// Final URI after redirects.
    pub effective_uri: String,
}

/// Transport-level failure performing a request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out: {0}")]
    Timeout(#[source] curl::Error),
    #[error("connection failed: {0}")]
    Connection(#[source] curl::Error),
    #[error("transport error: {0}")]
    Transport(#[source] curl::Error),
    #[error("unsupported method {0:?}")]
    UnsupportedMethod(String),
}

impl FetchError {
    /// Classify a curl error into timeout / connection / other transport.
    pub(crate) fn from_curl(error: curl::Error) -> Self {
        if error.is_operation_timedout() {
            return FetchError::Timeout(error);
        }
        if error.is_couldnt_connect()
            || error.is_couldnt_resolve_host()
            || error.is_couldnt_resolve_proxy()
            || error.is_recv_error()
            || error.is_send_error()
            || error.is_got_nothing()
        {
            return FetchError::Connection(error);
        }
        FetchError::Transport(error)
    }
}

/// Blocking HTTP client capability.
pub trait HttpClient {
    /// Perform `method` on `url` with extra request headers.
    fn request(
        &self,
        method: &str,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<Response, FetchError>;
}
