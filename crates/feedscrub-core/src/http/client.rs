//! libcurl-backed [`HttpClient`].

use std::collections::HashMap;
use std::str;
use std::time::Duration;

use curl::easy::{Easy, List};

use super::{FetchError, HttpClient, Response, METHOD_GET};
use crate::config::HttpSettings;

/// Blocking client honoring the configured timeout, redirect limit, and
/// user agent. One `Easy` handle per request; the sanitizer fetches images
/// serially, so there is nothing to pool.
#[derive(Debug, Clone)]
pub struct CurlClient {
    settings: HttpSettings,
}

impl CurlClient {
    pub fn new(settings: HttpSettings) -> Self {
        Self { settings }
    }

    fn useragent(&self) -> String {
        if self.settings.useragent.is_empty() {
            format!("feedscrub/{}", env!("CARGO_PKG_VERSION"))
        } else {
            self.settings.useragent.clone()
        }
    }
}

impl HttpClient for CurlClient {
    fn request(
        &self,
        method: &str,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<Response, FetchError> {
        if !method.eq_ignore_ascii_case(METHOD_GET) {
            return Err(FetchError::UnsupportedMethod(method.to_string()));
        }
        perform(&self.settings, &self.useragent(), url, headers).map_err(FetchError::from_curl)
    }
}

fn perform(
    settings: &HttpSettings,
    useragent: &str,
    url: &str,
    extra_headers: &HashMap<String, String>,
) -> Result<Response, curl::Error> {
    let mut easy = Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(settings.redirects)?;
    easy.timeout(Duration::from_secs(settings.timeout_secs))?;
    easy.connect_timeout(Duration::from_secs(settings.timeout_secs))?;
    easy.useragent(useragent)?;
    if let Some(proxy) = &settings.proxy {
        easy.proxy(proxy)?;
    }

    if !extra_headers.is_empty() {
        let mut list = List::new();
        for (name, value) in extra_headers {
            list.append(&format!("{}: {}", name.trim(), value.trim()))?;
        }
        easy.http_headers(list)?;
    }

    let mut header_lines: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(line) = str::from_utf8(data) {
                header_lines.push(line.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status_code = easy.response_code()?;
    let effective_uri = easy
        .effective_url()?
        .unwrap_or(url)
        .to_string();

    Ok(Response {
        status_code,
        headers: parse_header_lines(&header_lines),
        body,
        effective_uri,
    })
}

/// Fold raw header lines into a name -> value map, names lowercased.
/// Status lines and blank separators between redirect hops are skipped.
fn parse_header_lines(lines: &[String]) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with("HTTP/") {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lines_fold_into_lowercased_map() {
        let lines = [
            "HTTP/1.1 200 OK".to_string(),
            "Content-Type: image/png".to_string(),
            "Content-Length: 4".to_string(),
            "".to_string(),
        ];
        let headers = parse_header_lines(&lines);
        assert_eq!(headers.get("content-type").map(String::as_str), Some("image/png"));
        assert_eq!(headers.get("content-length").map(String::as_str), Some("4"));
        assert!(!headers.contains_key("HTTP/1.1 200 OK"));
    }

    #[test]
    fn later_redirect_hops_override_headers() {
        let lines = [
            "HTTP/1.1 302 Found".to_string(),
            "Content-Type: text/html".to_string(),
            "".to_string(),
            "HTTP/1.1 200 OK".to_string(),
            "Content-Type: image/png".to_string(),
        ];
        let headers = parse_header_lines(&lines);
        assert_eq!(headers.get("content-type").map(String::as_str), Some("image/png"));
    }

    #[test]
    fn non_get_methods_are_rejected() {
        let client = CurlClient::new(HttpSettings::default());
        let err = client
            .request("POST", "http://127.0.0.1:1/", &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedMethod(_)));
    }
}
