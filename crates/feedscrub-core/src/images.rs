//! Image cache proxy: rewrite `img[src]` to a local cache handler.
//!
//! Images are processed serially in document order; a failed fetch or store
//! leaves that one element untouched and moves on.

use std::collections::HashMap;
use std::time::Duration;

use kuchiki::NodeRef;
use serde::{Deserialize, Serialize};

use crate::cache::{DataCache, NameFilter};
use crate::dom::select_nodes;
use crate::http::{HttpClient, METHOD_GET};

/// Response payload stored under the filtered key.
#[derive(Debug, Serialize, Deserialize)]
pub struct CachedImage {
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

/// Collaborators and settings for one image-proxy pass.
pub struct ImageProxy<'a> {
    /// URL prefix the rewritten `src` points at; the cache key is appended.
    pub handler_prefix: &'a str,
    pub http: &'a dyn HttpClient,
    pub cache: &'a dyn DataCache,
    pub name_filter: &'a dyn NameFilter,
    pub cache_ttl: Duration,
    /// Originating client address, forwarded as `X-Forwarded-For`.
    pub client_addr: Option<&'a str>,
}

impl ImageProxy<'_> {
    /// Process every `img` with a `src` under `root`.
    pub fn rewrite_images(&self, root: &NodeRef) {
        for node in select_nodes(root, "img") {
            let Some(element) = node.as_element() else { continue };
            let Some(src) = element.attributes.borrow().get("src").map(str::to_string) else {
                continue;
            };

            let key = self.name_filter.filter(&src);
            if self.cache.get(&key).is_some() {
                self.point_at_cache(&node, &key);
                continue;
            }

            let mut headers = HashMap::new();
            if let Some(addr) = self.client_addr {
                headers.insert("X-Forwarded-For".to_string(), addr.to_string());
            }
            let response = match self.http.request(METHOD_GET, &src, &headers) {
                Ok(response) => response,
                Err(error) => {
                    tracing::debug!("image fetch failed for {}: {}", src, error);
                    continue;
                }
            };
            if !storable_status(response.status_code) || !keeps_http_scheme(&response.effective_uri)
            {
                continue;
            }

            let payload = CachedImage { headers: response.headers, body: response.body };
            let bytes = serde_json::to_vec(&payload).expect("plain payload serializes");
            match self.cache.set(&key, &bytes, self.cache_ttl) {
                Ok(()) => self.point_at_cache(&node, &key),
                Err(error) => {
                    tracing::warn!(
                        "failed to cache image {} under key {}: {}; keeping original src",
                        src,
                        key,
                        error
                    );
                }
            }
        }
    }

    fn point_at_cache(&self, node: &NodeRef, key: &str) {
        if let Some(element) = node.as_element() {
            element
                .attributes
                .borrow_mut()
                .insert("src", format!("{}{}", self.handler_prefix, key));
        }
    }
}

/// 200 outright, or the 207..=299 band.
fn storable_status(status: u32) -> bool {
    status == 200 || (status > 206 && status < 300)
}

/// The final URI after redirects must still be http(s) for the body to be
/// worth caching.
fn keeps_http_scheme(uri: &str) -> bool {
    let lower = uri.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheError;
    use crate::content::ContentType;
    use crate::dom::Fragment;
    use crate::http::{FetchError, Response};
    use std::cell::RefCell;

    struct FakeHttp {
        status: u32,
        effective_uri: String,
        fail: bool,
        requests: RefCell<Vec<HashMap<String, String>>>,
    }

    impl FakeHttp {
        fn ok() -> Self {
            Self {
                status: 200,
                effective_uri: "http://img.example.com/a.png".to_string(),
                fail: false,
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl HttpClient for FakeHttp {
        fn request(
            &self,
            _method: &str,
            _url: &str,
            headers: &HashMap<String, String>,
        ) -> Result<Response, FetchError> {
            self.requests.borrow_mut().push(headers.clone());
            if self.fail {
                return Err(FetchError::UnsupportedMethod("fake".to_string()));
            }
            Ok(Response {
                status_code: self.status,
                headers: HashMap::new(),
                body: b"imagebytes".to_vec(),
                effective_uri: self.effective_uri.clone(),
            })
        }
    }

    #[derive(Default)]
    struct MemoryCache {
        entries: RefCell<HashMap<String, Vec<u8>>>,
        reject_writes: bool,
    }

    impl DataCache for MemoryCache {
        fn get(&self, key: &str) -> Option<Vec<u8>> {
            self.entries.borrow().get(key).cloned()
        }

        fn set(&self, key: &str, value: &[u8], _ttl: Duration) -> Result<(), CacheError> {
            if self.reject_writes {
                return Err(CacheError::Write(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            self.entries.borrow_mut().insert(key.to_string(), value.to_vec());
            Ok(())
        }
    }

    struct IdentityFilter;

    impl NameFilter for IdentityFilter {
        fn filter(&self, name: &str) -> String {
            format!("k-{}", name.len())
        }
    }

    fn run(input: &str, http: &FakeHttp, cache: &MemoryCache) -> String {
        let fragment = Fragment::parse(input, ContentType::html());
        let proxy = ImageProxy {
            handler_prefix: "/img/",
            http,
            cache,
            name_filter: &IdentityFilter,
            cache_ttl: Duration::from_secs(60),
            client_addr: Some("203.0.113.9"),
        };
        proxy.rewrite_images(fragment.root());
        fragment.into_html(true)
    }

    #[test]
    fn miss_fetches_stores_and_rewrites() {
        let http = FakeHttp::ok();
        let cache = MemoryCache::default();
        let src = "http://img.example.com/a.png";
        let out = run(&format!(r#"<img src="{}">"#, src), &http, &cache);
        let key = format!("k-{}", src.len());
        assert_eq!(out, format!(r#"<img src="/img/{}">"#, key));
        let stored: CachedImage =
            serde_json::from_slice(&cache.get(&key).expect("stored")).unwrap();
        assert_eq!(stored.body, b"imagebytes");
    }

    #[test]
    fn hit_skips_the_fetch() {
        let http = FakeHttp::ok();
        let cache = MemoryCache::default();
        let src = "http://img.example.com/a.png";
        let key = format!("k-{}", src.len());
        cache.set(&key, b"already", Duration::from_secs(60)).unwrap();
        let out = run(&format!(r#"<img src="{}">"#, src), &http, &cache);
        assert_eq!(out, format!(r#"<img src="/img/{}">"#, key));
        assert!(http.requests.borrow().is_empty());
    }

    #[test]
    fn forwarded_for_header_is_sent() {
        let http = FakeHttp::ok();
        let cache = MemoryCache::default();
        run(r#"<img src="http://img.example.com/a.png">"#, &http, &cache);
        let requests = http.requests.borrow();
        assert_eq!(
            requests[0].get("X-Forwarded-For").map(String::as_str),
            Some("203.0.113.9")
        );
    }

    #[test]
    fn fetch_failure_leaves_element_untouched() {
        let mut http = FakeHttp::ok();
        http.fail = true;
        let cache = MemoryCache::default();
        let out = run(r#"<img src="http://img.example.com/a.png">"#, &http, &cache);
        assert_eq!(out, r#"<img src="http://img.example.com/a.png">"#);
    }

    #[test]
    fn unacceptable_status_is_not_stored() {
        for status in [201, 204, 206, 301, 404, 500] {
            let mut http = FakeHttp::ok();
            http.status = status;
            let cache = MemoryCache::default();
            let out = run(r#"<img src="http://img.example.com/a.png">"#, &http, &cache);
            assert_eq!(
                out,
                r#"<img src="http://img.example.com/a.png">"#,
                "status {} must not proxy",
                status
            );
        }
    }

    #[test]
    fn late_2xx_band_is_stored() {
        let mut http = FakeHttp::ok();
        http.status = 250;
        let cache = MemoryCache::default();
        let out = run(r#"<img src="http://img.example.com/a.png">"#, &http, &cache);
        assert!(out.starts_with(r#"<img src="/img/"#));
    }

    #[test]
    fn non_http_effective_uri_is_not_stored() {
        let mut http = FakeHttp::ok();
        http.effective_uri = "data:image/png;base64,AAAA".to_string();
        let cache = MemoryCache::default();
        let out = run(r#"<img src="http://img.example.com/a.png">"#, &http, &cache);
        assert_eq!(out, r#"<img src="http://img.example.com/a.png">"#);
    }

    #[test]
    fn store_failure_keeps_original_src() {
        let http = FakeHttp::ok();
        let cache = MemoryCache { reject_writes: true, ..MemoryCache::default() };
        let out = run(r#"<img src="http://img.example.com/a.png">"#, &http, &cache);
        assert_eq!(out, r#"<img src="http://img.example.com/a.png">"#);
    }

    #[test]
    fn images_without_src_are_skipped() {
        let http = FakeHttp::ok();
        let cache = MemoryCache::default();
        let out = run(r#"<img alt="no src">"#, &http, &cache);
        assert_eq!(out, r#"<img alt="no src">"#);
        assert!(http.requests.borrow().is_empty());
    }
}
