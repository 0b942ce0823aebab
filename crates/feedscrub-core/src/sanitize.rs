//! Sanitize pipeline: classify, decode, filter, rewrite, proxy, serialize.
//!
//! One sanitize call processes one fragment synchronously under the frozen
//! configuration. The only blocking work is the optional image fetch, done
//! serially per `img` in document order. Callers sanitizing many feed items
//! concurrently bring their own parallelism; the sanitizer itself shares
//! nothing mutable across calls.

use std::time::Duration;

use base64::Engine as _;

use crate::cache::{DataCache, DiskCache, NameFilter, Sha256NameFilter};
use crate::config::SanitizeConfig;
use crate::content::{classify, ContentKind, ContentType};
use crate::dom::{filters, Fragment};
use crate::encoding;
use crate::error::ConfigError;
use crate::escape::encode_entities;
use crate::http::{CurlClient, HttpClient};
use crate::https_domains::DomainSet;
use crate::images::ImageProxy;
use crate::rewrite;

/// Fragment sanitizer with a frozen configuration.
pub struct Sanitizer {
    config: SanitizeConfig,
    domains: DomainSet,
    output_encoding: &'static encoding_rs::Encoding,
    http: Box<dyn HttpClient>,
    cache: Option<Box<dyn DataCache>>,
    name_filter: Box<dyn NameFilter>,
}

impl Sanitizer {
    /// Validate the configuration and build the default collaborators:
    /// a curl client, a disk cache when caching is enabled, and SHA-256
    /// cache keys.
    pub fn new(config: SanitizeConfig) -> Result<Self, ConfigError> {
        let http = Box::new(CurlClient::new(config.http.clone()));
        let cache: Option<Box<dyn DataCache>> = if config.enable_cache {
            Some(Box::new(DiskCache::new(config.cache_location.clone())))
        } else {
            None
        };
        Self::with_collaborators(config, http, cache, Box::new(Sha256NameFilter))
    }

    /// Injection seam: substitute HTTP, cache, and key-naming collaborators
    /// (fakes in tests, shared stores in servers).
    pub fn with_collaborators(
        config: SanitizeConfig,
        http: Box<dyn HttpClient>,
        cache: Option<Box<dyn DataCache>>,
        name_filter: Box<dyn NameFilter>,
    ) -> Result<Self, ConfigError> {
        let output_encoding = encoding::lookup(&config.output_encoding)
            .ok_or_else(|| ConfigError::UnknownEncoding(config.output_encoding.clone()))?;
        let domains = DomainSet::from_domains(&config.https_domains);
        Ok(Self { config, domains, output_encoding, http, cache, name_filter })
    }

    /// Whether URLs on `hostname` are upgraded to HTTPS.
    pub fn is_forced_https(&self, hostname: &str) -> bool {
        self.domains.is_forced_https(hostname)
    }

    /// Cache key the image proxy would use for `url`.
    pub fn image_cache_key(&self, url: &str) -> String {
        self.name_filter.filter(url)
    }

    /// Sanitize one fragment. `base` resolves relative URLs.
    ///
    /// Returns UTF-8 regardless of the configured output encoding; use
    /// [`Sanitizer::sanitize_bytes`] for transcoded output.
    pub fn sanitize(&self, data: &str, ctype: ContentType, base: &str) -> String {
        let trimmed = data.trim();
        if trimmed.is_empty() && !ctype.iri {
            return String::new();
        }
        let ctype = classify(trimmed, ctype);

        let decoded;
        let mut data = trimmed;
        if ctype.base64 {
            if let Some(plain) = decode_base64(trimmed) {
                decoded = plain;
                data = &decoded;
            }
        }

        let mut result = if ctype.is_markup() {
            self.sanitize_markup(data, ctype, base)
        } else {
            data.to_string()
        };

        if ctype.iri {
            if let Some(absolute) = rewrite::absolutize(&result, base) {
                result = absolute;
            }
        }
        if ctype.kind == ContentKind::Text || ctype.iri {
            result = encode_entities(&result);
        }
        result
    }

    /// Like [`Sanitizer::sanitize`], transcoded to the configured output
    /// encoding when it is not UTF-8.
    pub fn sanitize_bytes(&self, data: &str, ctype: ContentType, base: &str) -> Vec<u8> {
        let text = self.sanitize(data, ctype, base);
        if self.output_encoding == encoding_rs::UTF_8 {
            text.into_bytes()
        } else {
            encoding::transcode(&text, self.output_encoding)
        }
    }

    fn sanitize_markup(&self, data: &str, ctype: ContentType, base: &str) -> String {
        let fragment = Fragment::parse(data, ctype);
        let root = fragment.root();

        if self.config.strip_comments {
            filters::strip_comments(root);
        }
        filters::strip_tags(
            root,
            &self.config.strip_htmltags,
            self.config.encode_instead_of_strip,
            ctype,
        );
        for name in &self.config.rename_attributes {
            filters::rename_attribute(root, name);
        }
        for name in &self.config.strip_attributes {
            filters::strip_attribute(root, name);
        }
        for (tag, values) in &self.config.add_attributes {
            filters::set_attributes(root, tag, values);
        }

        for (tag, attributes) in &self.config.replace_url_attributes {
            // Stripped tags are gone (or encoded into text) by now.
            if self.config.strip_htmltags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                continue;
            }
            rewrite::replace_urls(root, tag, attributes, base, &self.domains);
        }

        if !self.config.image_handler.is_empty() {
            if let Some(cache) = &self.cache {
                let proxy = ImageProxy {
                    handler_prefix: &self.config.image_handler,
                    http: self.http.as_ref(),
                    cache: cache.as_ref(),
                    name_filter: self.name_filter.as_ref(),
                    cache_ttl: Duration::from_secs(self.config.cache_duration_secs),
                    client_addr: self.config.client_addr.as_deref(),
                };
                proxy.rewrite_images(root);
            }
        }

        fragment.into_html(self.config.remove_div)
    }
}

/// Lenient base64: ASCII whitespace is ignored; undecodable input is kept
/// as-is by the caller.
fn decode_base64(data: &str) -> Option<String> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD.decode(compact).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}
