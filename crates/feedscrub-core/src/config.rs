//! Sanitizer configuration: filter lists, URL handling, cache and HTTP
//! options.
//!
//! Options are frozen once a sanitizer is built; changing them means
//! building a new instance, so concurrent sanitize calls never share
//! mutable state.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// HTTP settings for image-proxy fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Per-request timeout in seconds (also used for connect).
    pub timeout_secs: u64,
    /// Maximum redirects to follow.
    pub redirects: u32,
    /// User-Agent header; empty selects the library default.
    pub useragent: String,
    /// Optional proxy URL for outbound fetches.
    pub proxy: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 10, redirects: 5, useragent: String::new(), proxy: None }
    }
}

/// Options for one sanitizer instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeConfig {
    /// Drop the synthetic wrapper `<div>` from the output; when off, a bare
    /// `<div>` wrapper is kept instead.
    pub remove_div: bool,
    /// URL prefix for proxied images; empty disables image proxying.
    pub image_handler: String,
    /// Tags removed (or encoded) from fragments.
    pub strip_htmltags: Vec<String>,
    /// Encode matching tags as visible text instead of removing them.
    pub encode_instead_of_strip: bool,
    /// Attributes removed from every element.
    pub strip_attributes: Vec<String>,
    /// Attributes moved aside to `data-sanitized-<name>`.
    pub rename_attributes: Vec<String>,
    /// Attribute/value pairs force-set per tag (autoplay/preload/sandbox
    /// safety defaults).
    pub add_attributes: BTreeMap<String, BTreeMap<String, String>>,
    /// Remove HTML comments.
    pub strip_comments: bool,
    /// Output encoding label; anything but UTF-8 only affects
    /// `sanitize_bytes`.
    pub output_encoding: String,
    /// Enable the image cache (required, with `image_handler`, for
    /// proxying).
    pub enable_cache: bool,
    /// Directory for the on-disk image cache.
    pub cache_location: PathBuf,
    /// Image cache entry lifetime in seconds.
    pub cache_duration_secs: u64,
    /// Element/attribute pairs whose URL values are resolved against the
    /// per-call base.
    pub replace_url_attributes: BTreeMap<String, Vec<String>>,
    /// Domains (including all subdomains) whose `http://` URLs are upgraded
    /// to `https://`.
    pub https_domains: Vec<String>,
    /// Originating client address forwarded on image fetches.
    pub client_addr: Option<String>,
    pub http: HttpSettings,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            remove_div: true,
            image_handler: String::new(),
            strip_htmltags: default_strip_htmltags(),
            encode_instead_of_strip: false,
            strip_attributes: default_strip_attributes(),
            rename_attributes: Vec::new(),
            add_attributes: default_add_attributes(),
            strip_comments: false,
            output_encoding: "UTF-8".to_string(),
            enable_cache: true,
            cache_location: PathBuf::from("./cache"),
            cache_duration_secs: 3600,
            replace_url_attributes: default_replace_url_attributes(),
            https_domains: Vec::new(),
            client_addr: None,
            http: HttpSettings::default(),
        }
    }
}

/// Tags stripped by default: document structure, legacy presentation, and
/// anything that can execute or embed.
pub fn default_strip_htmltags() -> Vec<String> {
    [
        "base", "blink", "body", "doctype", "embed", "font", "form", "frame", "frameset", "html",
        "iframe", "input", "marquee", "meta", "noscript", "object", "param", "script", "style",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Attributes stripped by default: event handlers and legacy vectors.
pub fn default_strip_attributes() -> Vec<String> {
    [
        "bgsound", "expr", "id", "style", "onclick", "onerror", "onfinish", "onmouseover",
        "onmouseout", "onfocus", "onblur", "lowsrc", "dynsrc",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Per-tag attributes force-set by default: no media auto-preload, sandboxed
/// iframes.
pub fn default_add_attributes() -> BTreeMap<String, BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    map.insert(
        "audio".to_string(),
        BTreeMap::from([("preload".to_string(), "none".to_string())]),
    );
    map.insert(
        "iframe".to_string(),
        BTreeMap::from([(
            "sandbox".to_string(),
            "allow-scripts allow-same-origin".to_string(),
        )]),
    );
    map.insert(
        "video".to_string(),
        BTreeMap::from([("preload".to_string(), "none".to_string())]),
    );
    map
}

/// Elements and attributes carrying URLs that need resolving against the
/// fragment's base: anchors, media, forms, quotations.
pub fn default_replace_url_attributes() -> BTreeMap<String, Vec<String>> {
    let one = |attr: &str| vec![attr.to_string()];
    let mut map = BTreeMap::new();
    map.insert("a".to_string(), one("href"));
    map.insert("area".to_string(), one("href"));
    map.insert("audio".to_string(), one("src"));
    map.insert("blockquote".to_string(), one("cite"));
    map.insert("del".to_string(), one("cite"));
    map.insert("form".to_string(), one("action"));
    map.insert(
        "img".to_string(),
        vec!["longdesc".to_string(), "src".to_string()],
    );
    map.insert("input".to_string(), one("src"));
    map.insert("ins".to_string(), one("cite"));
    map.insert("q".to_string(), one("cite"));
    map.insert("source".to_string(), one("src"));
    map.insert(
        "video".to_string(),
        vec!["poster".to_string(), "src".to_string()],
    );
    map
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("feedscrub")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SanitizeConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SanitizeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SanitizeConfig = toml::from_str(&data)?;
    Ok(cfg)
}
