//! URL resolution and forced-HTTPS upgrades over fragment elements.

use kuchiki::NodeRef;
use url::Url;

use crate::dom::select_nodes;
use crate::https_domains::DomainSet;

/// Resolve `value` against `base`, returning the absolute form.
///
/// An already-absolute value resolves on its own, whatever the base. Returns
/// `None` when resolution fails so the caller can keep the original value.
pub fn absolutize(value: &str, base: &str) -> Option<String> {
    if let Ok(absolute) = Url::parse(value) {
        return Some(absolute.to_string());
    }
    let base = Url::parse(base.trim()).ok()?;
    base.join(value).ok().map(|u| u.to_string())
}

/// Upgrade `http://` to `https://` when the URL's host is in `domains`.
///
/// Only a literal `http://` prefix (any case) triggers; https and other
/// schemes pass through, so the function is idempotent and never downgrades.
pub fn https_url(url: &str, domains: &DomainSet) -> String {
    let has_http_prefix = url
        .get(..7)
        .is_some_and(|p| p.eq_ignore_ascii_case("http://"));
    if has_http_prefix {
        if let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(String::from)) {
            if domains.is_forced_https(&host) {
                return format!("https://{}", &url[7..]);
            }
        }
    }
    url.to_string()
}

/// Rewrite the named attributes of every `tag` element under `root`:
/// absolutize against `base`, then apply the HTTPS upgrade. Values that fail
/// to resolve are left untouched.
pub fn replace_urls(root: &NodeRef, tag: &str, attributes: &[String], base: &str, domains: &DomainSet) {
    for node in select_nodes(root, tag) {
        let Some(element) = node.as_element() else { continue };
        let mut attrs = element.attributes.borrow_mut();
        for name in attributes {
            let Some(value) = attrs.get(name.as_str()).map(str::to_string) else { continue };
            if let Some(absolute) = absolutize(&value, base) {
                attrs.insert(name.as_str(), https_url(&absolute, domains));
            }
        }
    }
}
