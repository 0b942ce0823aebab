//! Fragment document lifecycle: preprocess, parse, extract, serialize.
//!
//! A fragment is parsed inside a synthetic `<div>` wrapper within a minimal
//! document shell, filtered in place, then the wrapper's children are
//! serialized back out. The tree lives for one sanitize call.

pub mod filters;

use kuchiki::traits::TendrilSink;
use kuchiki::NodeRef;
use regex::Regex;
use std::sync::LazyLock;

use crate::content::{ContentKind, ContentType};

/// Stray document-level tags are dropped before wrapping; the parser builds
/// its own shell.
static SHELL_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)</?(?:html|body)[^>]*>").expect("hardcoded regex is valid")
});

/// One fragment's parse tree, rooted at the synthetic wrapper `<div>`.
pub struct Fragment {
    wrapper: NodeRef,
}

impl Fragment {
    /// Parse fragment text into a mutable tree.
    ///
    /// The shell's doctype and content-type meta match the declared kind.
    /// Note: a stray `</div>` in the input closes the wrapper early and the
    /// remainder is dropped.
    pub fn parse(data: &str, ctype: ContentType) -> Fragment {
        let body = SHELL_TAGS.replace_all(data, "");
        let shell = if ctype.kind == ContentKind::Xhtml {
            format!(
                concat!(
                    r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "#,
                    r#""http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">"#,
                    r#"<html><head><meta http-equiv="Content-Type" "#,
                    r#"content="application/xhtml+xml; charset=utf-8" /></head>"#,
                    "<body><div>{}</div></body></html>"
                ),
                body
            )
        } else {
            format!(
                concat!(
                    "<!DOCTYPE html>",
                    r#"<html><head><meta http-equiv="Content-Type" "#,
                    r#"content="text/html; charset=utf-8" /></head>"#,
                    "<body><div>{}</div></body></html>"
                ),
                body
            )
        };
        let document = kuchiki::parse_html().one(shell);
        let wrapper = document
            .select_first("body")
            .ok()
            .and_then(|body| body.as_node().first_child())
            .expect("parser always produces the synthetic wrapper");
        Fragment { wrapper }
    }

    /// The wrapper node; filter passes operate on its descendants.
    pub fn root(&self) -> &NodeRef {
        &self.wrapper
    }

    /// Serialize the fragment's content. The synthetic wrapper is dropped,
    /// or replaced by a bare `<div>` when `remove_div` is off.
    pub fn into_html(self, remove_div: bool) -> String {
        let inner = serialize_children(&self.wrapper);
        if remove_div {
            inner
        } else {
            format!("<div>{}</div>", inner)
        }
    }
}

/// Serialize every child of `node`, excluding `node` itself.
pub(crate) fn serialize_children(node: &NodeRef) -> String {
    let mut out = Vec::new();
    for child in node.children() {
        child
            .serialize(&mut out)
            .expect("serializing into a Vec cannot fail");
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Materialize the elements under `root` matching a selector, so callers can
/// mutate the tree without invalidating a live iterator. An unparseable
/// selector matches nothing. The root itself is never a candidate, keeping
/// the synthetic wrapper out of reach of configured filters.
pub(crate) fn select_nodes(root: &NodeRef, selector: &str) -> Vec<NodeRef> {
    match root.select(selector) {
        Ok(matches) => matches
            .map(|m| m.as_node().clone())
            .filter(|node| node != root)
            .collect(),
        Err(()) => Vec::new(),
    }
}
