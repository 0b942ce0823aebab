//! Content classification for sanitize calls.
//!
//! Feed fields arrive typed as text, HTML, or XHTML, sometimes ambiguously
//! ("maybe HTML"), optionally base64-encoded, and link-like fields are
//! resource identifiers that need absolutization rather than tree filtering.

use regex::Regex;
use std::sync::LazyLock;

/// Base kind of a field's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Html,
    Xhtml,
    /// Ambiguous; resolved to `Html` or `Text` by [`classify`].
    MaybeHtml,
}

/// What a sanitize call treats its input as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentType {
    pub kind: ContentKind,
    /// The datum is a resource identifier: absolutize against the base and
    /// entity-encode the result.
    pub iri: bool,
    /// The datum is base64-encoded and is decoded before any other stage.
    pub base64: bool,
}

impl ContentType {
    pub fn text() -> Self {
        Self { kind: ContentKind::Text, iri: false, base64: false }
    }

    pub fn html() -> Self {
        Self { kind: ContentKind::Html, iri: false, base64: false }
    }

    pub fn xhtml() -> Self {
        Self { kind: ContentKind::Xhtml, iri: false, base64: false }
    }

    pub fn maybe_html() -> Self {
        Self { kind: ContentKind::MaybeHtml, iri: false, base64: false }
    }

    /// A bare resource identifier (no markup processing).
    pub fn iri() -> Self {
        Self { kind: ContentKind::Text, iri: true, base64: false }
    }

    pub fn with_iri(mut self) -> Self {
        self.iri = true;
        self
    }

    pub fn with_base64(mut self) -> Self {
        self.base64 = true;
        self
    }

    /// True for content that goes through the DOM pipeline.
    pub fn is_markup(self) -> bool {
        matches!(self.kind, ContentKind::Html | ContentKind::Xhtml)
    }
}

/// An entity reference or a closing tag is taken as evidence of markup.
static MARKUP_PROBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#(x[0-9a-fA-F]+|[0-9]+)|[a-zA-Z0-9]+)|</[A-Za-z][^\s/>]*\s*>")
        .expect("hardcoded regex is valid")
});

/// Resolve `MaybeHtml` by probing the data; other kinds pass through.
pub fn classify(data: &str, ctype: ContentType) -> ContentType {
    if ctype.kind != ContentKind::MaybeHtml {
        return ctype;
    }
    let kind = if MARKUP_PROBE.is_match(data) {
        ContentKind::Html
    } else {
        ContentKind::Text
    };
    ContentType { kind, ..ctype }
}
