//! Tree filtering passes: comments, tag strip/encode, attribute operations.
//!
//! Every pass snapshots its match list before touching the tree. All
//! operations are total: an unmatched tag or missing attribute is a no-op.

use std::collections::BTreeMap;

use kuchiki::{ElementData, NodeRef};

use crate::content::{ContentKind, ContentType};
use crate::dom::select_nodes;

/// Tags whose content is raw text; they are removed with their subtree
/// rather than unwrapped.
const RAW_TEXT_TAGS: [&str; 2] = ["script", "style"];

/// Detach every comment node under `root`.
pub fn strip_comments(root: &NodeRef) {
    let comments: Vec<NodeRef> = root
        .descendants()
        .filter(|node| node.as_comment().is_some())
        .collect();
    for comment in comments {
        comment.detach();
    }
}

/// Remove (or, with `encode`, flatten into visible text) every element whose
/// tag appears in `tags`.
pub fn strip_tags(root: &NodeRef, tags: &[String], encode: bool, ctype: ContentType) {
    for tag in tags {
        let tag = tag.trim().to_ascii_lowercase();
        if tag.is_empty() {
            continue;
        }
        for node in select_nodes(root, &tag) {
            if encode {
                encode_element(&node, &tag, ctype);
            } else {
                strip_element(&node, &tag);
            }
        }
    }
}

/// Raw-text tags are dropped with their subtree; other tags are unwrapped,
/// splicing the children into the element's position in order.
fn strip_element(node: &NodeRef, tag: &str) {
    if RAW_TEXT_TAGS.contains(&tag) {
        node.detach();
        return;
    }
    for child in node.children().collect::<Vec<_>>() {
        node.insert_before(child);
    }
    node.detach();
}

/// Replace the element with text that reads as its own markup: the escaped
/// open tag, the children (still subject to later passes), and the escaped
/// close tag. Raw-text tags become one opaque text node, tags included.
fn encode_element(node: &NodeRef, tag: &str, ctype: ContentType) {
    let Some(element) = node.as_element() else {
        return;
    };
    let open = open_tag_text(tag, element, ctype);

    if RAW_TEXT_TAGS.contains(&tag) {
        let text = format!("{}{}</{}>", open, node.text_contents(), tag);
        node.insert_before(NodeRef::new_text(text));
        node.detach();
        return;
    }

    node.insert_before(NodeRef::new_text(open));
    for child in node.children().collect::<Vec<_>>() {
        node.insert_before(child);
    }
    node.insert_before(NodeRef::new_text(format!("</{}>", tag)));
    node.detach();
}

/// Reserialize an open tag with its attributes. An empty attribute value
/// repeats the name in XHTML (which has no bare attributes) and stays bare
/// in HTML.
fn open_tag_text(tag: &str, element: &ElementData, ctype: ContentType) -> String {
    let attributes = element.attributes.borrow();
    let mut text = format!("<{}", tag);
    for (name, attribute) in attributes.map.iter() {
        if attribute.value.is_empty() {
            if ctype.kind == ContentKind::Xhtml {
                text.push_str(&format!(" {}=\"{}\"", name.local, name.local));
            } else {
                text.push_str(&format!(" {}", name.local));
            }
        } else {
            text.push_str(&format!(" {}=\"{}\"", name.local, attribute.value));
        }
    }
    text.push('>');
    text
}

/// Remove `name` from every element that carries it.
pub fn strip_attribute(root: &NodeRef, name: &str) {
    for node in select_nodes(root, &format!("[{}]", name)) {
        if let Some(element) = node.as_element() {
            element.attributes.borrow_mut().remove(name);
        }
    }
}

/// Move `name` aside to `data-sanitized-<name>` on every element that
/// carries it.
pub fn rename_attribute(root: &NodeRef, name: &str) {
    for node in select_nodes(root, &format!("[{}]", name)) {
        let Some(element) = node.as_element() else {
            continue;
        };
        let mut attributes = element.attributes.borrow_mut();
        if let Some(value) = attributes.get(name).map(str::to_string) {
            attributes.insert(format!("data-sanitized-{}", name), value);
            attributes.remove(name);
        }
    }
}

/// Force-set attribute/value pairs on every `tag` element.
pub fn set_attributes(root: &NodeRef, tag: &str, values: &BTreeMap<String, String>) {
    for node in select_nodes(root, tag.trim()) {
        if let Some(element) = node.as_element() {
            let mut attributes = element.attributes.borrow_mut();
            for (name, value) in values {
                attributes.insert(name.as_str(), value.clone());
            }
        }
    }
}
