//! Forced-HTTPS domain matching.
//!
//! Registered domains form a tree split at DNS levels, TLD first: adding
//! `example.com` creates `com -> example` with a terminal marker, and the
//! marker covers every subdomain. A terminal node short-circuits descent,
//! so a broader suffix added first supersedes narrower entries added later
//! under the same path.

use std::collections::HashMap;

#[derive(Debug, Default)]
struct Node {
    terminal: bool,
    children: HashMap<String, Node>,
}

/// Set of domain suffixes whose `http://` URLs are upgraded to `https://`.
#[derive(Debug, Default)]
pub struct DomainSet {
    root: Node,
}

impl DomainSet {
    /// Build the tree from a list of domains (`"example.com"`, `"biz"`, ...).
    ///
    /// Labels are ASCII-lowercased; leading/trailing dots and whitespace are
    /// trimmed; empty entries are ignored.
    pub fn from_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = Node::default();
        for domain in domains {
            let domain = domain.as_ref().trim_matches(|c: char| c == '.' || c.is_whitespace());
            if domain.is_empty() {
                continue;
            }
            let mut node = &mut root;
            for label in domain.rsplit('.') {
                if node.terminal {
                    break;
                }
                node = node.children.entry(label.to_ascii_lowercase()).or_default();
            }
            node.terminal = true;
        }
        DomainSet { root }
    }

    /// Whether `hostname` falls under a registered suffix.
    pub fn is_forced_https(&self, hostname: &str) -> bool {
        let hostname = hostname.trim_matches(|c: char| c == '.' || c.is_whitespace());
        let mut node = &self.root;
        for label in hostname.rsplit('.') {
            if node.terminal {
                return true;
            }
            match node.children.get(&label.to_ascii_lowercase()) {
                Some(child) => node = child,
                None => return false,
            }
        }
        node.terminal
    }
}
