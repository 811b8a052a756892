//! Route key resolution for the shoebox.
//!
//! A route is identified by a dotted name such as `posts.show`. The shoebox
//! stores each route's transfer data under a key derived from that name:
//! dot runs become single spaces and the result is dash-cased.
//!
//! Examples:
//! - `"posts.show" -> "posts-show"`
//! - `"a.b.c" -> "a-b-c"`
//! - `"blogPosts..index" -> "blog-posts-index"`

use std::cell::OnceCell;
use std::fmt;

use heck::ToKebabCase;

/// Prefix of the markup node id that backs a shoebox entry.
pub const DEFAULT_NODE_PREFIX: &str = "shoebox-";

/// Derive the shoebox key for a dotted route identifier.
pub fn resolve_route_key(identifier: &str) -> String {
    let mut spaced = String::with_capacity(identifier.len());
    let mut in_dots = false;
    for ch in identifier.chars() {
        if ch == '.' {
            if !in_dots {
                spaced.push(' ');
            }
            in_dots = true;
        } else {
            spaced.push(ch);
            in_dots = false;
        }
    }
    spaced.to_kebab_case()
}

/// Id of the markup node that carries the entry for `key`.
pub fn node_id(prefix: &str, key: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + key.len());
    out.push_str(prefix);
    out.push_str(key);
    out
}

/// A route identifier together with its lazily resolved store key.
///
/// The key is computed on first access and reused for the lifetime of the
/// value, so every read within one route activation sees the same key.
#[derive(Clone)]
pub struct RouteName {
    identifier: String,
    key: OnceCell<String>,
}

impl RouteName {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            key: OnceCell::new(),
        }
    }

    /// The dotted identifier this name was created from.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The shoebox store key, resolved once.
    pub fn key(&self) -> &str {
        self.key.get_or_init(|| resolve_route_key(&self.identifier))
    }

    /// Markup node id for this route's entry, e.g. `shoebox-posts-show`.
    pub fn node_id(&self, prefix: &str) -> String {
        node_id(prefix, self.key())
    }
}

impl fmt::Debug for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteName")
            .field("identifier", &self.identifier)
            .field("key", &self.key.get())
            .finish()
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}

impl PartialEq for RouteName {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for RouteName {}

impl From<&str> for RouteName {
    fn from(identifier: &str) -> Self {
        Self::new(identifier)
    }
}

impl From<String> for RouteName {
    fn from(identifier: String) -> Self {
        Self::new(identifier)
    }
}
