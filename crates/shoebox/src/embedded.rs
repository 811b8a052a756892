//! The embedded key-value store shipped with the server-rendered page.

use serde_json::Value;

use crate::error::ShoeboxError;

/// Key-value store keyed by route key.
///
/// A cleared entry reads back as absent.
pub trait EmbeddedStore {
    /// True when a non-null entry exists under `key`.
    fn contains(&self, key: &str) -> bool;

    /// Entry under `key`, or `None` when absent or cleared.
    fn retrieve(&self, key: &str) -> Result<Option<Value>, ShoeboxError>;

    fn put(&mut self, key: &str, entry: Value);

    /// Set the entry under `key` to null.
    fn clear(&mut self, key: &str);

    /// Remove the backing markup node. Returns false when no such node exists.
    fn remove_node(&mut self, node_id: &str) -> bool;
}
