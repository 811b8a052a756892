//! MemoryShoebox: an embedded store backed by markup-style text nodes.
//!
//! The server side holds parsed values and renders one text node per entry.
//! The client side is rebuilt from those nodes and parses each entry lazily
//! on retrieval, so a malformed node only fails the route that reads it.

use indexmap::IndexMap;
use log::warn;
use serde_json::Value;

use shoebox::route_key::{node_id, DEFAULT_NODE_PREFIX};
use shoebox::{EmbeddedStore, ShoeboxError};

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    /// Unparsed node text as it arrived with the page.
    Raw(String),
    Value(Value),
    Cleared,
}

#[derive(Debug, Clone)]
pub struct MemoryShoebox {
    prefix: String,
    entries: IndexMap<String, Slot>,
    /// Backing node id -> entry key.
    nodes: IndexMap<String, String>,
}

impl Default for MemoryShoebox {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryShoebox {
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_NODE_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: IndexMap::new(),
            nodes: IndexMap::new(),
        }
    }

    /// Rebuild a client-side shoebox from `(node id, text)` pairs.
    ///
    /// Nodes whose id does not carry the prefix are ignored.
    pub fn from_nodes<I, S, T>(prefix: &str, nodes: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut shoebox = Self::with_prefix(prefix);
        for (id, text) in nodes {
            let id = id.into();
            let Some(key) = id.strip_prefix(prefix).map(str::to_owned) else {
                warn!("shoebox: ignoring foreign node `{id}`");
                continue;
            };
            shoebox.entries.insert(key.clone(), Slot::Raw(text.into()));
            shoebox.nodes.insert(id, key);
        }
        shoebox
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn has_node(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Live entries as `(node id, JSON text)` pairs, in insertion order.
    pub fn nodes(&self) -> Result<Vec<(String, String)>, ShoeboxError> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for (id, key) in &self.nodes {
            let text = match self.entries.get(key) {
                Some(Slot::Raw(text)) => text.clone(),
                Some(Slot::Value(value)) => serde_json::to_string(value)
                    .map_err(|e| ShoeboxError::Serialize(e.to_string()))?,
                Some(Slot::Cleared) | None => continue,
            };
            out.push((id.clone(), text));
        }
        Ok(out)
    }

    /// Render every live entry as a `<script>` node.
    ///
    /// `<` inside the JSON is written as `\u003c` so the text can never
    /// close the surrounding element.
    pub fn render_markup(&self) -> Result<String, ShoeboxError> {
        let mut out = String::new();
        for (id, text) in self.nodes()? {
            out.push_str("<script type=\"fastboot/shoebox\" id=\"");
            out.push_str(&id);
            out.push_str("\">");
            out.push_str(&text.replace('<', "\\u003c"));
            out.push_str("</script>\n");
        }
        Ok(out)
    }
}

impl EmbeddedStore for MemoryShoebox {
    fn contains(&self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(Slot::Raw(text)) => {
                let text = text.trim();
                !text.is_empty() && text != "null"
            }
            Some(Slot::Value(value)) => !value.is_null(),
            Some(Slot::Cleared) | None => false,
        }
    }

    fn retrieve(&self, key: &str) -> Result<Option<Value>, ShoeboxError> {
        match self.entries.get(key) {
            Some(Slot::Raw(text)) if text.trim().is_empty() => Ok(None),
            Some(Slot::Raw(text)) => {
                let value: Value =
                    serde_json::from_str(text).map_err(|source| ShoeboxError::MalformedEntry {
                        key: key.to_string(),
                        source,
                    })?;
                Ok((!value.is_null()).then_some(value))
            }
            Some(Slot::Value(value)) if !value.is_null() => Ok(Some(value.clone())),
            _ => Ok(None),
        }
    }

    fn put(&mut self, key: &str, entry: Value) {
        self.entries.insert(key.to_string(), Slot::Value(entry));
        self.nodes
            .insert(node_id(&self.prefix, key), key.to_string());
    }

    fn clear(&mut self, key: &str) {
        self.entries.insert(key.to_string(), Slot::Cleared);
    }

    fn remove_node(&mut self, node_id: &str) -> bool {
        self.nodes.shift_remove(node_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn put_then_retrieve() {
        let mut shoebox = MemoryShoebox::new();
        assert!(!shoebox.contains("posts-show"));
        shoebox.put("posts-show", json!({"post": 1}));
        assert!(shoebox.contains("posts-show"));
        assert!(shoebox.has_node("shoebox-posts-show"));
        assert_eq!(
            shoebox.retrieve("posts-show").unwrap(),
            Some(json!({"post": 1}))
        );
    }

    #[test]
    fn clear_and_remove_node() {
        let mut shoebox = MemoryShoebox::new();
        shoebox.put("a", json!(1));
        shoebox.clear("a");
        assert!(!shoebox.contains("a"));
        assert_eq!(shoebox.retrieve("a").unwrap(), None);
        assert!(shoebox.remove_node("shoebox-a"));
        assert!(!shoebox.remove_node("shoebox-a"));
        assert!(shoebox.nodes().unwrap().is_empty());
    }

    #[test]
    fn nodes_round_trip_to_client() {
        let mut server = MemoryShoebox::new();
        server.put("posts-show", json!({"post": {"title": "</script>"}}));
        let nodes = server.nodes().unwrap();
        assert_eq!(nodes[0].0, "shoebox-posts-show");

        let client = MemoryShoebox::from_nodes("shoebox-", nodes);
        assert!(client.contains("posts-show"));
        assert_eq!(
            client.retrieve("posts-show").unwrap(),
            Some(json!({"post": {"title": "</script>"}}))
        );
    }

    #[test]
    fn malformed_node_fails_on_retrieve() {
        let client = MemoryShoebox::from_nodes("shoebox-", [("shoebox-broken", "{not json")]);
        assert!(client.contains("broken"));
        let err = client.retrieve("broken").unwrap_err();
        assert!(matches!(err, ShoeboxError::MalformedEntry { key, .. } if key == "broken"));
    }

    #[test]
    fn foreign_nodes_are_ignored() {
        let client = MemoryShoebox::from_nodes("shoebox-", [("other-x", "1"), ("shoebox-y", "null")]);
        assert!(!client.contains("x"));
        assert!(!client.contains("y"));
        assert_eq!(client.retrieve("y").unwrap(), None);
        assert_eq!(client.node_ids().collect::<Vec<_>>(), vec!["shoebox-y"]);
    }

    #[test]
    fn markup_escapes_angle_brackets() {
        let mut shoebox = MemoryShoebox::new();
        shoebox.put("k", json!({"html": "<b>"}));
        let markup = shoebox.render_markup().unwrap();
        assert_eq!(
            markup,
            "<script type=\"fastboot/shoebox\" id=\"shoebox-k\">{\"html\":\"\\u003cb>\"}</script>\n"
        );
    }
}
