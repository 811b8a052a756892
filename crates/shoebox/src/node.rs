//! Transfer nodes: the JSON shapes that travel inside a shoebox entry.
//!
//! A transfer node is ordinary JSON. Normalized record payloads are told
//! apart from plain data by the marker field [`MODEL_MARKER`] set to `true`.

use serde_json::{Map, Value};

use crate::error::ShoeboxError;

/// Marker field carried by every serialized record payload.
pub const MODEL_MARKER: &str = "__emberDataModel";

/// Discriminant of a [`TransferNode`], usable after the node is moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Tagged,
    TaggedCollection,
    Mapping,
    Plain,
}

/// Classification of one transfer node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransferNode<'a> {
    /// A normalized record payload carrying the marker.
    Tagged(&'a Map<String, Value>),
    /// A non-empty array where every element is a tagged payload.
    TaggedCollection(&'a [Value]),
    /// An untagged object whose fields may hold further tagged nodes.
    Mapping(&'a Map<String, Value>),
    /// Scalars, `null`, and arrays that are not record collections.
    Plain(&'a Value),
}

impl<'a> TransferNode<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Object(map) if is_tagged(map) => TransferNode::Tagged(map),
            Value::Object(map) => TransferNode::Mapping(map),
            Value::Array(items) if is_tagged_collection(items) => {
                TransferNode::TaggedCollection(items)
            }
            other => TransferNode::Plain(other),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            TransferNode::Tagged(_) => NodeKind::Tagged,
            TransferNode::TaggedCollection(_) => NodeKind::TaggedCollection,
            TransferNode::Mapping(_) => NodeKind::Mapping,
            TransferNode::Plain(_) => NodeKind::Plain,
        }
    }

    pub fn is_tagged(&self) -> bool {
        matches!(self.kind(), NodeKind::Tagged | NodeKind::TaggedCollection)
    }
}

// ── Entry envelope ────────────────────────────────────────────────────────

/// Wrap a route's transfer node as `{ <model_name>: node }`.
pub fn envelope(model_name: &str, node: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(model_name.to_string(), node);
    Value::Object(map)
}

/// Split a stored entry back into its model name and transfer node.
pub fn open_envelope(key: &str, entry: Value) -> Result<(String, Value), ShoeboxError> {
    match entry {
        Value::Object(map) if map.len() == 1 => match map.into_iter().next() {
            Some((name, node)) => Ok((name, node)),
            None => Err(ShoeboxError::malformed(format!("entry `{key}` is empty"))),
        },
        Value::Object(map) => Err(ShoeboxError::malformed(format!(
            "entry `{key}` must hold exactly one model, found {}",
            map.len()
        ))),
        _ => Err(ShoeboxError::malformed(format!(
            "entry `{key}` is not an object"
        ))),
    }
}

/// True when `map` carries the marker with value `true`.
pub fn is_tagged(map: &Map<String, Value>) -> bool {
    matches!(map.get(MODEL_MARKER), Some(Value::Bool(true)))
}

/// True when `value` is an object carrying the marker.
pub fn is_tagged_value(value: &Value) -> bool {
    value.as_object().is_some_and(is_tagged)
}

fn is_tagged_collection(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(is_tagged_value)
}

/// Attach the marker to a normalized payload.
pub fn tag(mut map: Map<String, Value>) -> Map<String, Value> {
    map.insert(MODEL_MARKER.to_string(), Value::Bool(true));
    map
}

/// Remove the marker before the payload reaches the model store.
pub fn strip(mut map: Map<String, Value>) -> Map<String, Value> {
    map.remove(MODEL_MARKER);
    map
}

/// Empty values short-circuit both walks.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
