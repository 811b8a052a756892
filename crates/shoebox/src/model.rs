//! Model values and the model-layer seams the protocol talks to.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::ShoeboxError;

// ── Route model values ────────────────────────────────────────────────────

/// The value a route resolves as its model.
///
/// On the server this is what the route fetched; on the client it is what
/// the shoebox rehydrated, with live records pushed into the model store.
#[derive(Debug, Clone, PartialEq)]
pub enum Model<R> {
    /// Plain data, passed through both walks unchanged.
    Value(Value),
    /// A single model record.
    Record(R),
    /// A homogeneous record collection. Nested collections are flattened
    /// on serialization.
    Collection(Vec<Model<R>>),
    /// A plain mapping whose fields may hold records at any depth.
    Object(IndexMap<String, Model<R>>),
}

impl<R> Model<R> {
    pub fn null() -> Self {
        Model::Value(Value::Null)
    }

    pub fn records(records: impl IntoIterator<Item = R>) -> Self {
        Model::Collection(records.into_iter().map(Model::Record).collect())
    }

    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Model<R>)>) -> Self {
        Model::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Model::Value(Value::Null))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Model::Value(v) => crate::node::is_empty_value(v),
            Model::Record(_) => false,
            Model::Collection(items) => items.is_empty(),
            Model::Object(fields) => fields.is_empty(),
        }
    }

    pub fn as_record(&self) -> Option<&R> {
        match self {
            Model::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Model<R>> {
        match self {
            Model::Object(fields) => fields.get(field),
            _ => None,
        }
    }

    /// Iterate the records of a collection in order, descending into nested
    /// collections.
    pub fn iter_records(&self) -> Vec<&R> {
        let mut out = Vec::new();
        collect_records(self, &mut out);
        out
    }
}

fn collect_records<'a, R>(model: &'a Model<R>, out: &mut Vec<&'a R>) {
    match model {
        Model::Record(r) => out.push(r),
        Model::Collection(items) => {
            for item in items {
                collect_records(item, out);
            }
        }
        _ => {}
    }
}

impl<R> From<Value> for Model<R> {
    fn from(value: Value) -> Self {
        Model::Value(value)
    }
}

// ── Record snapshots ──────────────────────────────────────────────────────

/// Related record references captured in a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationshipSnapshot {
    BelongsTo {
        model_name: String,
        id: Option<String>,
    },
    HasMany {
        model_name: String,
        ids: Vec<String>,
    },
}

/// Point-in-time view of one record, handed to a serializer.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub model_name: String,
    pub id: Option<String>,
    pub attributes: Map<String, Value>,
    pub relationships: IndexMap<String, RelationshipSnapshot>,
}

impl Snapshot {
    pub fn new(model_name: impl Into<String>, id: Option<String>) -> Self {
        Self {
            model_name: model_name.into(),
            id,
            attributes: Map::new(),
            relationships: IndexMap::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn relationship(mut self, name: impl Into<String>, rel: RelationshipSnapshot) -> Self {
        self.relationships.insert(name.into(), rel);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SerializeOptions {
    pub include_id: bool,
}

// ── Model-layer seams ─────────────────────────────────────────────────────

/// A model record as seen by the protocol.
pub trait Record {
    fn model_name(&self) -> &str;
    fn snapshot(&self) -> Snapshot;
}

pub trait RecordSerializer {
    fn serialize(&self, snapshot: &Snapshot, options: SerializeOptions)
        -> Result<Value, ShoeboxError>;
}

/// What a push into the model store produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Pushed<R> {
    One(R),
    Many(Vec<R>),
}

impl<R> Pushed<R> {
    pub fn into_model(self) -> Model<R> {
        match self {
            Pushed::One(r) => Model::Record(r),
            Pushed::Many(rs) => Model::records(rs),
        }
    }
}

/// The client/server data store that owns model records.
pub trait ModelStore {
    type Record: Record;

    /// Serializer registered for `model_name`, if any.
    fn serializer_for(&self, model_name: &str) -> Option<&dyn RecordSerializer>;

    /// Serializer used when no type-specific one is registered.
    fn default_serializer(&self) -> &dyn RecordSerializer;

    /// Normalize serialized record JSON against the schema of `model_name`.
    fn normalize(&self, model_name: &str, json: Value) -> Result<Value, ShoeboxError>;

    /// Insert a normalized payload, returning the live record(s).
    fn push(&mut self, payload: Value) -> Result<Pushed<Self::Record>, ShoeboxError>;
}
