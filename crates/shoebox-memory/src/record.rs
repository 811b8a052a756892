use indexmap::IndexMap;
use serde_json::{Map, Value};

use shoebox::{Record, RelationshipSnapshot, Snapshot};

/// A record held in a [`MemoryModelStore`](crate::MemoryModelStore).
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    model_name: String,
    id: String,
    attributes: Map<String, Value>,
    relationships: IndexMap<String, RelationshipSnapshot>,
}

impl MemoryRecord {
    pub fn new(model_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            id: id.into(),
            attributes: Map::new(),
            relationships: IndexMap::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn with_relationship(mut self, name: impl Into<String>, rel: RelationshipSnapshot) -> Self {
        self.relationships.insert(name.into(), rel);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn relationship(&self, name: &str) -> Option<&RelationshipSnapshot> {
        self.relationships.get(name)
    }

    /// Apply pushed attributes and relationships over the current state.
    pub(crate) fn merge(&mut self, other: MemoryRecord) {
        self.attributes.extend(other.attributes);
        self.relationships.extend(other.relationships);
    }
}

impl Record for MemoryRecord {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            model_name: self.model_name.clone(),
            id: Some(self.id.clone()),
            attributes: self.attributes.clone(),
            relationships: self.relationships.clone(),
        }
    }
}
