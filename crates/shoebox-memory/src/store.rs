//! MemoryModelStore: schema-checked identity map of records.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use shoebox::{ModelStore, Pushed, Record, RecordSerializer, RelationshipSnapshot, ShoeboxError};

use crate::record::MemoryRecord;
use crate::schema::{ModelSchema, RelationshipDef, RelationshipKind};
use crate::serializer::JsonApiSerializer;

#[derive(Default)]
pub struct MemoryModelStore {
    schemas: IndexMap<String, ModelSchema>,
    serializers: HashMap<String, Box<dyn RecordSerializer>>,
    default_serializer: JsonApiSerializer,
    records: IndexMap<(String, String), MemoryRecord>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, schema: ModelSchema) -> Self {
        self.register(schema);
        self
    }

    pub fn register(&mut self, schema: ModelSchema) {
        self.schemas.insert(schema.name.clone(), schema);
    }

    /// Use `serializer` instead of the JSON:API default for one model type.
    pub fn with_serializer(
        mut self,
        model_name: impl Into<String>,
        serializer: impl RecordSerializer + 'static,
    ) -> Self {
        self.serializers
            .insert(model_name.into(), Box::new(serializer));
        self
    }

    pub fn schema(&self, model_name: &str) -> Result<&ModelSchema, ShoeboxError> {
        self.schemas
            .get(model_name)
            .ok_or_else(|| ShoeboxError::UnknownModel(model_name.to_string()))
    }

    fn schema_for_type(&self, type_key: &str) -> Result<&ModelSchema, ShoeboxError> {
        self.schemas
            .values()
            .find(|s| s.type_key == type_key)
            .ok_or_else(|| ShoeboxError::UnknownModel(type_key.to_string()))
    }

    /// Add a record created locally (e.g. by a server-side fetch).
    pub fn create_record(&mut self, record: MemoryRecord) -> Result<MemoryRecord, ShoeboxError> {
        self.schema(record.model_name())?;
        let key = (record.model_name().to_string(), record.id().to_string());
        self.records.insert(key, record.clone());
        Ok(record)
    }

    pub fn peek_record(&self, model_name: &str, id: &str) -> Option<&MemoryRecord> {
        self.records
            .get(&(model_name.to_string(), id.to_string()))
    }

    pub fn peek_all<'a>(&'a self, model_name: &'a str) -> impl Iterator<Item = &'a MemoryRecord> {
        self.records
            .iter()
            .filter(move |((name, _), _)| name == model_name)
            .map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn upsert(&mut self, resource: Value) -> Result<MemoryRecord, ShoeboxError> {
        let Value::Object(resource) = resource else {
            return Err(ShoeboxError::malformed("resource is not an object"));
        };
        let type_key = resource
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ShoeboxError::malformed("resource has no `type`"))?;
        let schema = self.schema_for_type(type_key)?;
        let id = match resource.get("id") {
            Some(id) => id_string(id)?,
            None => return Err(ShoeboxError::malformed("resource has no `id`")),
        };

        let mut record = MemoryRecord::new(schema.name.clone(), id.clone());
        if let Some(Value::Object(attributes)) = resource.get("attributes") {
            for (name, value) in attributes {
                if schema.has_attribute(name) {
                    record = record.with_attr(name.clone(), value.clone());
                }
            }
        }
        if let Some(Value::Object(relationships)) = resource.get("relationships") {
            for (name, def) in &schema.relationships {
                if let Some(rel) = relationships.get(name) {
                    record = record.with_relationship(name.clone(), parse_relationship(def, rel)?);
                }
            }
        }

        let key = (schema.name.clone(), id);
        let live = match self.records.get_mut(&key) {
            Some(existing) => {
                existing.merge(record);
                existing.clone()
            }
            None => {
                self.records.insert(key, record.clone());
                record
            }
        };
        Ok(live)
    }
}

fn id_string(id: &Value) -> Result<String, ShoeboxError> {
    match id {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ShoeboxError::malformed(format!("invalid id {other}"))),
    }
}

fn parse_relationship(def: &RelationshipDef, rel: &Value) -> Result<RelationshipSnapshot, ShoeboxError> {
    let data = rel.get("data").unwrap_or(&Value::Null);
    match (&def.kind, data) {
        (RelationshipKind::BelongsTo, Value::Null) => Ok(RelationshipSnapshot::BelongsTo {
            model_name: def.model_name.clone(),
            id: None,
        }),
        (RelationshipKind::BelongsTo, Value::Object(linkage)) => {
            let id = linkage
                .get("id")
                .map(id_string)
                .transpose()?;
            Ok(RelationshipSnapshot::BelongsTo {
                model_name: def.model_name.clone(),
                id,
            })
        }
        (RelationshipKind::HasMany, Value::Array(items)) => {
            let ids = items
                .iter()
                .map(|item| match item.get("id") {
                    Some(id) => id_string(id),
                    None => Err(ShoeboxError::malformed("relationship linkage has no `id`")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RelationshipSnapshot::HasMany {
                model_name: def.model_name.clone(),
                ids,
            })
        }
        (_, other) => Err(ShoeboxError::malformed(format!(
            "unexpected relationship data {other}"
        ))),
    }
}

impl ModelStore for MemoryModelStore {
    type Record = MemoryRecord;

    fn serializer_for(&self, model_name: &str) -> Option<&dyn RecordSerializer> {
        self.serializers.get(model_name).map(Box::as_ref)
    }

    fn default_serializer(&self) -> &dyn RecordSerializer {
        &self.default_serializer
    }

    fn normalize(&self, model_name: &str, json: Value) -> Result<Value, ShoeboxError> {
        let schema = self.schema(model_name)?;
        let Value::Object(mut document) = json else {
            return Err(ShoeboxError::malformed(format!(
                "serialized `{model_name}` is not an object"
            )));
        };
        let Some(Value::Object(mut data)) = document.remove("data") else {
            return Err(ShoeboxError::malformed(format!(
                "serialized `{model_name}` has no `data` object"
            )));
        };

        if let Some(kind) = data.get("type").and_then(Value::as_str) {
            if kind != schema.type_key {
                return Err(ShoeboxError::malformed(format!(
                    "expected type `{}`, found `{kind}`",
                    schema.type_key
                )));
            }
        }

        let mut out = Map::new();
        if let Some(id) = data.remove("id") {
            out.insert("id".into(), Value::String(id_string(&id)?));
        }
        out.insert("type".into(), Value::String(schema.type_key.clone()));

        let attributes: Map<String, Value> = match data.remove("attributes") {
            Some(Value::Object(attrs)) => attrs
                .into_iter()
                .filter(|(name, _)| schema.has_attribute(name))
                .collect(),
            _ => Map::new(),
        };
        out.insert("attributes".into(), Value::Object(attributes));

        if let Some(Value::Object(rels)) = data.remove("relationships") {
            let relationships: Map<String, Value> = rels
                .into_iter()
                .filter(|(name, _)| schema.relationships.contains_key(name))
                .collect();
            if !relationships.is_empty() {
                out.insert("relationships".into(), Value::Object(relationships));
            }
        }

        Ok(json!({ "data": out }))
    }

    fn push(&mut self, payload: Value) -> Result<Pushed<MemoryRecord>, ShoeboxError> {
        let Value::Object(mut document) = payload else {
            return Err(ShoeboxError::malformed("push payload is not an object"));
        };
        if let Some(Value::Array(included)) = document.remove("included") {
            for resource in included {
                self.upsert(resource)?;
            }
        }
        match document.remove("data") {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| self.upsert(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Pushed::Many),
            Some(resource @ Value::Object(_)) => self.upsert(resource).map(Pushed::One),
            _ => Err(ShoeboxError::malformed("push payload has no `data`")),
        }
    }
}
