//! JSON:API style record serialization.
//!
//! A snapshot becomes
//! `{ "data": { "id", "type", "attributes", "relationships" } }`, where the
//! type is the dash-cased plural of the model name and `id` is only written
//! when requested.

use serde_json::{json, Map, Value};

use shoebox::{RecordSerializer, RelationshipSnapshot, SerializeOptions, ShoeboxError, Snapshot};

use crate::schema::payload_type;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonApiSerializer;

impl JsonApiSerializer {
    fn relationship(rel: &RelationshipSnapshot) -> Value {
        match rel {
            RelationshipSnapshot::BelongsTo { model_name, id } => match id {
                Some(id) => json!({ "data": { "type": payload_type(model_name), "id": id } }),
                None => json!({ "data": null }),
            },
            RelationshipSnapshot::HasMany { model_name, ids } => {
                let kind = payload_type(model_name);
                let data: Vec<Value> = ids
                    .iter()
                    .map(|id| json!({ "type": kind, "id": id }))
                    .collect();
                json!({ "data": data })
            }
        }
    }
}

impl RecordSerializer for JsonApiSerializer {
    fn serialize(
        &self,
        snapshot: &Snapshot,
        options: SerializeOptions,
    ) -> Result<Value, ShoeboxError> {
        let mut data = Map::new();
        if options.include_id {
            if let Some(id) = &snapshot.id {
                data.insert("id".into(), Value::String(id.clone()));
            }
        }
        data.insert(
            "type".into(),
            Value::String(payload_type(&snapshot.model_name)),
        );
        data.insert(
            "attributes".into(),
            Value::Object(snapshot.attributes.clone()),
        );
        if !snapshot.relationships.is_empty() {
            let relationships: Map<String, Value> = snapshot
                .relationships
                .iter()
                .map(|(name, rel)| (name.clone(), Self::relationship(rel)))
                .collect();
            data.insert("relationships".into(), Value::Object(relationships));
        }
        Ok(json!({ "data": data }))
    }
}
