//! The recursive serialize / deserialize walks.
//!
//! Serialization replaces every record (or record collection) found in a
//! route model with its normalized, tagged payload. Deserialization does the
//! reverse: tagged payloads are stripped and pushed into the model store,
//! and the live records take their place. Untagged objects are descended
//! into; everything else passes through unchanged.

use serde_json::{Map, Value};

use crate::error::ShoeboxError;
use crate::model::{Model, ModelStore, Pushed, Record, SerializeOptions, Snapshot};
use crate::node::{is_empty_value, strip, tag, NodeKind, TransferNode};

// ── Serialize ─────────────────────────────────────────────────────────────

/// Walk a route model, serializing every record it contains.
pub fn serialize_shoebox_model<M: ModelStore>(
    store: &M,
    model: &Model<M::Record>,
) -> Result<Value, ShoeboxError> {
    match model {
        Model::Value(v) => Ok(v.clone()),
        Model::Collection(items) if items.is_empty() => Ok(Value::Array(Vec::new())),
        Model::Record(_) | Model::Collection(_) => serialize_record_model(store, model),
        Model::Object(fields) => {
            let mut out = Map::with_capacity(fields.len());
            for (key, field) in fields {
                out.insert(key.clone(), serialize_shoebox_model(store, field)?);
            }
            Ok(Value::Object(out))
        }
    }
}

/// Serialize one record or a record collection into tagged payload(s).
///
/// Collections are flattened first; the serializer and schema for the whole
/// collection are looked up from the first record's type.
pub fn serialize_record_model<M: ModelStore>(
    store: &M,
    model: &Model<M::Record>,
) -> Result<Value, ShoeboxError> {
    match model {
        Model::Record(record) => {
            serialize_snapshot(store, record.model_name(), &record.snapshot())
        }
        Model::Collection(items) => {
            let mut records = Vec::new();
            flatten(items, &mut records)?;
            let Some(first) = records.first() else {
                return Ok(Value::Array(Vec::new()));
            };
            let model_name = first.model_name().to_string();
            records
                .iter()
                .map(|record| serialize_snapshot(store, &model_name, &record.snapshot()))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        _ => Err(ShoeboxError::NotARecord { index: 0 }),
    }
}

fn flatten<'a, R>(items: &'a [Model<R>], out: &mut Vec<&'a R>) -> Result<(), ShoeboxError> {
    for item in items {
        match item {
            Model::Record(record) => out.push(record),
            Model::Collection(nested) => flatten(nested, out)?,
            _ => return Err(ShoeboxError::NotARecord { index: out.len() }),
        }
    }
    Ok(())
}

fn serialize_snapshot<M: ModelStore>(
    store: &M,
    model_name: &str,
    snapshot: &Snapshot,
) -> Result<Value, ShoeboxError> {
    let serializer = store
        .serializer_for(model_name)
        .unwrap_or_else(|| store.default_serializer());
    let json = serializer.serialize(snapshot, SerializeOptions { include_id: true })?;
    match store.normalize(model_name, json)? {
        Value::Object(map) => Ok(Value::Object(tag(map))),
        other => Err(ShoeboxError::malformed(format!(
            "normalized `{model_name}` payload is not an object: {other}"
        ))),
    }
}

// ── Deserialize ───────────────────────────────────────────────────────────

/// Walk a retrieved transfer node, pushing tagged payloads into the store.
pub fn deserialize_shoebox_model<M: ModelStore>(
    store: &mut M,
    node: Value,
) -> Result<Model<M::Record>, ShoeboxError> {
    if is_empty_value(&node) {
        return Ok(Model::Value(node));
    }

    let kind = TransferNode::classify(&node).kind();
    match (kind, node) {
        (NodeKind::Tagged, Value::Object(map)) => {
            Ok(store.push(Value::Object(strip(map)))?.into_model())
        }
        (NodeKind::TaggedCollection, Value::Array(items)) => {
            let mut records = Vec::with_capacity(items.len());
            for item in items {
                let Value::Object(map) = item else {
                    return Err(ShoeboxError::malformed("tagged collection element is not an object"));
                };
                match store.push(Value::Object(strip(map)))? {
                    Pushed::One(record) => records.push(record),
                    Pushed::Many(many) => records.extend(many),
                }
            }
            Ok(Model::records(records))
        }
        (NodeKind::Mapping, Value::Object(map)) => {
            let mut fields = indexmap::IndexMap::with_capacity(map.len());
            for (key, value) in map {
                fields.insert(key, deserialize_shoebox_model(store, value)?);
            }
            Ok(Model::Object(fields))
        }
        (_, other) => Ok(Model::Value(other)),
    }
}
