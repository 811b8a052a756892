//! Model schemas: which attributes and relationships a model type has.

use heck::ToKebabCase;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationshipKind {
    BelongsTo,
    HasMany,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDef {
    pub kind: RelationshipKind,
    pub model_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    pub name: String,
    /// Resource type used in payloads, e.g. `posts` for `post`.
    pub type_key: String,
    pub attributes: Vec<String>,
    pub relationships: IndexMap<String, RelationshipDef>,
}

impl ModelSchema {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            type_key: payload_type(&name),
            name,
            attributes: Vec::new(),
            relationships: IndexMap::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }

    pub fn belongs_to(mut self, name: impl Into<String>, model_name: impl Into<String>) -> Self {
        self.relationships.insert(
            name.into(),
            RelationshipDef {
                kind: RelationshipKind::BelongsTo,
                model_name: model_name.into(),
            },
        );
        self
    }

    pub fn has_many(mut self, name: impl Into<String>, model_name: impl Into<String>) -> Self {
        self.relationships.insert(
            name.into(),
            RelationshipDef {
                kind: RelationshipKind::HasMany,
                model_name: model_name.into(),
            },
        );
        self
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }
}

/// Payload resource type for a model name: dash-cased and pluralized.
pub fn payload_type(model_name: &str) -> String {
    pluralize(&model_name.to_kebab_case())
}

/// English plural of the last word, covering the regular cases.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let ends_with_consonant_y = word.ends_with('y')
        && !word[..word.len() - 1].ends_with(['a', 'e', 'i', 'o', 'u']);
    if ends_with_consonant_y {
        format!("{}ies", &word[..word.len() - 1])
    } else if word.ends_with(['s', 'x', 'z']) || word.ends_with("ch") || word.ends_with("sh") {
        format!("{word}es")
    } else {
        format!("{word}s")
    }
}
