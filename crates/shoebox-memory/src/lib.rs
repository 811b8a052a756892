//! In-memory collaborators for the shoebox protocol.
//!
//! - [`MemoryShoebox`]: the embedded store, with one backing text node per
//!   entry that can be shipped to a client and parsed there.
//! - [`MemoryModelStore`]: schema-checked identity map of [`MemoryRecord`]s
//!   with a JSON:API style default serializer.
//! - [`MemoryRoute`]: a route whose fetch is a closure.

mod embedded;
mod record;
mod route;
mod schema;
mod serializer;
mod store;

pub use embedded::MemoryShoebox;
pub use record::MemoryRecord;
pub use route::MemoryRoute;
pub use schema::{payload_type, pluralize, ModelSchema, RelationshipDef, RelationshipKind};
pub use serializer::JsonApiSerializer;
pub use store::MemoryModelStore;
