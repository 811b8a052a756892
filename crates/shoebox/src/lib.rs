//! shoebox: hand server-rendered route models to the client.
//!
//! During a server render every route's finished model is walked, its
//! records are serialized and tagged, and the resulting tree is put into an
//! embedded store under the route key. When the client boots, the route
//! reads that tree back, pushes the tagged payloads into its model store and
//! uses the live records as its model instead of fetching again.
//!
//! The embedded store, the model store and the routes themselves are
//! collaborators behind the [`EmbeddedStore`], [`ModelStore`] and
//! [`ShoeboxRoute`] traits.

pub mod config;
pub mod embedded;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod node;
pub mod route;
pub mod shoebox;
pub mod transfer;

pub use config::ShoeboxConfig;
pub use embedded::EmbeddedStore;
pub use error::{HookError, ShoeboxError};
pub use lifecycle::RouteLifecycle;
pub use model::{
    Model, ModelStore, Pushed, Record, RecordSerializer, RelationshipSnapshot, SerializeOptions,
    Snapshot,
};
pub use node::{TransferNode, MODEL_MARKER};
pub use route::{ModelHook, RouteModelState, ShoeboxRoute};
pub use shoebox::Shoebox;
pub use shoebox_route_key as route_key;
pub use shoebox_route_key::{resolve_route_key, RouteName};
pub use transfer::{deserialize_shoebox_model, serialize_record_model, serialize_shoebox_model};
