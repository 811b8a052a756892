//! Shoebox: store selection around a route's model fetch.
//!
//! Client side, [`Shoebox::decide_model_source`] swaps the route's model
//! hook for the shoebox when an entry exists, and
//! [`Shoebox::load_shoebox_model`] consumes that entry exactly once.
//! Server side, [`Shoebox::capture_model_for_transfer`] serializes the
//! finished model into the entry for the route key; the first write wins.

use log::{debug, warn};
use serde_json::Value;

use crate::config::ShoeboxConfig;
use crate::embedded::EmbeddedStore;
use crate::error::ShoeboxError;
use crate::model::{Model, ModelStore, Record};
use crate::node::{envelope, open_envelope};
use crate::route::{ModelHook, ShoeboxRoute};
use crate::transfer;

/// Model name stored for roots that are neither a record nor a collection.
pub const DEFAULT_MODEL_NAME: &str = "model";

pub struct Shoebox<E, M> {
    config: ShoeboxConfig,
    embedded: E,
    store: M,
}

impl<E, M> Shoebox<E, M>
where
    E: EmbeddedStore,
    M: ModelStore,
{
    pub fn new(config: ShoeboxConfig, embedded: E, store: M) -> Self {
        Self {
            config,
            embedded,
            store,
        }
    }

    pub fn config(&self) -> &ShoeboxConfig {
        &self.config
    }

    pub fn embedded(&self) -> &E {
        &self.embedded
    }

    pub fn embedded_mut(&mut self) -> &mut E {
        &mut self.embedded
    }

    pub fn model_store(&self) -> &M {
        &self.store
    }

    pub fn model_store_mut(&mut self) -> &mut M {
        &mut self.store
    }

    pub fn into_parts(self) -> (E, M) {
        (self.embedded, self.store)
    }

    /// The server never consumes its own shoebox; a client does whenever a
    /// non-null entry exists under `key`.
    pub fn should_load_from_shoebox(&self, key: &str) -> bool {
        !self.config.server_render && self.embedded.contains(key)
    }

    /// Pick the model hook for this activation, before any fetch runs.
    pub fn decide_model_source<R>(&self, route: &mut R) -> ModelHook
    where
        R: ShoeboxRoute<Record = M::Record>,
    {
        let key = route.route_name().key().to_owned();
        let load = self.should_load_from_shoebox(&key);
        let state = route.model_state();
        if load {
            state.install_shoebox();
            debug!("shoebox: route `{key}` loads its model from the shoebox");
        } else if state.restore_original() {
            debug!("shoebox: route `{key}` restored its original model hook");
        }
        state.active_hook
    }

    /// Retrieve, rehydrate and consume the entry for the route.
    pub fn load_shoebox_model<R>(&mut self, route: &mut R) -> Result<Model<M::Record>, ShoeboxError>
    where
        R: ShoeboxRoute<Record = M::Record>,
    {
        let name = route.route_name().clone();
        let key = name.key();
        let Some(entry) = self.embedded.retrieve(key)? else {
            debug!("shoebox: no entry left for `{key}`");
            return Ok(Model::null());
        };

        let (model_name, node) = open_envelope(key, entry)?;
        let model = transfer::deserialize_shoebox_model(&mut self.store, node)?;

        self.embedded.clear(key);
        let node_id = name.node_id(&self.config.node_prefix);
        if !self.embedded.remove_node(&node_id) {
            warn!("shoebox: backing node `{node_id}` was already gone");
        }

        debug!("shoebox: consumed `{key}` as `{model_name}`");
        route.model_state().model_name = Some(model_name);
        Ok(model)
    }

    /// Serialize the finished model into the route's entry.
    ///
    /// Only runs during a server render, for a non-null model, on an enabled
    /// route whose key holds no entry yet. On the server the route's original
    /// hook is restored afterwards if one was saved. Returns whether an entry
    /// was written.
    pub fn capture_model_for_transfer<R>(
        &mut self,
        route: &mut R,
        model: &Model<M::Record>,
    ) -> Result<bool, ShoeboxError>
    where
        R: ShoeboxRoute<Record = M::Record>,
    {
        let written = self.write_entry(route, model);
        if self.config.server_render && route.model_state().restore_original() {
            debug!(
                "shoebox: route `{}` restored its original model hook",
                route.route_name()
            );
        }
        written
    }

    fn write_entry<R>(&mut self, route: &R, model: &Model<M::Record>) -> Result<bool, ShoeboxError>
    where
        R: ShoeboxRoute<Record = M::Record>,
    {
        if !self.config.server_render
            || !self.config.enabled
            || !route.shoebox_route_enabled()
            || model.is_null()
        {
            return Ok(false);
        }

        let key = route.route_name().key();
        if self.embedded.contains(key) {
            debug!("shoebox: entry `{key}` already written, keeping the first");
            return Ok(false);
        }

        let node = self.serialize_shoebox_model(model)?;
        let model_name = match route.model_name() {
            Some(name) => name.to_string(),
            None => infer_model_name(model),
        };
        debug!("shoebox: writing `{key}` as `{model_name}`");
        self.embedded.put(key, envelope(&model_name, node));
        Ok(true)
    }

    pub fn serialize_shoebox_model(&self, model: &Model<M::Record>) -> Result<Value, ShoeboxError> {
        transfer::serialize_shoebox_model(&self.store, model)
    }

    pub fn serialize_record_model(&self, model: &Model<M::Record>) -> Result<Value, ShoeboxError> {
        transfer::serialize_record_model(&self.store, model)
    }

    pub fn deserialize_shoebox_model(&mut self, node: Value) -> Result<Model<M::Record>, ShoeboxError> {
        transfer::deserialize_shoebox_model(&mut self.store, node)
    }
}

fn infer_model_name<R: Record>(model: &Model<R>) -> String {
    let first = match model {
        Model::Record(record) => Some(record),
        Model::Collection(_) => model.iter_records().into_iter().next(),
        _ => None,
    };
    first.map_or_else(|| DEFAULT_MODEL_NAME.to_string(), |r| r.model_name().to_string())
}
