//! Route activation pipeline.

use crate::embedded::EmbeddedStore;
use crate::error::ShoeboxError;
use crate::model::{Model, ModelStore};
use crate::route::{ModelHook, ShoeboxRoute};
use crate::shoebox::Shoebox;

/// Drives route activations through a fixed pipeline:
///
/// 1. decide the model source (shoebox or the route's own fetch),
/// 2. resolve the model through that source,
/// 3. capture the finished model for transfer.
///
/// An activation that fails at step 1 or 2 never reaches step 3, so an
/// aborted activation leaves the embedded store untouched.
pub struct RouteLifecycle<E, M> {
    shoebox: Shoebox<E, M>,
}

impl<E, M> RouteLifecycle<E, M>
where
    E: EmbeddedStore,
    M: ModelStore,
{
    pub fn new(shoebox: Shoebox<E, M>) -> Self {
        Self { shoebox }
    }

    pub fn shoebox(&self) -> &Shoebox<E, M> {
        &self.shoebox
    }

    pub fn shoebox_mut(&mut self) -> &mut Shoebox<E, M> {
        &mut self.shoebox
    }

    pub fn into_inner(self) -> Shoebox<E, M> {
        self.shoebox
    }

    pub fn activate<R>(&mut self, route: &mut R) -> Result<Model<M::Record>, ShoeboxError>
    where
        R: ShoeboxRoute<Record = M::Record>,
    {
        let model = match self.shoebox.decide_model_source(route) {
            ModelHook::Shoebox => self.shoebox.load_shoebox_model(route)?,
            ModelHook::Original => route.model().map_err(ShoeboxError::ModelHook)?,
        };
        self.shoebox.capture_model_for_transfer(route, &model)?;
        Ok(model)
    }
}
