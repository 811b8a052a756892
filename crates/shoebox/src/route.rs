//! The shoebox-aware route capability and its per-route model state.

use shoebox_route_key::RouteName;

use crate::error::HookError;
use crate::model::Model;

/// Which behavior produces the route's model for the current activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelHook {
    /// The route's own `model` fetch.
    #[default]
    Original,
    /// Rehydration from the shoebox entry.
    Shoebox,
}

/// Model bookkeeping owned by one route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteModelState {
    pub active_hook: ModelHook,
    /// The hook that was active before the shoebox took over.
    pub original_model: Option<ModelHook>,
    /// Set once the route has consumed its shoebox entry; never reset.
    pub loaded_from_shoebox: bool,
    /// Model name recorded in the consumed entry.
    pub model_name: Option<String>,
}

impl RouteModelState {
    /// Save the current hook (once) and switch to the shoebox.
    pub fn install_shoebox(&mut self) {
        if self.original_model.is_none() {
            self.original_model = Some(self.active_hook);
        }
        self.loaded_from_shoebox = true;
        self.active_hook = ModelHook::Shoebox;
    }

    /// Put back the saved hook. Returns false when nothing was saved.
    pub fn restore_original(&mut self) -> bool {
        match self.original_model.take() {
            Some(hook) => {
                self.active_hook = hook;
                true
            }
            None => false,
        }
    }
}

/// A route that takes part in shoebox transfer.
///
/// The lifecycle driver calls into the route at fixed points; nothing has
/// to be chained from the route's own code.
pub trait ShoeboxRoute {
    type Record;

    fn route_name(&self) -> &RouteName;

    fn model_state(&mut self) -> &mut RouteModelState;

    /// The route's own model fetch.
    fn model(&mut self) -> Result<Model<Self::Record>, HookError>;

    /// Opt a single route out of serialization.
    fn shoebox_route_enabled(&self) -> bool {
        true
    }

    /// Name stored alongside the model in the entry. When `None` it is
    /// inferred from the model itself.
    fn model_name(&self) -> Option<&str> {
        None
    }
}
