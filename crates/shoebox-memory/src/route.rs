use shoebox::{HookError, Model, RouteModelState, RouteName, ShoeboxRoute};

use crate::record::MemoryRecord;

type Fetch = Box<dyn FnMut() -> Result<Model<MemoryRecord>, HookError>>;

/// A route whose model fetch is a closure.
pub struct MemoryRoute {
    name: RouteName,
    state: RouteModelState,
    fetch: Fetch,
    enabled: bool,
    model_name: Option<String>,
    fetches: usize,
}

impl MemoryRoute {
    pub fn new<F>(identifier: &str, fetch: F) -> Self
    where
        F: FnMut() -> Result<Model<MemoryRecord>, HookError> + 'static,
    {
        Self {
            name: RouteName::new(identifier),
            state: RouteModelState::default(),
            fetch: Box::new(fetch),
            enabled: true,
            model_name: None,
            fetches: 0,
        }
    }

    /// A route that always fetches a copy of `model`.
    pub fn with_model(identifier: &str, model: Model<MemoryRecord>) -> Self {
        Self::new(identifier, move || Ok(model.clone()))
    }

    /// Opt this route out of serialization.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }

    /// How many times the route's own fetch ran.
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    pub fn state(&self) -> &RouteModelState {
        &self.state
    }
}

impl ShoeboxRoute for MemoryRoute {
    type Record = MemoryRecord;

    fn route_name(&self) -> &RouteName {
        &self.name
    }

    fn model_state(&mut self) -> &mut RouteModelState {
        &mut self.state
    }

    fn model(&mut self) -> Result<Model<MemoryRecord>, HookError> {
        self.fetches += 1;
        (self.fetch)()
    }

    fn shoebox_route_enabled(&self) -> bool {
        self.enabled
    }

    fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }
}
