use thiserror::Error;

/// Boxed failure raised by a route's own model hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ShoeboxError {
    #[error("shoebox entry `{key}` is not valid JSON: {source}")]
    MalformedEntry {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed shoebox payload: {0}")]
    MalformedPayload(String),
    #[error("no model registered for `{0}`")]
    UnknownModel(String),
    #[error("collection element {index} is not a record")]
    NotARecord { index: usize },
    #[error("record serialization failed: {0}")]
    Serialize(String),
    #[error("route model hook failed: {0}")]
    ModelHook(#[source] HookError),
}

impl ShoeboxError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        ShoeboxError::MalformedPayload(msg.into())
    }
}
