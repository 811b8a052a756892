//! Shoebox configuration.
//!
//! `ShoeboxConfig::from_env()` reads the environment, `with_*` methods
//! override individual fields:
//! - `SHOEBOX_SERVER_RENDER` (default false): this process is the server
//!   renderer and produces shoebox entries instead of consuming them.
//! - `SHOEBOX_ENABLED` (default true): global switch for serialization.
//! - `SHOEBOX_NODE_PREFIX` (default `shoebox-`): prefix of the markup node id
//!   backing each entry.

use shoebox_route_key::DEFAULT_NODE_PREFIX;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShoeboxConfig {
    /// True only while rendering on the server.
    pub server_render: bool,

    /// When false no route serializes its model, regardless of its own flag.
    pub enabled: bool,

    /// Markup node id prefix, joined with the route key.
    pub node_prefix: String,
}

impl Default for ShoeboxConfig {
    fn default() -> Self {
        Self {
            server_render: false,
            enabled: true,
            node_prefix: DEFAULT_NODE_PREFIX.to_string(),
        }
    }
}

fn truthy(v: &str) -> bool {
    let s = v.trim().to_ascii_lowercase();
    s == "1" || s == "true" || s == "on" || s == "yes"
}

impl ShoeboxConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("SHOEBOX_SERVER_RENDER") {
            cfg.server_render = truthy(&v);
        }

        if let Ok(v) = std::env::var("SHOEBOX_ENABLED") {
            cfg.enabled = truthy(&v);
        }

        if let Ok(v) = std::env::var("SHOEBOX_NODE_PREFIX") {
            let s = v.trim();
            if !s.is_empty() {
                cfg.node_prefix = s.to_string();
            }
        }

        cfg
    }

    /// Configuration for the server renderer.
    pub fn server() -> Self {
        Self::default().with_server_render(true)
    }

    /// Configuration for a booting client.
    pub fn client() -> Self {
        Self::default()
    }

    pub fn with_server_render(mut self, on: bool) -> Self {
        self.server_render = on;
        self
    }

    pub fn with_enabled(mut self, on: bool) -> Self {
        self.enabled = on;
        self
    }

    pub fn with_node_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.node_prefix = prefix.into();
        self
    }
}
