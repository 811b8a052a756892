//! Renders `posts.show` on a simulated server, ships the shoebox nodes to a
//! simulated client and boots the same route there.
//!
//! Run with `RUST_LOG=debug` to see every protocol decision.

use env_logger::{Builder, Env};
use log::{error, info};
use serde_json::json;

use shoebox::{Model, Record, RouteLifecycle, Shoebox, ShoeboxConfig, ShoeboxError};
use shoebox_memory::{MemoryModelStore, MemoryRecord, MemoryRoute, MemoryShoebox, ModelSchema};

fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn schemas() -> MemoryModelStore {
    MemoryModelStore::new().with_schema(ModelSchema::new("post").attr("title").attr("body"))
}

fn run() -> Result<(), ShoeboxError> {
    let config = ShoeboxConfig::from_env();

    // ----- server render -----
    let mut server_store = schemas();
    let post = server_store.create_record(
        MemoryRecord::new("post", "1")
            .with_attr("title", json!("Hello"))
            .with_attr("body", json!("First post")),
    )?;
    let mut server = RouteLifecycle::new(Shoebox::new(
        config.clone().with_server_render(true),
        MemoryShoebox::with_prefix(config.node_prefix.clone()),
        server_store,
    ));
    let mut route = MemoryRoute::with_model("posts.show", Model::Record(post));
    server.activate(&mut route)?;

    let (server_shoebox, _) = server.into_inner().into_parts();
    info!("server markup:\n{}", server_shoebox.render_markup()?);

    // ----- client boot -----
    let nodes = server_shoebox.nodes()?;
    let mut client = RouteLifecycle::new(Shoebox::new(
        config.clone().with_server_render(false),
        MemoryShoebox::from_nodes(&config.node_prefix, nodes),
        schemas(),
    ));
    let mut route = MemoryRoute::new("posts.show", || {
        Ok(Model::Record(
            MemoryRecord::new("post", "1").with_attr("title", json!("Fetched live")),
        ))
    });

    let model = client.activate(&mut route)?;
    if let Some(record) = model.as_record() {
        info!(
            "client booted `{}` {} from the shoebox: title = {}",
            record.model_name(),
            record.id(),
            record.attr("title").cloned().unwrap_or_default()
        );
    }
    info!("fetches after boot: {}", route.fetch_count());

    client.activate(&mut route)?;
    info!("fetches after revisiting: {}", route.fetch_count());
    Ok(())
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}
