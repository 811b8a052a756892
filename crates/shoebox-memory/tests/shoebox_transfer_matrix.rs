use serde_json::{json, Value};

use shoebox::{
    EmbeddedStore, Model, ModelHook, RecordSerializer, RelationshipSnapshot, RouteLifecycle,
    SerializeOptions, Shoebox, ShoeboxConfig, ShoeboxError, ShoeboxRoute, Snapshot,
};
use shoebox_memory::{MemoryModelStore, MemoryRecord, MemoryRoute, MemoryShoebox, ModelSchema};

type Lifecycle = RouteLifecycle<MemoryShoebox, MemoryModelStore>;

fn schemas() -> MemoryModelStore {
    MemoryModelStore::new()
        .with_schema(
            ModelSchema::new("post")
                .attr("title")
                .attr("body")
                .belongs_to("author", "user")
                .has_many("comments", "comment"),
        )
        .with_schema(ModelSchema::new("user").attr("name"))
        .with_schema(ModelSchema::new("comment").attr("text"))
}

fn post(id: &str, title: &str) -> MemoryRecord {
    MemoryRecord::new("post", id).with_attr("title", json!(title))
}

fn server() -> Lifecycle {
    RouteLifecycle::new(Shoebox::new(
        ShoeboxConfig::server(),
        MemoryShoebox::new(),
        schemas(),
    ))
}

/// Ship the server's shoebox nodes into a freshly booted client.
fn boot_client(server: Lifecycle) -> Lifecycle {
    let (shoebox, _) = server.into_inner().into_parts();
    let nodes = shoebox.nodes().unwrap();
    RouteLifecycle::new(Shoebox::new(
        ShoeboxConfig::client(),
        MemoryShoebox::from_nodes("shoebox-", nodes),
        schemas(),
    ))
}

fn live_route(identifier: &str) -> MemoryRoute {
    MemoryRoute::with_model(identifier, Model::Record(post("1", "Fetched live")))
}

fn entry(lifecycle: &Lifecycle, key: &str) -> Option<Value> {
    lifecycle.shoebox().embedded().retrieve(key).unwrap()
}

#[test]
fn posts_show_scenario() {
    let mut server = server();
    let mut route = MemoryRoute::with_model("posts.show", Model::Record(post("1", "Hello")));
    server.activate(&mut route).unwrap();

    assert_eq!(
        entry(&server, "posts-show"),
        Some(json!({
            "post": {
                "data": {"id": "1", "type": "posts", "attributes": {"title": "Hello"}},
                "__emberDataModel": true
            }
        }))
    );

    let mut client = boot_client(server);
    let mut route = live_route("posts.show");
    let model = client.activate(&mut route).unwrap();

    let record = model.as_record().expect("a live post");
    assert_eq!(record.id(), "1");
    assert_eq!(record.attr("title"), Some(&json!("Hello")));
    assert_eq!(route.fetch_count(), 0);
    assert_eq!(route.state().model_name.as_deref(), Some("post"));
    assert!(route.state().loaded_from_shoebox);

    assert_eq!(entry(&client, "posts-show"), None);
    assert!(!client.shoebox().embedded().has_node("shoebox-posts-show"));
    assert!(client.shoebox().model_store().peek_record("post", "1").is_some());
}

#[test]
fn single_record_round_trip_hides_marker() {
    let original = post("4", "Round trip")
        .with_attr("body", json!("text"))
        .with_relationship(
            "author",
            RelationshipSnapshot::BelongsTo {
                model_name: "user".into(),
                id: Some("9".into()),
            },
        )
        .with_relationship(
            "comments",
            RelationshipSnapshot::HasMany {
                model_name: "comment".into(),
                ids: vec!["2".into(), "3".into()],
            },
        );

    let mut server = server();
    let mut route = MemoryRoute::with_model("posts.show", Model::Record(original.clone()));
    server.activate(&mut route).unwrap();

    let mut client = boot_client(server);
    let model = client.activate(&mut live_route("posts.show")).unwrap();
    assert_eq!(model, Model::Record(original));

    let record = model.as_record().unwrap();
    assert!(record.attr("__emberDataModel").is_none());
}

#[test]
fn collection_round_trip_keeps_order() {
    let records = vec![post("3", "c"), post("1", "a"), post("2", "b")];
    let mut server = server();
    let mut route = MemoryRoute::with_model("posts.index", Model::records(records.clone()));
    server.activate(&mut route).unwrap();

    let stored = entry(&server, "posts-index").unwrap();
    assert_eq!(stored["post"].as_array().map(Vec::len), Some(3));

    let mut client = boot_client(server);
    let model = client.activate(&mut live_route("posts.index")).unwrap();
    assert_eq!(model, Model::records(records));
}

#[test]
fn nested_collections_are_flattened() {
    let mut server = server();
    let model = Model::Collection(vec![
        Model::Record(post("1", "a")),
        Model::records([post("2", "b"), post("3", "c")]),
    ]);
    let mut route = MemoryRoute::with_model("posts.index", model);
    server.activate(&mut route).unwrap();

    let mut client = boot_client(server);
    let model = client.activate(&mut live_route("posts.index")).unwrap();
    let records = model.iter_records();
    let ids: Vec<&str> = records.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[test]
fn nested_structure_round_trip() {
    let original = Model::object([
        ("title", Model::Value(json!("Dashboard"))),
        (
            "meta",
            Model::object([
                ("count", Model::Value(json!(3))),
                ("tags", Model::Value(json!(["a", "b"]))),
                ("flag", Model::Value(json!(false))),
            ]),
        ),
        ("featured", Model::Record(post("1", "Top"))),
        (
            "sections",
            Model::object([(
                "latest",
                Model::records([post("2", "b"), post("3", "c")]),
            )]),
        ),
        ("missing", Model::null()),
    ]);

    let mut server = server();
    let mut route = MemoryRoute::with_model("dashboard", original.clone());
    server.activate(&mut route).unwrap();

    let stored = entry(&server, "dashboard").unwrap();
    assert_eq!(stored["model"]["meta"], json!({"count": 3, "tags": ["a", "b"], "flag": false}));
    assert_eq!(stored["model"]["featured"]["__emberDataModel"], json!(true));

    let mut client = boot_client(server);
    let model = client.activate(&mut live_route("dashboard")).unwrap();
    assert_eq!(model, original);
}

#[test]
fn consumption_is_single_use_and_restores_fetching() {
    let mut server = server();
    let mut route = MemoryRoute::with_model("posts.show", Model::Record(post("1", "Hello")));
    server.activate(&mut route).unwrap();

    let mut client = boot_client(server);
    let mut route = live_route("posts.show");
    client.activate(&mut route).unwrap();
    assert_eq!(route.state().active_hook, ModelHook::Shoebox);
    assert_eq!(route.state().original_model, Some(ModelHook::Original));
    assert!(!client.shoebox().embedded().contains("posts-show"));

    let again = client.activate(&mut route).unwrap();
    assert_eq!(route.fetch_count(), 1);
    assert_eq!(
        again.as_record().and_then(|r| r.attr("title")),
        Some(&json!("Fetched live"))
    );
    assert_eq!(route.state().active_hook, ModelHook::Original);
    assert_eq!(route.state().original_model, None);
}

#[test]
fn first_writer_wins() {
    let mut server = server();
    let mut first = MemoryRoute::with_model("posts.show", Model::Record(post("1", "First")));
    let mut second = MemoryRoute::with_model("posts.show", Model::Record(post("2", "Second")));

    assert!(server
        .shoebox_mut()
        .capture_model_for_transfer(&mut first, &Model::Record(post("1", "First")))
        .unwrap());
    let stored = entry(&server, "posts-show");

    server.activate(&mut second).unwrap();
    assert_eq!(entry(&server, "posts-show"), stored);
    assert_eq!(
        stored.unwrap()["post"]["data"]["attributes"]["title"],
        json!("First")
    );
    assert_eq!(first.fetch_count(), 0);
}

#[test]
fn server_never_loads_from_its_own_shoebox() {
    let mut server = server();
    server
        .shoebox_mut()
        .embedded_mut()
        .put("posts-show", json!({"post": "stale"}));

    let mut route = live_route("posts.show");
    assert!(!server.shoebox().should_load_from_shoebox("posts-show"));
    server.activate(&mut route).unwrap();
    assert_eq!(route.fetch_count(), 1);
    assert_eq!(entry(&server, "posts-show"), Some(json!({"post": "stale"})));
}

#[test]
fn opted_out_routes_and_null_models_are_not_stored() {
    let mut server = server();
    let mut disabled = MemoryRoute::with_model("a", Model::Record(post("1", "x"))).disabled();
    let mut null = MemoryRoute::with_model("b", Model::null());
    server.activate(&mut disabled).unwrap();
    server.activate(&mut null).unwrap();
    assert_eq!(entry(&server, "a"), None);
    assert_eq!(entry(&server, "b"), None);

    let mut switched_off = RouteLifecycle::new(Shoebox::new(
        ShoeboxConfig::server().with_enabled(false),
        MemoryShoebox::new(),
        schemas(),
    ));
    let mut route = MemoryRoute::with_model("c", Model::Record(post("1", "x")));
    switched_off.activate(&mut route).unwrap();
    assert_eq!(entry(&switched_off, "c"), None);
}

#[test]
fn declared_model_name_is_used_for_the_entry() {
    let mut server = server();
    let mut route =
        MemoryRoute::with_model("posts.show", Model::Record(post("1", "x"))).with_model_name("article");
    server.activate(&mut route).unwrap();
    assert!(entry(&server, "posts-show").unwrap().get("article").is_some());

    let mut client = boot_client(server);
    let mut route = live_route("posts.show");
    client.activate(&mut route).unwrap();
    assert_eq!(route.state().model_name.as_deref(), Some("article"));
}

#[test]
fn malformed_entry_fails_the_activation() {
    let mut client = RouteLifecycle::new(Shoebox::new(
        ShoeboxConfig::client(),
        MemoryShoebox::from_nodes("shoebox-", [("shoebox-posts-show", "{oops")]),
        schemas(),
    ));
    let mut route = live_route("posts.show");
    let err = client.activate(&mut route).unwrap_err();
    assert!(matches!(err, ShoeboxError::MalformedEntry { ref key, .. } if key == "posts-show"));
    assert_eq!(route.fetch_count(), 0);
    assert!(client.shoebox().embedded().contains("posts-show"));
}

#[test]
fn unknown_model_type_fails_serialization() {
    let mut server = RouteLifecycle::new(Shoebox::new(
        ShoeboxConfig::server(),
        MemoryShoebox::new(),
        MemoryModelStore::new(),
    ));
    let mut route = MemoryRoute::with_model("posts.show", Model::Record(post("1", "x")));
    let err = server.activate(&mut route).unwrap_err();
    assert!(matches!(err, ShoeboxError::UnknownModel(ref name) if name == "post"));
    assert!(!server.shoebox().embedded().contains("posts-show"));
}

#[test]
fn model_hook_errors_propagate() {
    let mut server = server();
    let mut route = MemoryRoute::new("posts.show", || Err("backend down".into()));
    let err = server.activate(&mut route).unwrap_err();
    assert!(matches!(err, ShoeboxError::ModelHook(_)));
    assert_eq!(err.to_string(), "route model hook failed: backend down");
    assert!(!server.shoebox().embedded().contains("posts-show"));
}

struct ShoutingSerializer;

impl RecordSerializer for ShoutingSerializer {
    fn serialize(
        &self,
        snapshot: &Snapshot,
        options: SerializeOptions,
    ) -> Result<Value, ShoeboxError> {
        assert!(options.include_id);
        let title = snapshot.attributes["title"].as_str().unwrap_or_default();
        Ok(json!({
            "data": {
                "id": snapshot.id,
                "type": "posts",
                "attributes": {"title": title.to_uppercase()}
            }
        }))
    }
}

#[test]
fn type_specific_serializer_overrides_default() {
    let mut server = RouteLifecycle::new(Shoebox::new(
        ShoeboxConfig::server(),
        MemoryShoebox::new(),
        schemas().with_serializer("post", ShoutingSerializer),
    ));
    let mut route = MemoryRoute::with_model("posts.show", Model::Record(post("1", "quiet")));
    server.activate(&mut route).unwrap();
    assert_eq!(
        entry(&server, "posts-show").unwrap()["post"]["data"]["attributes"]["title"],
        json!("QUIET")
    );
}

#[test]
fn already_tagged_payloads_survive_re_serialization() {
    let tagged = json!({
        "data": {"id": "5", "type": "posts", "attributes": {"title": "pre"}},
        "__emberDataModel": true
    });
    let mut server = server();
    let mut route = MemoryRoute::with_model("posts.show", Model::Value(tagged.clone()));
    server.activate(&mut route).unwrap();
    assert_eq!(entry(&server, "posts-show"), Some(json!({"model": tagged})));

    let mut client = boot_client(server);
    let model = client.activate(&mut live_route("posts.show")).unwrap();
    assert_eq!(model.as_record().map(|r| r.id()), Some("5"));
}

#[test]
fn decide_without_entry_keeps_original_hook() {
    let client = RouteLifecycle::new(Shoebox::new(
        ShoeboxConfig::client(),
        MemoryShoebox::new(),
        schemas(),
    ));
    let mut route = live_route("posts.show");
    assert_eq!(
        client.shoebox().decide_model_source(&mut route),
        ModelHook::Original
    );
    assert_eq!(route.model_state().original_model, None);
}
