//! Live configuration over layered JSON5 files.

use pretty_assertions::assert_eq;
use propbind::{ConfigSchema, LayeredSourceOptions, LiveConfig, OVERRIDES_LAYER, config_schema};
use propbind::source::ConfigLayerSource;
use propbind_test_utils::ConfigTree;

config_schema! {
    pub struct Database at "db" {
        value get_host: String = "localhost";
        value get_pool: u32 = "4";
        value get_replicas: Vec<String> = "";
        value is_read_only: bool = "false";
    }
}

fn isolated(tree: &ConfigTree) -> LayeredSourceOptions {
    let mut options = LayeredSourceOptions::new(tree.root().join("project"));
    options.system_config_path = None;
    options.user_config_path = None;
    options
}

/// Files, overrides and defaults combine per key.
#[test]
fn file_layers_feed_bound_schemas() {
    let tree = ConfigTree::new().expect("tree");
    tree.write("project/.git/HEAD", "ref: refs/heads/main")
        .expect("marker");
    tree.write(
        "project/propbind.json5",
        "{ db: { host: 'db.internal', replicas: ['r1', 'r2'] } }",
    )
    .expect("project layer");

    let live = LiveConfig::load(isolated(&tree)).expect("load");
    assert_eq!(live.layers().len(), 1);
    assert_eq!(live.layers()[0].source, ConfigLayerSource::Project);

    let db = live.bind::<Database>().expect("bind");
    assert_eq!(db.get_host().expect("host"), "db.internal");
    assert_eq!(db.get_pool().expect("pool"), 4);
    assert_eq!(
        db.get_replicas().expect("replicas"),
        vec!["r1".to_string(), "r2".to_string()]
    );
    assert!(!db.is_read_only().expect("read only"));

    live.apply_override("db.readOnly=true").expect("override");
    live.apply_override("db.host=primary").expect("override");
    assert!(db.is_read_only().expect("read only"));
    assert_eq!(db.get_host().expect("host"), "primary");
    assert_eq!(live.origin_of("db.host"), Some(OVERRIDES_LAYER));

    live.overrides().clear();
    assert_eq!(db.get_host().expect("host"), "db.internal");
    assert_eq!(db.bound().key_of("is_read_only"), Some("db.readOnly"));
}

/// Runtime files are stacked above local layers.
#[test]
fn runtime_file_wins_over_project_file() {
    let tree = ConfigTree::new().expect("tree");
    tree.write("project/.git/HEAD", "").expect("marker");
    tree.write("project/propbind.json5", "{ db: { pool: 8 } }")
        .expect("project layer");
    let runtime = tree
        .write("runtime.json5", "{ db: { pool: 16 } }")
        .expect("runtime layer");

    let live = LiveConfig::load(isolated(&tree).with_runtime_path(runtime)).expect("load");
    let db = live.bind::<Database>().expect("bind");
    assert_eq!(db.get_pool().expect("pool"), 16);
    assert!(
        live.origin_of("db.pool")
            .is_some_and(|layer| layer.starts_with("runtime("))
    );
}

/// Logging setup may be called repeatedly.
#[test]
fn init_logging_is_idempotent() {
    propbind::init_logging();
    propbind::init_logging();
}
