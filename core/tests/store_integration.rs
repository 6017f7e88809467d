use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use strata_core::{
    default_registry, ConfigStore, FileLoader, LoadResult, Loader, LoaderConfig, MemoryLoader,
    Value,
};

struct Counted<L> {
    inner: L,
    calls: AtomicUsize,
}

impl<L: Loader> Counted<L> {
    fn new(inner: L) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<L: Loader> Loader for Counted<L> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn load(&self, namespace: &str) -> LoadResult<Option<Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.load(namespace)
    }
}

fn config_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("example.yaml"),
        "key1: value1\nkey2:\n  key2_key1: value1\nkey3:\n  key3_key1:\n    key3_key1_key1: value1\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("database.json"),
        r#"{"connections": {"default": {"host": "db.internal", "port": 5432}}, "replica.eu": {"host": "eu.internal"}}"#,
    )
    .unwrap();
    dir
}

#[test]
fn auto_loading_from_files() {
    let dir = config_dir();
    let files = Counted::new(FileLoader::new(dir.path().to_str().unwrap()));
    let store = ConfigStore::new(vec![files.clone()]);

    let example = store.get("example").unwrap().unwrap();
    assert_eq!(example.child("key1"), Some(&Value::from("value1")));
    assert_eq!(
        store.get("example.key3.key3_key1.key3_key1_key1").unwrap(),
        Some(Value::from("value1"))
    );
    assert_eq!(
        store.get("database.connections.default.port").unwrap(),
        Some(Value::from(5432u64))
    );
    assert_eq!(
        store.get("database#replica.eu").unwrap().unwrap().child("host"),
        Some(&Value::from("eu.internal"))
    );
    assert_eq!(files.calls(), 2);
}

#[test]
fn files_fall_back_to_defaults() {
    let dir = config_dir();
    let files = Counted::new(FileLoader::new(dir.path().to_str().unwrap()));
    let defaults = Counted::new(
        MemoryLoader::new("defaults")
            .with_namespace("example", "shadowed")
            .with_namespace("cache", Value::from_iter([("ttl".to_string(), Value::from(60u64))])),
    );
    let store = ConfigStore::new(vec![files.clone(), defaults.clone()]);

    assert_eq!(store.get("cache.ttl").unwrap(), Some(Value::from(60u64)));
    assert_eq!(files.calls(), 1);
    assert_eq!(defaults.calls(), 1);

    assert_eq!(store.get("example.key1").unwrap(), Some(Value::from("value1")));
    assert_eq!(defaults.calls(), 1);
}

#[test]
fn missing_everywhere_is_none_then_error_when_strict() {
    let dir = config_dir();
    let store = ConfigStore::default()
        .with_loader(Arc::new(FileLoader::new(dir.path().to_str().unwrap())));

    assert_eq!(store.get("missing.key").unwrap(), None);
    assert!(!store.has("missing.key"));
    assert!(!store.all().contains_key("missing"));

    store.set_throw_if_not_found(true);
    assert!(store.get("missing.key").unwrap_err().is_not_found());
    assert!(store.get("example.missing").unwrap_err().is_not_found());
}

#[test]
fn chain_built_from_registry() {
    let dir = config_dir();
    let registry = default_registry();
    let chain = registry
        .create_chain([
            (
                "file",
                LoaderConfig::new().with("path", dir.path().to_str().unwrap()),
            ),
            (
                "memory",
                LoaderConfig::new()
                    .with("namespaces", serde_json::json!({"app": {"name": "strata"}})),
            ),
        ])
        .unwrap();
    let store = ConfigStore::new(chain);

    assert_eq!(store.loader_names(), ["file", "memory"]);
    assert_eq!(store.get("app.name").unwrap(), Some(Value::from("strata")));
    assert_eq!(store.get("example.key2.key2_key1").unwrap(), Some(Value::from("value1")));
}

#[test]
fn snapshot_round_trip_through_set_items() {
    let dir = config_dir();
    let store = ConfigStore::new(vec![Arc::new(FileLoader::new(dir.path().to_str().unwrap()))]);
    store.get("example").unwrap();
    store.get("database").unwrap();

    let snapshot = serde_json::to_string(&store.all()).unwrap();

    let files = Counted::new(FileLoader::new(dir.path().to_str().unwrap()));
    let restored = ConfigStore::new(vec![files.clone()]);
    restored.set_items(serde_json::from_str(&snapshot).unwrap());

    assert_eq!(
        restored.get("database.connections.default.host").unwrap(),
        Some(Value::from("db.internal"))
    );
    assert_eq!(files.calls(), 0);
}
