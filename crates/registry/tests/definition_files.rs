use std::fs;

use indexmap::IndexMap;
use yamlrest_registry::{ApiRegistry, RegistryError};

fn load_fixture() -> ApiRegistry {
    ApiRegistry::load_file(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/apis_fixture.yaml"))
        .expect("load registry from fixture")
}

#[test]
fn loads_keyed_definitions_from_disk() {
    let registry = load_fixture();
    let names: Vec<_> = registry.names().collect();
    assert!(names.contains(&"snapshot.create"), "expected snapshot.create, got {:?}", names);
    assert!(names.contains(&"cat.indices"), "expected cat.indices, got {:?}", names);
}

#[test]
fn routes_fixture_endpoints() {
    let registry = load_fixture();
    let mut params = IndexMap::new();
    params.insert("repository".to_string(), "backups".to_string());
    params.insert("snapshot".to_string(), "nightly 1".to_string());
    params.insert("wait_for_completion".to_string(), "true".to_string());

    let route = registry.route("snapshot.create", &params, true).expect("route snapshot.create");
    assert_eq!(route.method, "PUT");
    assert_eq!(route.path, "/_snapshot/backups/nightly%201");
    assert_eq!(route.query.len(), 1);
}

#[test]
fn later_files_override_earlier_definitions() {
    let dir = tempfile::tempdir().unwrap();
    let override_path = dir.path().join("override.json");
    fs::write(&override_path, r#"{"cat.indices": {"methods": ["GET"], "paths": ["/_cat/indices/{index}"]}}"#).unwrap();

    let mut registry = load_fixture();
    registry.extend_from_files(&[override_path]).expect("merge override");

    let endpoint = registry.find("cat.indices").expect("cat.indices present");
    assert_eq!(endpoint.paths, vec!["/_cat/indices/{index}".to_string()]);
}

#[test]
fn missing_file_reports_path() {
    let error = ApiRegistry::load_file("/definitely/not/here.yaml").unwrap_err();
    assert!(matches!(error, RegistryError::Io { .. }));
    assert!(error.to_string().contains("/definitely/not/here.yaml"));
}
