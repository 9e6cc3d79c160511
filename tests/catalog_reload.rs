//! Catalog snapshots: content hashing and swap semantics under reload.

use std::sync::Arc;

use chartspec::{CatalogSnapshot, CatalogStore, ChartCompiler};

const BUILTIN_YAML: &str = include_str!("../config/catalog.yaml");

const NARROW_CATALOG: &str = r#"
version: "narrow-1"
sources:
  - name: web_traffic
    keywords: [web, site]
    metrics:
      - name: sessions
        aliases: [visits, revenue]
      - name: bounce_rate
        aggregation: avg
    dimensions:
      - name: page
      - name: visit_date
        kind: temporal
"#;

#[test]
fn test_equivalent_snapshot_compiles_identically() {
    let original = CatalogSnapshot::builtin().unwrap();
    let reformatted =
        CatalogSnapshot::from_yaml_str(&format!("# reloaded copy\n\n{BUILTIN_YAML}\n")).unwrap();

    assert_eq!(original.hash, reformatted.hash);
    assert!(original.same_content(&reformatted));

    let compiler = ChartCompiler::default();
    for prompt in [
        "top 5 regions by revenue",
        "revenue trend since 2021",
        "ctr versus cvr by campaign",
    ] {
        let a = serde_json::to_string(&compiler.compile(prompt, &original).unwrap()).unwrap();
        let b = serde_json::to_string(&compiler.compile(prompt, &reformatted).unwrap()).unwrap();
        assert_eq!(a, b, "{prompt}");
    }
}

#[test]
fn test_held_snapshot_survives_publish() {
    let store = CatalogStore::new(CatalogSnapshot::builtin().unwrap());
    let held = store.snapshot();
    let before_hash = held.hash.clone();

    let previous = store.publish(CatalogSnapshot::from_yaml_str(NARROW_CATALOG).unwrap());
    assert!(Arc::ptr_eq(&held, &previous));
    assert_ne!(store.current_hash(), before_hash);

    let compiler = ChartCompiler::default();
    let old = compiler.compile("top 5 regions by revenue", &held).unwrap();
    assert_eq!(old.data_source, "geographic_data");
    assert_eq!(old.catalog_version, before_hash);

    let new = compiler
        .compile("top 5 regions by revenue", &store.snapshot())
        .unwrap();
    assert_eq!(new.data_source, "web_traffic");
    assert_eq!(new.metrics, vec!["sessions"]);
    assert_eq!(new.catalog_version, store.current_hash());
}

#[test]
fn test_failed_reload_keeps_current_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("catalog.yaml");
    let bad = dir.path().join("broken.yaml");
    std::fs::write(&good, NARROW_CATALOG).unwrap();
    std::fs::write(&bad, "sources: [ {name: ").unwrap();

    let store = CatalogStore::new(CatalogSnapshot::builtin().unwrap());
    let reloaded = store.reload_from(&good).unwrap();
    assert_eq!(reloaded.version, "narrow-1");

    assert!(store.reload_from(&bad).is_err());
    assert!(store.reload_from(&dir.path().join("missing.yaml")).is_err());
    assert_eq!(store.snapshot().version, "narrow-1");
}
