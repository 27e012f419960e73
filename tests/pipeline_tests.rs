//! End-to-end build tests
//!
//! Each test lays out a small content tree in a temp dir, runs the full
//! pipeline and inspects what landed in `dist/`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};

use storage_catalog::{build, BuildReport, CatalogConfig, CatalogError, SchemaRegistry};

struct Catalog {
    _dir: TempDir,
    config: CatalogConfig,
}

impl Catalog {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let config = CatalogConfig::default().rooted_at(dir.path());
        Self { _dir: dir, config }
    }

    fn add(&self, relative: &str, doc: Value) -> &Self {
        self.add_raw(relative, &serde_json::to_string_pretty(&doc).unwrap())
    }

    fn add_raw(&self, relative: &str, content: &str) -> &Self {
        let path = self.config.paths.content_root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }

    fn build_at(&self, at: DateTime<Utc>) -> Result<BuildReport, CatalogError> {
        let registry = SchemaRegistry::from_dir(schema_dir()).unwrap();
        build(&self.config, &registry, at)
    }

    fn build(&self) -> Result<BuildReport, CatalogError> {
        self.build_at(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    }

    fn dist(&self) -> PathBuf {
        self.config.paths.dist_dir.clone()
    }

    fn read(&self, relative: &str) -> Value {
        read_json(&self.dist().join(relative))
    }
}

fn schema_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("schema")
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn item(id: &str, name: &str) -> Value {
    json!({
        "$schema": "../../../schema/item.schema.json",
        "id": id,
        "type": "container",
        "name": name,
        "brand": "acme",
        "visibility": ["product"]
    })
}

fn find<'a>(items: &'a Value, id: &str) -> &'a Value {
    items
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["id"] == id)
        .unwrap_or_else(|| panic!("no item {}", id))
}

#[test]
fn test_reference_count_ignores_qty() {
    let catalog = Catalog::new();
    let mut a = item("a", "Kit");
    a["parts"] = json!([{"ref": "b", "qty": 3}]);
    catalog.add("acme/kits/a.json", a).add("acme/kits/b.json", item("b", "Bin"));

    let report = catalog.build().unwrap();
    assert_eq!(report.item_count, 2);
    assert!(report.is_clean(), "{:?}", report.source_issues);

    assert_eq!(catalog.read("items/b.json")["referenced_by_count"], 1);
    assert_eq!(catalog.read("items/a.json")["referenced_by_count"], 0);

    let database = catalog.read("database.json");
    assert_eq!(find(&database["items"], "b")["referenced_by_count"], 1);
}

#[test]
fn test_string_qty_keeps_every_part_edge() {
    let catalog = Catalog::new();
    let mut a = item("a", "Kit");
    a["parts"] = json!([{"ref": "b", "qty": "3"}, {"ref": "c", "qty": 1}]);
    catalog
        .add("acme/kits/a.json", a)
        .add("acme/kits/b.json", item("b", "Lid"))
        .add("acme/kits/c.json", item("c", "Bin"));

    let report = catalog.build().unwrap();
    assert_eq!(report.source_issues.len(), 1);
    assert_eq!(report.source_issues[0].id, "a");

    assert_eq!(catalog.read("items/b.json")["referenced_by_count"], 1);
    assert_eq!(catalog.read("items/c.json")["referenced_by_count"], 1);
    assert_eq!(
        catalog.read("items/a.json")["parts"],
        json!([{"ref": "b", "qty": "3"}, {"ref": "c", "qty": 1}])
    );
}

#[test]
fn test_float_qty_counts() {
    let catalog = Catalog::new();
    let mut a = item("a", "Kit");
    a["parts"] = json!([{"ref": "b", "qty": 2.0}]);
    catalog.add("acme/kits/a.json", a).add("acme/kits/b.json", item("b", "Bin"));

    let report = catalog.build().unwrap();
    assert!(report.source_issues.is_empty(), "{:?}", report.source_issues);
    assert_eq!(catalog.read("items/b.json")["referenced_by_count"], 1);
    assert_eq!(catalog.read("items/a.json")["parts"], json!([{"ref": "b", "qty": 2.0}]));
}

#[test]
fn test_partly_mistyped_size_passes_through() {
    let catalog = Catalog::new();
    let mut bin = item("acme_bins_odd", "Odd Bin");
    bin["inner_size"] = json!({"x": 101.6, "y": 50.8, "z": "25.4"});
    bin["origin"] = json!({"country": "DE", "factory": "Berlin"});
    catalog.add("acme/bins/odd.json", bin);

    let report = catalog.build().unwrap();
    assert_eq!(report.source_issues.len(), 1);

    let dist = catalog.read("items/acme_bins_odd.json");
    assert_eq!(dist["inner_size_mm"], json!({"x": 101.6, "y": 50.8, "z": "25.4"}));
    assert_eq!(dist["inner_size_in"], json!({"x": 4.0, "y": 2.0, "z": "25.4"}));
    assert_eq!(dist["origin"], json!({"country": "DE", "factory": "Berlin"}));
}

#[test]
fn test_integer_millimeters_are_kept() {
    let catalog = Catalog::new();
    let mut bin = item("acme_bins_round", "Round Bin");
    bin["inner_size"] = json!({"x": 100, "y": 254, "z": 50.8});
    catalog.add("acme/bins/round.json", bin);

    catalog.build().unwrap();
    let dist = catalog.read("items/acme_bins_round.json");
    assert_eq!(dist["inner_size_mm"], json!({"x": 100, "y": 254, "z": 50.8}));
    assert!(dist["inner_size_mm"]["x"].is_u64());
    assert_eq!(dist["inner_size_in"], json!({"x": 3.937, "y": 10.0, "z": 2.0}));
}

#[test]
fn test_inner_size_mirror() {
    let catalog = Catalog::new();
    let mut bin = item("acme_bins_small", "Small Bin");
    bin["inner_size"] = json!({"x": 101.6, "y": 50.8, "z": 25.4});
    catalog.add("acme/bins/small.json", bin);

    catalog.build().unwrap();
    let dist = catalog.read("items/acme_bins_small.json");
    assert_eq!(dist["inner_size_mm"], json!({"x": 101.6, "y": 50.8, "z": 25.4}));
    assert_eq!(dist["inner_size_in"], json!({"x": 4.0, "y": 2.0, "z": 1.0}));
    assert_eq!(dist["outer_size_mm"], Value::Null);
    assert_eq!(dist["outer_size_in"], Value::Null);
}

#[test]
fn test_loft_levels_mirror() {
    let catalog = Catalog::new();
    let mut bin = item("acme_bins_tapered", "Tapered Bin");
    bin["outer_size"] = json!({
        "shape": "loft",
        "levels": [
            {"z": 0, "polygon": [[0, 0], [80, 0], [80, 40]]},
            {"z": 76.2, "polygon": [[0, 0], [90, 0], [90, 50]]}
        ]
    });
    catalog.add("acme/bins/tapered.json", bin);

    let report = catalog.build().unwrap();
    assert!(report.is_clean(), "{:?}", report.source_issues);

    let dist = catalog.read("items/acme_bins_tapered.json");
    let levels = dist["outer_size_in"]["levels"].as_array().unwrap();
    assert_eq!(levels[0]["z"], 0.0);
    assert_eq!(levels[1]["z"], 3.0);
    assert_eq!(levels[1]["polygon"], json!([[0, 0], [90, 0], [90, 50]]));
}

#[test]
fn test_derived_id() {
    let catalog = Catalog::new();
    let mut bin = item("ignored", "Small Bin");
    bin.as_object_mut().unwrap().remove("id");
    catalog.add("acme/bins/small.json", bin);

    let report = catalog.build().unwrap();
    assert!(report.is_clean(), "{:?}", report.source_issues);

    let index = catalog.read("index.json");
    assert_eq!(index["items"][0]["id"], "acme_bins_small");
    assert_eq!(index["items"][0]["path"], "items/acme_bins_small.json");
    assert_eq!(catalog.read("items/acme_bins_small.json")["id"], "acme_bins_small");
}

#[test]
fn test_index_entries_match_item_files() {
    let catalog = Catalog::new();
    catalog
        .add("acme/bins/small.json", item("acme_bins_small", "Small"))
        .add("acme/bins/large.json", item("acme_bins_large", "Large"))
        .add("acme/trays/deep.json", item("acme_trays_deep", "Deep"))
        .add("acme/brand.json", json!({"id": "acme", "name": "Acme"}))
        .add("_examples/demo/bin.json", item("demo_bin", "Demo"));

    catalog.build().unwrap();

    let index = catalog.read("index.json");
    let entries = index["items"].as_array().unwrap();
    assert_eq!(entries.len(), 3);

    let files: Vec<_> = fs::read_dir(catalog.dist().join("items")).unwrap().collect();
    assert_eq!(files.len(), 3);

    for entry in entries {
        let path = catalog.dist().join(entry["path"].as_str().unwrap());
        assert_eq!(read_json(&path)["id"], entry["id"]);
    }

    let meta = catalog.read("meta.json");
    assert_eq!(meta["item_count"], 3);
    assert_eq!(meta["version"], "1.0.0");
    assert_eq!(meta["generated_at"], "2024-06-01T12:00:00.000Z");
}

#[test]
fn test_rebuild_is_idempotent() {
    let catalog = Catalog::new();
    let mut kit = item("acme_kits_starter", "Starter Kit");
    kit["parts"] = json!([{"ref": "acme_bins_small", "qty": 4}, {"ref": "acme_bins_ghost", "qty": 1}]);
    catalog
        .add("acme/kits/starter.json", kit)
        .add("acme/bins/small.json", item("acme_bins_small", "Small"));

    catalog.build_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()).unwrap();
    let mut first_index = catalog.read("index.json");
    let mut first_db = catalog.read("database.json");
    let first_meta = catalog.read("meta.json");

    let report = catalog.build_at(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()).unwrap();
    assert_eq!(report.ghosts.len(), 1);
    let mut second_index = catalog.read("index.json");
    let mut second_db = catalog.read("database.json");
    let second_meta = catalog.read("meta.json");

    assert_ne!(first_index["generated_at"], second_index["generated_at"]);
    for doc in [&mut first_index, &mut second_index, &mut first_db, &mut second_db] {
        doc.as_object_mut().unwrap().remove("generated_at");
    }
    assert_eq!(first_index, second_index);
    assert_eq!(first_db, second_db);
    assert_eq!(first_meta["content_hash"], second_meta["content_hash"]);
}

#[test]
fn test_invalid_item_is_still_published() {
    let catalog = Catalog::new();
    let mut odd = item("acme_bins_odd", "Odd Bin");
    odd["type"] = json!("spaceship");
    odd["visibility"] = json!(["everywhere"]);
    catalog
        .add("acme/bins/odd.json", odd)
        .add("acme/bins/small.json", item("acme_bins_small", "Small"));

    let report = catalog.build().unwrap();
    assert_eq!(report.source_issues.len(), 1);
    assert_eq!(report.source_issues[0].id, "acme_bins_odd");

    let index = catalog.read("index.json");
    let entry = find(&index["items"], "acme_bins_odd");
    assert_eq!(entry["type"], "spaceship");
    assert_eq!(entry["visibility"], json!(["everywhere"]));
    assert_eq!(catalog.read("database.json")["items"].as_array().unwrap().len(), 2);
}

#[test]
fn test_parse_error_writes_nothing() {
    let catalog = Catalog::new();
    catalog
        .add("acme/bins/small.json", item("acme_bins_small", "Small"))
        .add_raw("acme/bins/broken.json", r#"{"id": "acme_bins_broken", "#);

    let err = catalog.build().unwrap_err();
    assert!(matches!(err, CatalogError::Parse { .. }), "{:?}", err);
    assert!(!catalog.dist().exists());
}

#[test]
fn test_duplicate_id_writes_nothing() {
    let catalog = Catalog::new();
    catalog
        .add("acme/bins/small.json", item("acme_bins_small", "Small"))
        .add("acme/bins/copy.json", item("acme_bins_small", "Copy"));

    let err = catalog.build().unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateId { .. }), "{:?}", err);
    assert!(!catalog.dist().exists());
}

#[test]
fn test_removed_item_file_is_pruned() {
    let catalog = Catalog::new();
    catalog
        .add("acme/bins/small.json", item("acme_bins_small", "Small"))
        .add("acme/bins/large.json", item("acme_bins_large", "Large"));
    catalog.build().unwrap();
    assert!(catalog.dist().join("items/acme_bins_large.json").exists());

    fs::remove_file(catalog.config.paths.content_root.join("acme/bins/large.json")).unwrap();
    let report = catalog.build().unwrap();

    assert_eq!(report.written.pruned.len(), 1);
    assert!(!catalog.dist().join("items/acme_bins_large.json").exists());
    assert_eq!(catalog.read("meta.json")["item_count"], 1);
}
