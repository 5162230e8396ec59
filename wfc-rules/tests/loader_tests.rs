use std::io::Write;
use wfc_rules::loader::{load_from_file, parser_for_extension};
use wfc_rules::{Color, LoadError, TileId};

// Helper function to create the full path to test data
fn test_data_path(filename: &str) -> std::path::PathBuf {
    let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("rules_data");
    path.push(filename);
    path
}

#[test]
fn test_load_valid_simple() {
    let path = test_data_path("valid_simple.ron");
    let catalog = load_from_file(&path).expect("valid_simple.ron should load");

    assert_eq!(catalog.num_tiles(), 2);
    let a = catalog.find_by_name("A").expect("tile A");
    let b = catalog.find_by_name("B").expect("tile B");
    assert_eq!(a.id, TileId(0));
    assert_eq!(b.id, TileId(1));
    assert_eq!(a.weight, 1);
    assert_eq!(b.weight, 2);
    assert_eq!(a.color, Color::new(10, 20, 30));

    // A accepts both, B only accepts A.
    assert!(catalog.accepts(a.id, a.id));
    assert!(catalog.accepts(a.id, b.id));
    assert!(catalog.accepts(b.id, a.id));
    assert!(!catalog.accepts(b.id, b.id));
}

#[test]
fn test_load_invalid_dup_name() {
    let result = load_from_file(&test_data_path("invalid_dup_name.ron"));
    match result {
        Err(LoadError::InvalidData(msg)) => assert!(msg.contains("Duplicate tile name: A")),
        other => panic!("Expected InvalidData error for duplicate name, got {other:?}"),
    }
}

#[test]
fn test_load_invalid_unknown_neighbor() {
    let result = load_from_file(&test_data_path("invalid_unknown_neighbor.ron"));
    match result {
        Err(LoadError::InvalidData(msg)) => assert!(msg.contains("unknown neighbor 'C'")),
        other => panic!("Expected InvalidData error for unknown neighbor, got {other:?}"),
    }
}

#[test]
fn test_load_invalid_weight() {
    let result = load_from_file(&test_data_path("invalid_weight.ron"));
    match result {
        Err(LoadError::InvalidData(msg)) => assert!(msg.contains("must be positive")),
        other => panic!("Expected InvalidData error for zero weight, got {other:?}"),
    }
}

#[test]
fn test_load_missing_file() {
    let result = load_from_file(&test_data_path("does_not_exist.ron"));
    assert!(matches!(result, Err(LoadError::Io(_))));
}

#[test]
fn test_load_unsupported_extension() {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("temp file");
    writeln!(file, "tiles: []").expect("write");
    let result = load_from_file(file.path());
    assert!(matches!(result, Err(LoadError::UnsupportedFormat(_))));
}

#[test]
fn test_extension_lookup_is_case_insensitive() {
    assert!(parser_for_extension("RON").is_some());
    assert!(parser_for_extension("json").is_none());
}

#[test]
fn test_load_from_temp_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".ron")
        .tempfile()
        .expect("temp file");
    write!(
        file,
        r#"(tiles: [(name: "solo", weight: 4, neighbors: [])])"#
    )
    .expect("write");
    let catalog = load_from_file(file.path()).expect("temp rule file should load");
    let solo = catalog.rule_for(TileId(0)).expect("solo tile");
    assert_eq!(solo.weight, 4);
    assert!(solo.allowed_neighbors.is_empty());
}
