//! Loading catalog definitions from disk.

use std::fs;

use neon_catalog::{Catalog, CatalogError};

const DEFINITIONS: &str = r#"
version = "2016.04"

[[intrinsic]]
name = "vorn_s64"
family = "bitwise"
result = "int64x1_t"
operands = ["int64x1_t", "int64x1_t"]

[[intrinsic]]
name = "vshl_u8"
family = "shift"
result = "uint8x8_t"
operands = ["uint8x8_t", "int8x8_t"]

[[intrinsic]]
name = "vorr_s8"
family = "bitwise"
result = "int8x8_t"
operands = ["int8x8_t", "int8x8_t"]
scan_assembler = ["vorr[ \\t]+d[0-9]+, d[0-9]+, d[0-9]+"]
"#;

#[test]
fn load_reads_a_definition_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("neon.toml");
    fs::write(&path, DEFINITIONS).unwrap();

    let load = Catalog::load(&path).unwrap();
    assert!(load.rejected.is_empty());
    assert_eq!(load.catalog.version, "2016.04");

    let names: Vec<_> = load
        .catalog
        .all()
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(names, ["vorn_s64", "vorr_s8", "vshl_u8"]);

    let vorr = load.catalog.lookup("vorr_s8").unwrap();
    assert_eq!(vorr.scan_assembler, ["vorr[ \\t]+d[0-9]+, d[0-9]+, d[0-9]+"]);
}

#[test]
fn external_entries_match_the_builtin_signatures() {
    let load = Catalog::from_toml_str(DEFINITIONS).unwrap();
    for spec in load.catalog.all() {
        let builtin = Catalog::builtin().lookup(&spec.name).unwrap();
        assert_eq!(builtin.result_type, spec.result_type, "{}", spec.name);
        assert_eq!(builtin.operand_types, spec.operand_types, "{}", spec.name);
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Catalog::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, CatalogError::Io { .. }));
    assert!(err.is_fatal());
}

#[test]
fn unknown_fields_reject_only_their_entry() {
    let load = Catalog::from_toml_str(
        r#"
        [[intrinsic]]
        name = "vorn_s64"
        result = "int64x1_t"
        operands = ["int64x1_t", "int64x1_t"]
        returns = "int64x1_t"

        [[intrinsic]]
        name = "vorr_s8"
        result = "int8x8_t"
        operands = ["int8x8_t", "int8x8_t"]
        "#,
    )
    .unwrap();
    assert_eq!(load.rejected.len(), 1);
    assert!(
        matches!(&load.rejected[0], CatalogError::InvalidSpec { name, reason } if name == "vorn_s64" && reason.contains("returns")),
        "{:?}",
        load.rejected
    );
    assert!(!load.rejected[0].is_fatal());
    let names: Vec<_> = load.catalog.all().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["vorr_s8"]);
}
