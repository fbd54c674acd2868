//! JSON export of the intrinsic catalog.
//!
//! The document lists every entry in catalog order together with its test
//! stem, so external tools can map generated file names back to intrinsics
//! without re-implementing the naming rules.

use serde_json::{json, Value};

use crate::model::Catalog;

/// Serializes the catalog to a JSON `Value`.
///
/// The returned value can be pretty-printed with [`serde_json::to_string_pretty`].
#[must_use]
pub fn to_json(catalog: &Catalog) -> Value {
    let intrinsics: Vec<Value> = catalog
        .all()
        .iter()
        .map(|spec| {
            json!({
                "name": spec.name,
                "stem": spec.test_stem(),
                "family": spec.family,
                "result": spec.result_type,
                "operands": spec.operand_types,
                "arity": spec.arity,
                "scan_assembler": spec.scan_assembler,
            })
        })
        .collect();

    json!({
        "version": catalog.version,
        "count": catalog.len(),
        "families": catalog.families(),
        "intrinsics": intrinsics,
    })
}
