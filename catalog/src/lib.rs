//! NEON intrinsic catalog encoded as typed Rust data.
//!
//! The `neon-catalog` crate provides every intrinsic the test generator
//! knows about (signature, family and the assembly patterns its test
//! asserts) as Rust data, along with a loader for external TOML definition
//! files and a JSON exporter.
//!
//! # Entry Point
//!
//! ```
//! let catalog = neon_catalog::Catalog::builtin();
//! let vorn = catalog.lookup("vorn_s64").unwrap();
//! assert_eq!(vorn.arity, 2);
//! assert_eq!(vorn.test_stem(), "vorns64");
//! ```
//!
//! # Serialization
//!
//! ```
//! let catalog = neon_catalog::Catalog::builtin();
//! let json = neon_catalog::serializer::json::to_json(catalog);
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod error;
pub mod families;
pub mod loader;
pub mod model;
#[cfg(feature = "serializers")]
pub mod serializer;
pub mod types;

pub use error::CatalogError;
pub use model::{Catalog, CatalogLoad, IntrinsicSpec};
pub use types::{ElementKind, Register, TypeTag};

/// Version of the built-in definitions. Bump when an entry changes.
pub const BUILTIN_VERSION: &str = "2016.04-neon";

impl Catalog {
    /// Returns the built-in catalog.
    ///
    /// Built once per process and shared read-only afterwards. Assembly order
    /// is `bitwise → arith → compare → shift → dup`; the resulting catalog is
    /// sorted by name regardless.
    #[must_use]
    pub fn builtin() -> &'static Catalog {
        static CATALOG: std::sync::OnceLock<Catalog> = std::sync::OnceLock::new();
        CATALOG.get_or_init(|| {
            let specs = [
                families::bitwise::family(),
                families::arith::family(),
                families::compare::family(),
                families::shift::family(),
                families::dup::family(),
            ]
            .into_iter()
            .flat_map(|f| f.intrinsics)
            .collect();
            Catalog::from_specs(BUILTIN_VERSION, specs).catalog
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin_specs() -> Vec<IntrinsicSpec> {
        [
            families::bitwise::family(),
            families::arith::family(),
            families::compare::family(),
            families::shift::family(),
            families::dup::family(),
        ]
        .into_iter()
        .flat_map(|f| f.intrinsics)
        .collect()
    }

    #[test]
    fn builtin_definitions_are_all_valid() {
        let load = Catalog::from_specs(BUILTIN_VERSION, builtin_specs());
        assert!(load.rejected.is_empty(), "{:#?}", load.rejected);
    }

    #[test]
    fn intrinsic_count() {
        // bitwise 116, arith 52, compare 44, shift 16, dup 22.
        assert_eq!(Catalog::builtin().len(), 250);
    }

    #[test]
    fn family_counts() {
        let families = Catalog::builtin().families();
        assert_eq!(families.get("bitwise"), Some(&116));
        assert_eq!(families.get("arith"), Some(&52));
        assert_eq!(families.get("compare"), Some(&44));
        assert_eq!(families.get("shift"), Some(&16));
        assert_eq!(families.get("dup"), Some(&22));
    }

    #[test]
    fn all_is_sorted_by_name() {
        let names: Vec<_> = Catalog::builtin()
            .all()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn all_test_stems_unique() {
        let mut stems = std::collections::HashSet::new();
        for spec in Catalog::builtin().all() {
            assert!(
                stems.insert(spec.test_stem()),
                "Duplicate stem: {}",
                spec.test_stem()
            );
        }
    }

    #[test]
    fn vorn_s64_signature() {
        let spec = Catalog::builtin().lookup("vorn_s64").unwrap();
        let int64x1: TypeTag = "int64x1_t".parse().unwrap();
        assert_eq!(spec.result_type, int64x1);
        assert_eq!(spec.operand_types, vec![int64x1, int64x1]);
        assert_eq!(spec.arity, 2);
    }

    #[test]
    fn every_arity_matches_operands() {
        for spec in Catalog::builtin().all() {
            assert_eq!(spec.arity, spec.operand_types.len(), "{}", spec.name);
        }
    }
}
