//! NEON test emitter.
//!
//! Reads intrinsic signatures from a `neon_catalog::Catalog` and produces one
//! DejaGnu-style C test per intrinsic: directives gating the test on an
//! effective target, one global per operand and result, and a function that
//! calls the intrinsic exactly once. The generated tree is what the
//! `neon-harness` runner builds.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod case;
pub mod emit;
pub mod mapping;

use std::path::Path;

use anyhow::Result;
use neon_catalog::{Catalog, IntrinsicSpec};
use tracing::{debug, warn};

pub use case::{emit, emit_with, EmitError, EmitOptions, GeneratedTestCase, TestAction};

/// Cases emitted from a catalog, plus the entries that could not be emitted.
#[derive(Debug, Default)]
pub struct EmitBatch {
    /// Emitted cases, in catalog order.
    pub cases: Vec<GeneratedTestCase>,
    /// Intrinsic name and error for every entry that failed to emit.
    pub rejected: Vec<(String, EmitError)>,
}

/// Emits a case for every spec yielded by `specs`.
///
/// Failures are collected, never fatal: one malformed entry does not stop the
/// rest of the batch.
pub fn emit_all<'a>(
    specs: impl IntoIterator<Item = &'a IntrinsicSpec>,
    options: &EmitOptions,
) -> EmitBatch {
    let mut batch = EmitBatch::default();
    for spec in specs {
        match emit_with(spec, options) {
            Ok(case) => batch.cases.push(case),
            Err(e) => {
                warn!(intrinsic = %spec.name, error = %e, "skipping intrinsic");
                batch.rejected.push((spec.name.clone(), e));
            }
        }
    }
    batch
}

/// Report of what was generated.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Number of test files written.
    pub file_count: usize,
    /// Files written, relative to the output directory.
    pub files: Vec<String>,
    /// Intrinsics that could not be emitted, with the reason.
    pub rejected: Vec<(String, String)>,
}

/// Generates one test file per catalog entry into `out_dir`.
///
/// # Errors
///
/// Returns an error if any file cannot be written.
pub fn generate(catalog: &Catalog, options: &EmitOptions, out_dir: &Path) -> Result<GenerationReport> {
    write_cases(&emit_all(catalog.all(), options), out_dir)
}

/// Writes already-emitted cases into `out_dir`.
///
/// # Errors
///
/// Returns an error if any file cannot be written.
pub fn write_cases(batch: &EmitBatch, out_dir: &Path) -> Result<GenerationReport> {
    let mut report = GenerationReport::default();

    for case in &batch.cases {
        let name = case.file_name();
        emit::write_file(&out_dir.join(&name), case.source_text())?;
        debug!(file = %name, "wrote test");
        report.files.push(name);
    }
    report.file_count = report.files.len();
    report.rejected = batch
        .rejected
        .iter()
        .map(|(name, e)| (name.clone(), e.to_string()))
        .collect();

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_emits_without_rejections() {
        let batch = emit_all(Catalog::builtin().all(), &EmitOptions::default());
        assert!(batch.rejected.is_empty());
        assert_eq!(batch.cases.len(), Catalog::builtin().len());
    }

    #[test]
    fn invalid_entries_do_not_stop_the_batch() {
        let good = Catalog::builtin().lookup("vorn_s64").unwrap().clone();
        let mut bad = good.clone();
        bad.name = "vbroken_s64".to_string();
        bad.arity = 0;
        let batch = emit_all([&bad, &good], &EmitOptions::default());
        assert_eq!(batch.cases.len(), 1);
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].0, "vbroken_s64");
    }
}
