//! Helpers shared by the `neon-testgen` and `neon-check` binaries.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::borrow::Cow;
use std::path::Path;

use anyhow::{bail, Context, Result};
use neon_catalog::{Catalog, IntrinsicSpec};
use neon_codegen::case::SAVE_TEMPS;
use tracing::warn;

/// A catalog ready for emission, with the entries its source rejected.
#[derive(Debug)]
pub struct LoadedCatalog {
    /// Built-in or loaded catalog.
    pub catalog: Cow<'static, Catalog>,
    /// One message per rejected definition.
    pub rejected: Vec<String>,
}

/// The built-in catalog, or the definitions in `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if no entry in
/// it is valid. Individually invalid entries are only reported.
pub fn load_catalog(path: Option<&Path>) -> Result<LoadedCatalog> {
    let Some(path) = path else {
        return Ok(LoadedCatalog {
            catalog: Cow::Borrowed(Catalog::builtin()),
            rejected: Vec::new(),
        });
    };
    let load = Catalog::load(path)
        .with_context(|| format!("Failed to load catalog {}", path.display()))?;
    let rejected: Vec<String> = load.rejected.iter().map(ToString::to_string).collect();
    for reason in &rejected {
        warn!(catalog = %path.display(), %reason, "definition rejected");
    }
    Ok(LoadedCatalog {
        catalog: Cow::Owned(load.catalog),
        rejected,
    })
}

/// Every entry, or only those of `family`.
///
/// # Errors
///
/// Returns an error if `family` names no entry.
pub fn select<'a>(catalog: &'a Catalog, family: Option<&str>) -> Result<Vec<&'a IntrinsicSpec>> {
    let Some(family) = family else {
        return Ok(catalog.all().iter().collect());
    };
    let specs: Vec<_> = catalog.all().iter().filter(|s| s.family == family).collect();
    if specs.is_empty() {
        let known: Vec<_> = catalog.families().into_keys().collect();
        bail!("no intrinsics in family `{family}` (known: {})", known.join(", "));
    }
    Ok(specs)
}

/// Build options from the command line, or `-save-temps -O2` when none
/// were given.
pub fn build_options(given: &[String]) -> Vec<String> {
    if given.is_empty() {
        vec![SAVE_TEMPS.to_string(), "-O2".to_string()]
    } else {
        given.to_vec()
    }
}
