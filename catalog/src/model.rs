//! Core catalog model types.
//!
//! An [`IntrinsicSpec`] describes one intrinsic's C signature; a [`Catalog`]
//! is an immutable, name-sorted set of them. The process-wide built-in
//! catalog is [`Catalog::builtin()`](crate::Catalog::builtin).

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::types::{Register, TypeTag};

/// Signature of one intrinsic under test.
///
/// `arity` is redundant with `operand_types.len()`; [`IntrinsicSpec::validate`]
/// checks the two agree so that hand-written definitions cannot drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrinsicSpec {
    /// The C function name (e.g. `"vorn_s64"`).
    pub name: String,
    /// Catalog family this entry was defined in (e.g. `"bitwise"`).
    pub family: String,
    /// Return type.
    pub result_type: TypeTag,
    /// Parameter types, in call order.
    pub operand_types: Vec<TypeTag>,
    /// Number of parameters.
    pub arity: usize,
    /// Regular expressions the generated assembly must match.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scan_assembler: Vec<String>,
}

impl IntrinsicSpec {
    /// Creates a spec whose arity is taken from the operand list.
    pub fn new(
        name: impl Into<String>,
        family: impl Into<String>,
        result_type: TypeTag,
        operand_types: Vec<TypeTag>,
    ) -> Self {
        Self {
            name: name.into(),
            family: family.into(),
            result_type,
            arity: operand_types.len(),
            operand_types,
            scan_assembler: Vec::new(),
        }
    }

    /// Adds a scan-assembler pattern.
    #[must_use]
    pub fn scanning(mut self, pattern: impl Into<String>) -> Self {
        self.scan_assembler.push(pattern.into());
        self
    }

    /// The test stem: the name with the quad marker capitalized and the
    /// underscore before the element type dropped (`vorn_s64` → `vorns64`,
    /// `vornq_s64` → `vornQs64`). Inner underscores stay, so `vdupq_n_u8`
    /// becomes `vdupQ_nu8`.
    ///
    /// It names both the generated file and its test function.
    #[must_use]
    pub fn test_stem(&self) -> String {
        let quad = self.result_type.register() == Some(Register::Q)
            || self
                .operand_types
                .iter()
                .any(|t| t.register() == Some(Register::Q));
        let (head, tail) = match self.name.split_once('_') {
            Some((head, tail)) => (head, tail),
            None => (self.name.as_str(), ""),
        };
        let head = match head.strip_suffix('q') {
            Some(base) if quad => format!("{base}Q"),
            _ => head.to_string(),
        };
        let mut stem = head;
        match tail.rsplit_once('_') {
            Some((middle, suffix)) => {
                stem.push('_');
                stem.push_str(middle);
                stem.push_str(suffix);
            }
            None => stem.push_str(tail),
        }
        stem
    }

    /// Checks the spec's invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidSpec`] if the name is not a C identifier,
    /// the arity is zero, or the arity disagrees with the operand list.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let is_ident = self
            .name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !is_ident {
            return Err(CatalogError::invalid(
                &self.name,
                "name is not a C identifier",
            ));
        }
        if self.arity == 0 {
            return Err(CatalogError::invalid(&self.name, "arity is zero"));
        }
        if self.arity != self.operand_types.len() {
            return Err(CatalogError::invalid(
                &self.name,
                format!(
                    "arity {} does not match {} operand type(s)",
                    self.arity,
                    self.operand_types.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Result of assembling a catalog from untrusted definitions.
#[derive(Debug)]
pub struct CatalogLoad {
    /// The entries that passed validation.
    pub catalog: Catalog,
    /// One [`CatalogError::InvalidSpec`] per rejected entry, in input order.
    pub rejected: Vec<CatalogError>,
}

/// An immutable set of intrinsic specs, sorted by name.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Version of the definition source.
    pub version: String,
    entries: Vec<IntrinsicSpec>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog, rejecting invalid and duplicate entries individually.
    ///
    /// The first entry with a given name (or test stem) wins; later ones are
    /// reported in [`CatalogLoad::rejected`].
    pub fn from_specs(version: impl Into<String>, specs: Vec<IntrinsicSpec>) -> CatalogLoad {
        let mut rejected = Vec::new();
        let mut names = HashSet::new();
        let mut stems = HashSet::new();
        let mut entries = Vec::with_capacity(specs.len());

        for spec in specs {
            if let Err(e) = spec.validate() {
                rejected.push(e);
                continue;
            }
            if !names.insert(spec.name.clone()) {
                rejected.push(CatalogError::invalid(&spec.name, "duplicate name"));
                continue;
            }
            let stem = spec.test_stem();
            if !stems.insert(stem.clone()) {
                names.remove(&spec.name);
                rejected.push(CatalogError::invalid(
                    &spec.name,
                    format!("test stem `{stem}` collides with another entry"),
                ));
                continue;
            }
            entries.push(spec);
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.name.clone(), i))
            .collect();

        CatalogLoad {
            catalog: Catalog {
                version: version.into(),
                entries,
                index,
            },
            rejected,
        }
    }

    /// Looks up an intrinsic by its C name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no entry has this name.
    pub fn lookup(&self, name: &str) -> Result<&IntrinsicSpec, CatalogError> {
        self.index
            .get(name)
            .and_then(|&i| self.entries.get(i))
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    /// Every entry, sorted by name.
    #[must_use]
    pub fn all(&self) -> &[IntrinsicSpec] {
        &self.entries
    }

    /// Entries of one family, sorted by name.
    pub fn family<'a>(&'a self, family: &'a str) -> impl Iterator<Item = &'a IntrinsicSpec> + 'a {
        self.entries.iter().filter(move |s| s.family == family)
    }

    /// Family names with their entry counts, sorted by family name.
    #[must_use]
    pub fn families(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for spec in &self.entries {
            *counts.entry(spec.family.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
