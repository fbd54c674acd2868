//! TOML catalog definitions.
//!
//! An external definition file lists intrinsics as `[[intrinsic]]` tables:
//!
//! ```toml
//! version = "1"
//!
//! [[intrinsic]]
//! name = "vorn_s64"
//! family = "bitwise"
//! result = "int64x1_t"
//! operands = ["int64x1_t", "int64x1_t"]
//! ```
//!
//! Each entry is decoded and its type spellings parsed on its own, so one bad
//! entry (a missing key, a misspelled key, a value of the wrong type, an
//! unknown type) is rejected alone and the rest of the file still loads.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::CatalogError;
use crate::model::{Catalog, CatalogLoad, IntrinsicSpec};
use crate::types::TypeTag;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DefinitionFile {
    #[serde(default = "default_version")]
    version: String,
    #[serde(default, rename = "intrinsic")]
    intrinsics: Vec<toml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Definition {
    name: String,
    #[serde(default = "default_family")]
    family: String,
    result: String,
    #[serde(default)]
    operands: Vec<String>,
    /// Defaults to the operand count; stated explicitly it is cross-checked.
    arity: Option<usize>,
    #[serde(default)]
    scan_assembler: Vec<String>,
}

fn default_version() -> String {
    "unversioned".to_string()
}

fn default_family() -> String {
    "external".to_string()
}

impl Definition {
    /// Decodes the `index`th `[[intrinsic]]` table.
    fn decode(index: usize, value: toml::Value) -> Result<Self, CatalogError> {
        let name = value
            .get("name")
            .and_then(toml::Value::as_str)
            .map_or_else(|| format!("intrinsic #{}", index + 1), str::to_string);
        value
            .try_into::<Definition>()
            .map_err(|e| CatalogError::invalid(&name, e.message()))
    }

    fn into_spec(self) -> Result<IntrinsicSpec, CatalogError> {
        let name = self.name;
        let parse = |s: &str| {
            s.parse::<TypeTag>()
                .map_err(|e| CatalogError::invalid(&name, e.to_string()))
        };
        let result_type = parse(&self.result)?;
        let operand_types = self
            .operands
            .iter()
            .map(|s| parse(s))
            .collect::<Result<Vec<_>, _>>()?;
        let arity = self.arity.unwrap_or(operand_types.len());
        Ok(IntrinsicSpec {
            name,
            family: self.family,
            result_type,
            operand_types,
            arity,
            scan_assembler: self.scan_assembler,
        })
    }
}

impl Catalog {
    /// Parses TOML definitions.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] if the text is not TOML or its top level
    /// is not a definition file, and [`CatalogError::Empty`] if no entry
    /// survives validation. Individual bad entries are not errors; they are
    /// listed in [`CatalogLoad::rejected`].
    pub fn from_toml_str(text: &str) -> Result<CatalogLoad, CatalogError> {
        let file: DefinitionFile = toml::from_str(text)?;

        let mut rejected = Vec::new();
        let mut specs = Vec::with_capacity(file.intrinsics.len());
        for (index, value) in file.intrinsics.into_iter().enumerate() {
            match Definition::decode(index, value).and_then(Definition::into_spec) {
                Ok(spec) => specs.push(spec),
                Err(e) => rejected.push(e),
            }
        }

        let mut load = Catalog::from_specs(file.version, specs);
        rejected.append(&mut load.rejected);
        load.rejected = rejected;

        if load.catalog.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(load)
    }

    /// Reads and parses a TOML definition file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, otherwise as
    /// [`Catalog::from_toml_str`].
    pub fn load(path: &Path) -> Result<CatalogLoad, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_the_vorn_definition() {
        let load = Catalog::from_toml_str(
            r#"
            version = "7"
            [[intrinsic]]
            name = "vorn_s64"
            family = "bitwise"
            result = "int64x1_t"
            operands = ["int64x1_t", "int64x1_t"]
            "#,
        )
        .unwrap();
        assert!(load.rejected.is_empty());
        assert_eq!(load.catalog.version, "7");
        let spec = load.catalog.lookup("vorn_s64").unwrap();
        assert_eq!(spec.arity, 2);
        assert_eq!(spec.family, "bitwise");
    }

    #[test]
    fn bad_entries_are_rejected_individually() {
        let load = Catalog::from_toml_str(
            r#"
            [[intrinsic]]
            name = "vorn_s64"
            result = "int64x1_t"
            operands = ["int64x1_t", "int64x1_t"]

            [[intrinsic]]
            name = "vbogus_s64"
            result = "int64x3_t"
            operands = ["int64x1_t"]

            [[intrinsic]]
            name = "vnone_s8"
            result = "int8x8_t"

            [[intrinsic]]
            name = "vmiscount_s8"
            result = "int8x8_t"
            operands = ["int8x8_t"]
            arity = 2
            "#,
        )
        .unwrap();
        assert_eq!(load.catalog.len(), 1);
        assert_eq!(load.rejected.len(), 3);
        assert!(load
            .rejected
            .iter()
            .all(|e| matches!(e, CatalogError::InvalidSpec { .. })));
        assert_eq!(load.catalog.all()[0].family, "external");
    }

    #[test]
    fn undecodable_entries_are_rejected_individually() {
        let load = Catalog::from_toml_str(
            r#"
            [[intrinsic]]
            name = "vorn_s64"
            result = "int64x1_t"
            operands = ["int64x1_t", "int64x1_t"]

            [[intrinsic]]
            name = "vand_s64"
            operands = ["int64x1_t", "int64x1_t"]

            [[intrinsic]]
            name = "veor_s64"
            result = "int64x1_t"
            operand = ["int64x1_t", "int64x1_t"]

            [[intrinsic]]
            name = "vbic_s64"
            result = "int64x1_t"
            operands = "int64x1_t"

            [[intrinsic]]
            result = 7
            "#,
        )
        .unwrap();
        assert_eq!(load.catalog.len(), 1);
        assert!(load.catalog.lookup("vorn_s64").is_ok());

        let names: Vec<_> = load
            .rejected
            .iter()
            .map(|e| match e {
                CatalogError::InvalidSpec { name, .. } => name.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(names, ["vand_s64", "veor_s64", "vbic_s64", "intrinsic #5"]);
        assert!(load.rejected[0].to_string().contains("result"));
        assert!(load.rejected[1].to_string().contains("operand"));
    }

    #[test]
    fn unknown_top_level_keys_are_fatal() {
        let err = Catalog::from_toml_str("version = \"1\"\nintrinsics = []\n").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn no_survivors_is_fatal() {
        let err = Catalog::from_toml_str(
            r#"
            [[intrinsic]]
            name = "vnone_s8"
            result = "int8x8_t"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
        assert!(err.is_fatal());
    }

    #[test]
    fn malformed_toml_is_fatal() {
        let err = Catalog::from_toml_str("[[intrinsic]\nname =").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
