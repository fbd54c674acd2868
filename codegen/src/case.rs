//! Generated test cases and the emitter that produces them.

use std::fmt;
use std::str::FromStr;

use neon_catalog::{CatalogError, IntrinsicSpec};
use thiserror::Error;

use crate::emit::CFile;
use crate::mapping::{
    add_options_group, is_plain_option, operand_global, result_global, tcl_quote, test_function,
};

/// Name written into every generated file's provenance line.
pub const GENERATOR: &str = "neon-testgen";

/// Header every generated test includes.
pub const INTRINSICS_HEADER: &str = "arm_neon.h";

/// Build option that asks for intermediate files to be kept.
pub const SAVE_TEMPS: &str = "-save-temps";

/// How far the toolchain must take a test (`dg-do`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestAction {
    /// Compile to assembly text only.
    Compile,
    /// Compile and assemble to an object file.
    #[default]
    Assemble,
}

impl TestAction {
    /// The `dg-do` argument.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TestAction::Compile => "compile",
            TestAction::Assemble => "assemble",
        }
    }

    /// The driver flag that stops the toolchain at this stage.
    #[must_use]
    pub fn driver_flag(self) -> &'static str {
        match self {
            TestAction::Compile => "-S",
            TestAction::Assemble => "-c",
        }
    }

    /// File extension of the toolchain's primary output.
    #[must_use]
    pub fn output_extension(self) -> &'static str {
        match self {
            TestAction::Compile => "s",
            TestAction::Assemble => "o",
        }
    }
}

impl fmt::Display for TestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compile" => Ok(TestAction::Compile),
            "assemble" => Ok(TestAction::Assemble),
            other => Err(format!("unknown test action `{other}` (expected compile or assemble)")),
        }
    }
}

/// Per-run emitter settings shared by every case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Effective-target requirement gating every case (`arm_neon_ok`).
    /// Empty means ungated.
    pub target_requirement: String,
    /// Options passed to the toolchain, in order (`-save-temps -O2`).
    pub build_options: Vec<String>,
    /// How far to take each test.
    pub action: TestAction,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            target_requirement: "arm_neon_ok".to_string(),
            build_options: vec![SAVE_TEMPS.to_string(), "-O2".to_string()],
            action: TestAction::Assemble,
        }
    }
}

/// Errors from [`emit`].
#[derive(Debug, Error)]
pub enum EmitError {
    /// The intrinsic spec breaks an invariant.
    #[error("invalid intrinsic `{name}`: {reason}")]
    InvalidSpec {
        /// Intrinsic name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A build option cannot be written into a `dg-options` string.
    #[error("build option `{0}` must be a single word without quotes or backslashes")]
    InvalidOption(String),

    /// The requirement is not a DejaGnu effective-target name.
    #[error("target requirement `{0}` is not an identifier")]
    InvalidRequirement(String),
}

impl From<CatalogError> for EmitError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::InvalidSpec { name, reason } => EmitError::InvalidSpec { name, reason },
            other => EmitError::InvalidSpec {
                name: String::new(),
                reason: other.to_string(),
            },
        }
    }
}

/// One generated test file and the parameters it was generated with.
///
/// Immutable once built: the runner reads it, nothing rewrites it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTestCase {
    intrinsic: IntrinsicSpec,
    target_requirement: String,
    build_options: Vec<String>,
    action: TestAction,
    source_text: String,
}

impl GeneratedTestCase {
    /// The intrinsic under test.
    #[must_use]
    pub fn intrinsic(&self) -> &IntrinsicSpec {
        &self.intrinsic
    }

    /// Effective-target requirement (`arm_neon_ok`), empty when ungated.
    #[must_use]
    pub fn target_requirement(&self) -> &str {
        &self.target_requirement
    }

    /// The `dg-add-options` group (`arm_neon`).
    #[must_use]
    pub fn add_options(&self) -> &str {
        add_options_group(&self.target_requirement)
    }

    /// Toolchain options in order.
    #[must_use]
    pub fn build_options(&self) -> &[String] {
        &self.build_options
    }

    /// How far the toolchain must take the test.
    #[must_use]
    pub fn action(&self) -> TestAction {
        self.action
    }

    /// The generated C source.
    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// File stem and test-function suffix (`vorns64`).
    #[must_use]
    pub fn stem(&self) -> String {
        self.intrinsic.test_stem()
    }

    /// Generated file name (`vorns64.c`).
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.c", self.stem())
    }

    /// Whether the case asked for its intermediate files to be kept.
    #[must_use]
    pub fn retains_intermediates(&self) -> bool {
        self.build_options.iter().any(|o| o == SAVE_TEMPS)
    }
}

fn is_requirement_name(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Generates the test case for one intrinsic.
///
/// Declares one global per operand plus one for the result, then a function
/// whose body assigns the intrinsic's result to the result global, passing
/// the operand globals in declared order. Output depends only on the inputs.
///
/// # Errors
///
/// Returns [`EmitError::InvalidSpec`] if the arity is zero or disagrees with
/// the operand list (every [`TypeTag`](neon_catalog::TypeTag) is a recognized
/// type by construction), [`EmitError::InvalidOption`] for options that
/// cannot be quoted, and [`EmitError::InvalidRequirement`] for a malformed
/// requirement name.
pub fn emit(
    spec: &IntrinsicSpec,
    target_requirement: &str,
    build_options: &[String],
    action: TestAction,
) -> Result<GeneratedTestCase, EmitError> {
    spec.validate()?;
    if !is_requirement_name(target_requirement) {
        return Err(EmitError::InvalidRequirement(target_requirement.to_string()));
    }
    if let Some(bad) = build_options.iter().find(|o| !is_plain_option(o)) {
        return Err(EmitError::InvalidOption(bad.clone()));
    }

    let stem = spec.test_stem();
    let mut f = CFile::new(&stem, GENERATOR);

    f.directive("do", action.as_str());
    if !target_requirement.is_empty() {
        f.directive("require-effective-target", target_requirement);
    }
    if !build_options.is_empty() {
        f.directive("options", &format!("\"{}\"", build_options.join(" ")));
    }
    if !target_requirement.is_empty() {
        f.directive("add-options", add_options_group(target_requirement));
    }
    f.blank();

    f.include(INTRINSICS_HEADER);
    f.blank();

    let out = result_global(spec.result_type);
    f.line(&format!("{} {out};", spec.result_type.c_name()));
    let args: Vec<String> = spec
        .operand_types
        .iter()
        .enumerate()
        .map(|(i, ty)| operand_global(i, *ty))
        .collect();
    for (ty, arg) in spec.operand_types.iter().zip(&args) {
        f.line(&format!("{} {arg};", ty.c_name()));
    }

    f.line(&format!("void {} (void)", test_function(&stem)));
    f.line("{");
    f.blank();
    f.line(&format!("  {out} = {} ({});", spec.name, args.join(", ")));
    f.line("}");

    if !spec.scan_assembler.is_empty() {
        f.blank();
        for pattern in &spec.scan_assembler {
            f.directive("final", &format!("{{ scan-assembler \"{}\" }}", tcl_quote(pattern)));
        }
    }

    Ok(GeneratedTestCase {
        intrinsic: spec.clone(),
        target_requirement: target_requirement.to_string(),
        build_options: build_options.to_vec(),
        action,
        source_text: f.finish(),
    })
}

/// [`emit`] with the settings bundled in `options`.
///
/// # Errors
///
/// As [`emit`].
pub fn emit_with(
    spec: &IntrinsicSpec,
    options: &EmitOptions,
) -> Result<GeneratedTestCase, EmitError> {
    emit(
        spec,
        &options.target_requirement,
        &options.build_options,
        options.action,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use neon_catalog::TypeTag;

    fn tag(s: &str) -> TypeTag {
        s.parse().unwrap()
    }

    #[test]
    fn zero_arity_is_rejected() {
        let spec = IntrinsicSpec::new("vnothing_s8", "misc", tag("int8x8_t"), vec![]);
        let err = emit_with(&spec, &EmitOptions::default()).unwrap_err();
        assert!(matches!(err, EmitError::InvalidSpec { .. }));
    }

    #[test]
    fn inconsistent_arity_is_rejected() {
        let mut spec = IntrinsicSpec::new(
            "vorn_s8",
            "bitwise",
            tag("int8x8_t"),
            vec![tag("int8x8_t"), tag("int8x8_t")],
        );
        spec.arity = 1;
        assert!(matches!(
            emit_with(&spec, &EmitOptions::default()),
            Err(EmitError::InvalidSpec { .. })
        ));
    }

    #[test]
    fn options_with_spaces_are_rejected() {
        let spec = IntrinsicSpec::new(
            "vorn_s8",
            "bitwise",
            tag("int8x8_t"),
            vec![tag("int8x8_t"), tag("int8x8_t")],
        );
        let err = emit(&spec, "arm_neon_ok", &["-O2 -g".to_string()], TestAction::Assemble)
            .unwrap_err();
        assert!(matches!(err, EmitError::InvalidOption(o) if o == "-O2 -g"));
    }

    #[test]
    fn ungated_cases_omit_target_directives() {
        let spec = IntrinsicSpec::new("vdup_n_u8", "dup", tag("uint8x8_t"), vec![tag("uint8_t")]);
        let case = emit(&spec, "", &[], TestAction::Compile).unwrap();
        let text = case.source_text();
        assert!(text.contains("/* { dg-do compile } */\n"));
        assert!(!text.contains("dg-require-effective-target"));
        assert!(!text.contains("dg-add-options"));
        assert!(!text.contains("dg-options"));
        assert!(!case.retains_intermediates());
    }

    #[test]
    fn scan_patterns_become_dg_final_lines() {
        let spec = IntrinsicSpec::new(
            "vorr_s8",
            "bitwise",
            tag("int8x8_t"),
            vec![tag("int8x8_t"), tag("int8x8_t")],
        )
        .scanning("vorr[ \\t]+d[0-9]+");
        let case = emit_with(&spec, &EmitOptions::default()).unwrap();
        assert!(case
            .source_text()
            .ends_with("}\n\n/* { dg-final { scan-assembler \"vorr\\[ \\\\t\\]+d\\[0-9\\]+\" } } */\n"));
    }

    #[test]
    fn action_parses_from_dg_do_names() {
        assert_eq!("assemble".parse::<TestAction>(), Ok(TestAction::Assemble));
        assert_eq!("compile".parse::<TestAction>(), Ok(TestAction::Compile));
        assert!("run".parse::<TestAction>().is_err());
    }
}
