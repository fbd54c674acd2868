//! Catalog → C naming rules.
//!
//! Deterministic mappings from intrinsic signatures to the identifiers and
//! directive arguments that appear in a generated test.

use neon_catalog::TypeTag;

/// Name of the global receiving the intrinsic's return value (`out_int64x1_t`).
pub fn result_global(ty: TypeTag) -> String {
    format!("out_{}", ty.c_name())
}

/// Name of the global passed as operand `index` (`arg0_int64x1_t`).
pub fn operand_global(index: usize, ty: TypeTag) -> String {
    format!("arg{index}_{}", ty.c_name())
}

/// Name of the test function (`test_vorns64`).
pub fn test_function(stem: &str) -> String {
    format!("test_{stem}")
}

/// The `dg-add-options` group implied by an effective-target requirement.
///
/// Requirements are spelled `<group>_ok` (`arm_neon_ok` → `arm_neon`); a
/// requirement without the suffix names its group directly.
pub fn add_options_group(requirement: &str) -> &str {
    requirement.strip_suffix("_ok").unwrap_or(requirement)
}

/// Quotes a regular expression for a Tcl double-quoted string.
///
/// Inside `"..."` Tcl performs backslash, variable and command substitution,
/// so `\`, `$`, `[`, `]` and `"` must all be escaped to reach the regexp
/// engine unchanged.
pub fn tcl_quote(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    for c in pattern.chars() {
        if matches!(c, '\\' | '$' | '[' | ']' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Whether `s` may appear unquoted inside a `dg-options "..."` string.
pub fn is_plain_option(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(|c| c.is_whitespace() || c == '"' || c == '\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_names_embed_the_c_type() {
        let t: TypeTag = "int64x1_t".parse().unwrap();
        assert_eq!(result_global(t), "out_int64x1_t");
        assert_eq!(operand_global(0, t), "arg0_int64x1_t");
        assert_eq!(operand_global(1, t), "arg1_int64x1_t");
    }

    #[test]
    fn add_options_strips_ok() {
        assert_eq!(add_options_group("arm_neon_ok"), "arm_neon");
        assert_eq!(add_options_group("arm_neon_fp16_ok"), "arm_neon_fp16");
        assert_eq!(add_options_group("arm_neon"), "arm_neon");
    }

    #[test]
    fn tcl_quoting() {
        assert_eq!(
            tcl_quote("vorr[ \\t]+d[0-9]+"),
            "vorr\\[ \\\\t\\]+d\\[0-9\\]+"
        );
    }

    #[test]
    fn plain_options() {
        assert!(is_plain_option("-O2"));
        assert!(is_plain_option("-save-temps"));
        assert!(!is_plain_option("-DX=\"y\""));
        assert!(!is_plain_option("-O2 -g"));
        assert!(!is_plain_option(""));
    }
}
