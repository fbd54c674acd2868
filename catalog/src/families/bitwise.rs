//! Bitwise logic: `vand`, `vorr`, `veor`, `vbic`, `vorn`, `vmvn`, `vbsl`.
//!
//! The binary operations are defined for every integer width in both
//! register classes and take two operands of the result type. `vmvn` stops
//! at 32-bit elements and adds `poly8`. `vbsl` selects bits from its second
//! and third operands under an unsigned mask of the same shape, so it is the
//! one member whose operand types differ.

use super::{intrinsic_name, lives_in_neon_registers, three_reg_pattern, vectors, Family, INTEGERS};
use crate::model::IntrinsicSpec;
use crate::types::ElementKind;

/// Binary bitwise mnemonics.
const BINARY: &[&str] = &["vand", "vorr", "veor", "vbic", "vorn"];

/// Returns the bitwise family.
#[must_use]
pub fn family() -> Family {
    let mut intrinsics = Vec::new();

    for &mnemonic in BINARY {
        for ty in vectors(INTEGERS, 64) {
            let mut spec = IntrinsicSpec::new(
                intrinsic_name(mnemonic, "", ty),
                "bitwise",
                ty,
                vec![ty, ty],
            );
            if lives_in_neon_registers(ty) {
                spec.scan_assembler
                    .extend(three_reg_pattern(mnemonic, "", ty));
            }
            intrinsics.push(spec);
        }
    }

    let mvn_kinds = [ElementKind::Int, ElementKind::UInt, ElementKind::Poly];
    for ty in vectors(&mvn_kinds, 32) {
        if ty.kind() == ElementKind::Poly && ty.bits() != 8 {
            continue;
        }
        intrinsics.push(IntrinsicSpec::new(
            intrinsic_name("vmvn", "", ty),
            "bitwise",
            ty,
            vec![ty],
        ));
    }

    for ty in vectors(&ElementKind::ALL, 64) {
        let Some(mask) = ty.with_kind(ElementKind::UInt) else {
            continue;
        };
        intrinsics.push(IntrinsicSpec::new(
            intrinsic_name("vbsl", "", ty),
            "bitwise",
            ty,
            vec![mask, ty, ty],
        ));
    }

    Family {
        name: "bitwise",
        comment: "Bitwise AND, OR, XOR, bit-clear, OR-NOT, NOT and bit-select.",
        intrinsics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vorn_s64_has_no_register_pattern() {
        let f = family();
        let vorn = f
            .intrinsics
            .iter()
            .find(|s| s.name == "vorn_s64")
            .unwrap();
        assert_eq!(vorn.arity, 2);
        assert_eq!(vorn.result_type.c_name(), "int64x1_t");
        assert!(vorn.scan_assembler.is_empty());
    }

    #[test]
    fn vbsl_mask_comes_first() {
        let f = family();
        let bsl = f
            .intrinsics
            .iter()
            .find(|s| s.name == "vbslq_f32")
            .unwrap();
        let ops: Vec<_> = bsl.operand_types.iter().map(|t| t.c_name()).collect();
        assert_eq!(ops, ["uint32x4_t", "float32x4_t", "float32x4_t"]);
    }

    #[test]
    fn vmvn_excludes_64_bit_and_poly16() {
        let f = family();
        assert!(f.intrinsics.iter().any(|s| s.name == "vmvn_p8"));
        assert!(!f.intrinsics.iter().any(|s| s.name == "vmvn_s64"));
        assert!(!f.intrinsics.iter().any(|s| s.name == "vmvn_p16"));
    }
}
