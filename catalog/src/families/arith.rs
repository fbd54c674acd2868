//! Lane-wise arithmetic: `vadd`, `vsub`, `vmul`.

use super::{intrinsic_name, lives_in_neon_registers, three_reg_pattern, vectors, Family};
use crate::model::IntrinsicSpec;
use crate::types::{ElementKind, TypeTag};

/// Returns the arithmetic family.
#[must_use]
pub fn family() -> Family {
    let mut intrinsics = Vec::new();

    let add_kinds = [ElementKind::Int, ElementKind::UInt, ElementKind::Float];
    for mnemonic in ["vadd", "vsub"] {
        for ty in vectors(&add_kinds, 64) {
            intrinsics.push(binary(mnemonic, ty));
        }
    }

    let mul_kinds = [
        ElementKind::Int,
        ElementKind::UInt,
        ElementKind::Float,
        ElementKind::Poly,
    ];
    for ty in vectors(&mul_kinds, 32) {
        if ty.kind() == ElementKind::Poly && ty.bits() != 8 {
            continue;
        }
        intrinsics.push(binary("vmul", ty));
    }

    Family {
        name: "arith",
        comment: "Lane-wise addition, subtraction and multiplication.",
        intrinsics,
    }
}

fn binary(mnemonic: &str, ty: TypeTag) -> IntrinsicSpec {
    let mut spec = IntrinsicSpec::new(intrinsic_name(mnemonic, "", ty), "arith", ty, vec![ty, ty]);
    if lives_in_neon_registers(ty) {
        spec.scan_assembler
            .extend(three_reg_pattern(mnemonic, &data_type(ty), ty));
    }
    spec
}

/// The instruction data-type qualifier: integer arithmetic is sign-agnostic.
fn data_type(ty: TypeTag) -> String {
    match ty.kind() {
        ElementKind::Int | ElementKind::UInt => format!(".i{}", ty.bits()),
        ElementKind::Float => format!(".f{}", ty.bits()),
        ElementKind::Poly => format!(".p{}", ty.bits()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_and_unsigned_share_the_integer_qualifier() {
        let f = family();
        let s = f.intrinsics.iter().find(|s| s.name == "vadd_s16").unwrap();
        let u = f.intrinsics.iter().find(|s| s.name == "vadd_u16").unwrap();
        assert_eq!(s.scan_assembler, u.scan_assembler);
        assert!(s.scan_assembler[0].starts_with("vadd\\.i16"));
    }

    #[test]
    fn vmul_has_poly8_only() {
        let f = family();
        assert!(f.intrinsics.iter().any(|s| s.name == "vmulq_p8"));
        assert!(!f.intrinsics.iter().any(|s| s.name == "vmul_p16"));
        assert!(!f.intrinsics.iter().any(|s| s.name == "vmul_s64"));
    }
}
