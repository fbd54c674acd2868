//! Lane-wise comparisons: `vceq`, `vcge`, `vcgt`.
//!
//! Every comparison yields an all-ones/all-zeros unsigned mask of the operand
//! shape, so the result type differs from the operand type for signed,
//! float and polynomial inputs.

use super::{intrinsic_name, vectors, Family};
use crate::model::IntrinsicSpec;
use crate::types::ElementKind;

/// Returns the comparison family.
#[must_use]
pub fn family() -> Family {
    let mut intrinsics = Vec::new();

    let ordered = [ElementKind::Int, ElementKind::UInt, ElementKind::Float];
    let equality = [
        ElementKind::Int,
        ElementKind::UInt,
        ElementKind::Float,
        ElementKind::Poly,
    ];

    for (mnemonic, kinds) in [
        ("vceq", &equality[..]),
        ("vcge", &ordered[..]),
        ("vcgt", &ordered[..]),
    ] {
        for ty in vectors(kinds, 32) {
            if ty.kind() == ElementKind::Poly && ty.bits() != 8 {
                continue;
            }
            let Some(mask) = ty.with_kind(ElementKind::UInt) else {
                continue;
            };
            intrinsics.push(IntrinsicSpec::new(
                intrinsic_name(mnemonic, "", ty),
                "compare",
                mask,
                vec![ty, ty],
            ));
        }
    }

    Family {
        name: "compare",
        comment: "Lane-wise equality and ordering comparisons producing unsigned masks.",
        intrinsics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_compare_returns_unsigned_mask() {
        let f = family();
        let c = f.intrinsics.iter().find(|s| s.name == "vcgtq_f32").unwrap();
        assert_eq!(c.result_type.c_name(), "uint32x4_t");
        assert_eq!(c.operand_types[0].c_name(), "float32x4_t");
    }
}
