//! Register shifts: `vshl`.
//!
//! The shift count vector is always signed (negative counts shift right), so
//! the unsigned forms take operands of two different types.

use super::{intrinsic_name, vectors, Family, INTEGERS};
use crate::model::IntrinsicSpec;
use crate::types::ElementKind;

/// Returns the shift family.
#[must_use]
pub fn family() -> Family {
    let intrinsics = vectors(INTEGERS, 64)
        .into_iter()
        .filter_map(|ty| {
            let count = ty.with_kind(ElementKind::Int)?;
            Some(IntrinsicSpec::new(
                intrinsic_name("vshl", "", ty),
                "shift",
                ty,
                vec![ty, count],
            ))
        })
        .collect();

    Family {
        name: "shift",
        comment: "Shift each lane by a signed per-lane count.",
        intrinsics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_shift_takes_signed_count() {
        let f = family();
        let s = f.intrinsics.iter().find(|s| s.name == "vshlq_u16").unwrap();
        let ops: Vec<_> = s.operand_types.iter().map(|t| t.c_name()).collect();
        assert_eq!(ops, ["uint16x8_t", "int16x8_t"]);
    }
}
