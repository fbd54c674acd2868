//! Scalar broadcast: `vdup_n`.

use super::{intrinsic_name, vectors, Family};
use crate::model::IntrinsicSpec;
use crate::types::ElementKind;

/// Returns the broadcast family.
#[must_use]
pub fn family() -> Family {
    let intrinsics = vectors(&ElementKind::ALL, 64)
        .into_iter()
        .map(|ty| {
            IntrinsicSpec::new(
                intrinsic_name("vdup", "_n", ty),
                "dup",
                ty,
                vec![ty.element()],
            )
        })
        .collect();

    Family {
        name: "dup",
        comment: "Broadcast a scalar into every lane of a vector.",
        intrinsics,
    }
}
