//! Built-in intrinsic families.
//!
//! Each sub-module encodes one group of NEON intrinsics as Rust data: a
//! mnemonic expanded over the element types and register widths it exists
//! for. See [`crate::Catalog::builtin`] for the assembly sequence.

pub mod arith;
pub mod bitwise;
pub mod compare;
pub mod dup;
pub mod shift;

use crate::model::IntrinsicSpec;
use crate::types::{ElementKind, Register, TypeTag};

/// One family of related intrinsics.
#[derive(Debug, Clone)]
pub struct Family {
    /// Family name, stored on every member as [`IntrinsicSpec::family`].
    pub name: &'static str,
    /// Description.
    pub comment: &'static str,
    /// Members, in definition order.
    pub intrinsics: Vec<IntrinsicSpec>,
}

/// Signed and unsigned integers of every width.
pub(crate) const INTEGERS: &[ElementKind] = &[ElementKind::Int, ElementKind::UInt];

/// Vector types of the given kinds in both register widths, D first.
///
/// `max_bits` drops wider elements (many operations stop at 32 bits).
pub(crate) fn vectors(kinds: &[ElementKind], max_bits: u8) -> Vec<TypeTag> {
    let mut out = Vec::new();
    for register in [Register::D, Register::Q] {
        for &kind in kinds {
            for &bits in kind.widths() {
                if bits <= max_bits {
                    out.extend(TypeTag::vector(kind, bits, register));
                }
            }
        }
    }
    out
}

/// The `arm_neon.h` name of `mnemonic` specialised for `ty`.
///
/// `infix` sits between the quad marker and the type suffix (`_n` for the
/// scalar-operand forms): `vorn` + `int64x2_t` → `vornq_s64`,
/// `vdup` + `_n` + `uint8x8_t` → `vdup_n_u8`.
pub(crate) fn intrinsic_name(mnemonic: &str, infix: &str, ty: TypeTag) -> String {
    let q = if ty.register() == Some(Register::Q) {
        "q"
    } else {
        ""
    };
    format!("{mnemonic}{q}{infix}_{}", ty.suffix())
}

/// A scan-assembler pattern for a three-register instruction.
///
/// `dt` is the NEON data-type qualifier (`.i8`, `.f32`), empty for the
/// bitwise instructions which carry none.
pub(crate) fn three_reg_pattern(insn: &str, dt: &str, ty: TypeTag) -> Option<String> {
    let r = match ty.register()? {
        Register::D => 'd',
        Register::Q => 'q',
    };
    let dt = dt.replace('.', "\\.");
    Some(format!(
        "{insn}{dt}[ \\t]+{r}[0-9]+, {r}[0-9]+, {r}[0-9]+"
    ))
}

/// Whether GCC keeps this type in NEON registers for simple operations.
///
/// Single-lane 64-bit vectors are routinely allocated to core registers, so
/// no instruction pattern is asserted for them.
pub(crate) fn lives_in_neon_registers(ty: TypeTag) -> bool {
    !(ty.register() == Some(Register::D) && ty.bits() == 64)
}
