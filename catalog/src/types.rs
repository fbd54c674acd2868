//! NEON element and register types.
//!
//! A [`TypeTag`] names one of the closed set of types that appear in
//! `arm_neon.h` intrinsic signatures: D-register (64-bit) and Q-register
//! (128-bit) vectors, plus the scalar element types used by the `_n` forms.
//! Tags are small `Copy` values; two tags are equal exactly when they spell
//! the same C type, so comparing tags is comparing interned names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CatalogError;

/// Element kind of a NEON type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    /// Signed integer (`int8_t` … `int64_t`).
    Int,
    /// Unsigned integer (`uint8_t` … `uint64_t`).
    UInt,
    /// IEEE single precision (`float32_t`).
    Float,
    /// Polynomial over GF(2) (`poly8_t`, `poly16_t`).
    Poly,
}

impl ElementKind {
    /// All element kinds, in declaration order.
    pub const ALL: [ElementKind; 4] = [
        ElementKind::Int,
        ElementKind::UInt,
        ElementKind::Float,
        ElementKind::Poly,
    ];

    /// The C typedef prefix (`int`, `uint`, `float`, `poly`).
    #[must_use]
    pub fn c_prefix(self) -> &'static str {
        match self {
            ElementKind::Int => "int",
            ElementKind::UInt => "uint",
            ElementKind::Float => "float",
            ElementKind::Poly => "poly",
        }
    }

    /// The letter used in intrinsic name suffixes (`s`, `u`, `f`, `p`).
    #[must_use]
    pub fn suffix_letter(self) -> char {
        match self {
            ElementKind::Int => 's',
            ElementKind::UInt => 'u',
            ElementKind::Float => 'f',
            ElementKind::Poly => 'p',
        }
    }

    /// Element widths that exist for this kind.
    #[must_use]
    pub fn widths(self) -> &'static [u8] {
        match self {
            ElementKind::Int | ElementKind::UInt => &[8, 16, 32, 64],
            ElementKind::Float => &[32],
            ElementKind::Poly => &[8, 16],
        }
    }
}

/// Width of a NEON register class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// 64-bit doubleword register.
    D,
    /// 128-bit quadword register.
    Q,
}

impl Register {
    /// Register width in bits.
    #[must_use]
    pub fn bits(self) -> u8 {
        match self {
            Register::D => 64,
            Register::Q => 128,
        }
    }
}

/// An element or vector type from `arm_neon.h`.
///
/// Construct through [`TypeTag::vector`], [`TypeTag::scalar`], or by parsing a
/// C spelling (`"int64x1_t"`, `"int64x1"`, `"uint32_t"`); every constructor
/// rejects combinations that `arm_neon.h` does not define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag {
    kind: ElementKind,
    bits: u8,
    lanes: Option<u8>,
}

impl TypeTag {
    /// The vector type holding `bits`-wide elements of `kind` in `register`.
    ///
    /// Returns `None` when the element type does not exist.
    #[must_use]
    pub fn vector(kind: ElementKind, bits: u8, register: Register) -> Option<Self> {
        if !kind.widths().contains(&bits) {
            return None;
        }
        Some(Self {
            kind,
            bits,
            lanes: Some(register.bits() / bits),
        })
    }

    /// The scalar type `bits`-wide of `kind`, or `None` if it does not exist.
    #[must_use]
    pub fn scalar(kind: ElementKind, bits: u8) -> Option<Self> {
        if !kind.widths().contains(&bits) {
            return None;
        }
        Some(Self {
            kind,
            bits,
            lanes: None,
        })
    }

    /// Element kind.
    #[must_use]
    pub fn kind(self) -> ElementKind {
        self.kind
    }

    /// Element width in bits.
    #[must_use]
    pub fn bits(self) -> u8 {
        self.bits
    }

    /// Lane count, or `None` for scalars.
    #[must_use]
    pub fn lanes(self) -> Option<u8> {
        self.lanes
    }

    /// Whether this is a vector type.
    #[must_use]
    pub fn is_vector(self) -> bool {
        self.lanes.is_some()
    }

    /// Register class of a vector type.
    #[must_use]
    pub fn register(self) -> Option<Register> {
        match self.lanes.map(|l| u16::from(l) * u16::from(self.bits)) {
            Some(64) => Some(Register::D),
            Some(128) => Some(Register::Q),
            _ => None,
        }
    }

    /// The same shape with a different element kind, if that type exists.
    ///
    /// Shift counts are always signed and comparison masks always unsigned,
    /// whatever the kind of the data operands.
    #[must_use]
    pub fn with_kind(self, kind: ElementKind) -> Option<Self> {
        if !kind.widths().contains(&self.bits) {
            return None;
        }
        Some(Self { kind, ..self })
    }

    /// The scalar element type of this tag.
    #[must_use]
    pub fn element(self) -> Self {
        Self {
            lanes: None,
            ..self
        }
    }

    /// The C spelling without the `_t` suffix (`int64x1`, `uint32`).
    #[must_use]
    pub fn base_name(self) -> String {
        match self.lanes {
            Some(lanes) => format!("{}{}x{}", self.kind.c_prefix(), self.bits, lanes),
            None => format!("{}{}", self.kind.c_prefix(), self.bits),
        }
    }

    /// The C typedef name (`int64x1_t`).
    #[must_use]
    pub fn c_name(self) -> String {
        format!("{}_t", self.base_name())
    }

    /// The intrinsic name suffix (`s64`, `u8`, `f32`).
    #[must_use]
    pub fn suffix(self) -> String {
        format!("{}{}", self.kind.suffix_letter(), self.bits)
    }

    /// Every type in the closed table: scalars first, then D, then Q vectors.
    #[must_use]
    pub fn all() -> Vec<TypeTag> {
        let mut tags = Vec::new();
        for kind in ElementKind::ALL {
            for &bits in kind.widths() {
                tags.extend(Self::scalar(kind, bits));
            }
        }
        for register in [Register::D, Register::Q] {
            for kind in ElementKind::ALL {
                for &bits in kind.widths() {
                    tags.extend(Self::vector(kind, bits, register));
                }
            }
        }
        tags
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.c_name())
    }
}

impl FromStr for TypeTag {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || CatalogError::UnknownType(s.to_string());
        let spelled = s.trim();
        let spelled = spelled.strip_suffix("_t").unwrap_or(spelled);

        // Longest prefix first: "uint" must win over "int".
        let (kind, rest) = [
            ("uint", ElementKind::UInt),
            ("int", ElementKind::Int),
            ("float", ElementKind::Float),
            ("poly", ElementKind::Poly),
        ]
        .iter()
        .find_map(|(prefix, kind)| spelled.strip_prefix(prefix).map(|rest| (*kind, rest)))
        .ok_or_else(unknown)?;

        let (bits, lanes) = match rest.split_once('x') {
            Some((bits, lanes)) => (bits, Some(lanes)),
            None => (rest, None),
        };
        let bits: u8 = bits.parse().map_err(|_| unknown())?;

        match lanes {
            None => Self::scalar(kind, bits).ok_or_else(unknown),
            Some(lanes) => {
                let lanes: u32 = lanes.parse().map_err(|_| unknown())?;
                let register = match lanes.checked_mul(u32::from(bits)) {
                    Some(64) => Register::D,
                    Some(128) => Register::Q,
                    _ => return Err(unknown()),
                };
                Self::vector(kind, bits, register).ok_or_else(unknown)
            }
        }
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.c_name())
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
