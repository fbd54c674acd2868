//! Serializers for the intrinsic catalog.
//!
//! - **JSON** ([`json`]): machine-readable export for tooling, written by
//!   `neon-testgen --dump-catalog`

pub mod json;
