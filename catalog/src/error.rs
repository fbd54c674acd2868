//! Catalog errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building, loading, or querying a [`Catalog`](crate::Catalog).
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No intrinsic with this name is registered.
    #[error("intrinsic `{0}` is not in the catalog")]
    NotFound(String),

    /// A type spelling is not one of the `arm_neon.h` types.
    #[error("unrecognized type `{0}`")]
    UnknownType(String),

    /// A catalog entry violates an [`IntrinsicSpec`](crate::IntrinsicSpec) invariant.
    #[error("invalid intrinsic `{name}`: {reason}")]
    InvalidSpec {
        /// Name of the offending entry (may be empty).
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The definition file could not be read.
    #[error("cannot read catalog definitions from {}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The definition file is not valid TOML or has the wrong shape.
    #[error("malformed catalog definitions: {0}")]
    Parse(#[from] toml::de::Error),

    /// Loading finished with no usable entries.
    #[error("catalog has no valid intrinsics")]
    Empty,
}

impl CatalogError {
    /// Shorthand for an [`CatalogError::InvalidSpec`].
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogError::InvalidSpec {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is fatal to a whole run rather than to one entry.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CatalogError::Io { .. } | CatalogError::Parse(_) | CatalogError::Empty
        )
    }
}
