//! Versioning error type.

use anyhow::Error as AnyError;
use thiserror::Error;

use quire_schema::ValidationError;

use crate::definitions::Version;

/// Failures raised while building or applying a transform chain.
#[derive(Debug, Error)]
pub enum VersioningError {
    /// A payload failed its declared per-version schema. Transparent so the
    /// path-qualified validator message is the error surface.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A migration step returned an error. The chain stops here; the
    /// partially transformed value is discarded.
    #[error("transform for version [{version}] failed: {source}")]
    Transform {
        version: Version,
        #[source]
        source: AnyError,
    },

    /// The definition map has no versions at all.
    #[error("no schema versions have been defined")]
    NoVersions,

    /// Versions are positive integers.
    #[error("invalid version [{0}]. Versions start at [1].")]
    InvalidVersion(Version),

    /// The requested version exceeds the highest defined version.
    #[error("invalid version [{requested}]. Latest version is [{latest}].")]
    VersionTooHigh { requested: Version, latest: Version },
}
