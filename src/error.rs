//! Central error type for all conversion operations.
//!
//! Structural input errors (`InvalidCoordinate`, `DegeneratePolygon`,
//! `InsufficientPoints`) are per-entity: the pipeline records them in the run
//! report and keeps going. Capability errors (`MissingDependency`,
//! `UnsupportedFormat`) are non-fatal during elevation loading; the sampler
//! falls back to the configured datum elevation.
//!
//! An out-of-coverage elevation query is not an error at all — it is the
//! `Sample::Uncovered` variant in [`crate::elevation`].

use thiserror::Error;

/// Centralized error type for conversion operations.
#[derive(Error, Debug)]
pub enum ForgeError {
    /// Latitude/longitude outside valid ranges or non-finite.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Elevation source encoding not recognized or malformed.
    #[error("unsupported elevation format: {0}")]
    UnsupportedFormat(String),

    /// An optional decoding capability is required but not compiled in.
    #[error("missing optional capability: {0} (enable the `{1}` feature)")]
    MissingDependency(&'static str, &'static str),

    /// Footprint collapsed to fewer than three distinct vertices.
    #[error("degenerate polygon: {0}")]
    DegeneratePolygon(String),

    /// Path too short to build a ribbon.
    #[error("insufficient points: need at least {needed}, got {got}")]
    InsufficientPoints { needed: usize, got: usize },

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Raster encoding failed.
    #[error("encoding error: {0}")]
    Encode(String),

    /// Underlying file I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForgeError {
    /// True for errors that abort only the entity that triggered them,
    /// leaving the rest of the run intact.
    pub fn is_per_entity(&self) -> bool {
        matches!(
            self,
            ForgeError::InvalidCoordinate(_)
                | ForgeError::DegeneratePolygon(_)
                | ForgeError::InsufficientPoints { .. }
        )
    }
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, ForgeError>;
