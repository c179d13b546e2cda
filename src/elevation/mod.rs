//! Heterogeneous elevation sources behind one uniform query.
//!
//! Three encodings are supported, inferred from the file extension:
//!
//! - gridded rasters (`.tif`, `.tiff`, `.png` heightmaps) — requires the
//!   raster decoding capability (`image-codec` feature),
//! - plain "x y z" rows (`.xyz`, `.csv`, `.txt`) — decoded with no external
//!   dependency,
//! - point-cloud containers (`.las`, `.laz`) — requires the `las` feature.
//!
//! All of them answer [`ElevationSource::sample_at`]; a query outside coverage
//! returns [`Sample::Uncovered`] rather than erroring, so callers can apply
//! the configured datum fallback and keep the substitution observable.

pub mod capability;
pub mod grid;
pub mod pointset;

use std::fs;
use std::path::Path;

use crate::error::{ForgeError, Result};
use crate::types::Config;

pub use capability::Capabilities;
pub use grid::GridSource;
pub use pointset::{PointSetSource, parse_ascii_rows};

/// Outcome of a single elevation query.
///
/// `Uncovered` is a normal sampling outcome, not an error: it marks queries
/// outside a grid's bounds or beyond a point set's search radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    /// A genuine sample, in meters.
    Elevation(f64),
    /// No source data covers the query point.
    Uncovered,
}

impl Sample {
    pub fn is_uncovered(&self) -> bool {
        matches!(self, Sample::Uncovered)
    }

    /// Unwrap to the sampled value, or `datum` when uncovered.
    pub fn unwrap_or_datum(self, datum: f64) -> f64 {
        match self {
            Sample::Elevation(e) => e,
            Sample::Uncovered => datum,
        }
    }
}

/// A loaded elevation source, tagged by encoding.
///
/// Mesh generation never matches on the variant; it only calls `sample_at`,
/// which keeps the geometry code format-agnostic.
#[derive(Debug)]
pub enum ElevationSource {
    /// Affine-georeferenced raster of sampled values.
    Grid(GridSource),
    /// Unordered point samples from a point-cloud container.
    PointSet(PointSetSource),
    /// Point samples decoded from delimited text rows.
    AsciiRows(PointSetSource),
}

impl ElevationSource {
    /// Query the elevation at local ground-plane coordinates (x = east,
    /// z = north), in meters.
    ///
    /// Grid sources use nearest-cell lookup through their affine transform;
    /// point sources use nearest-neighbor search bounded by `max_radius`
    /// meters (beyond it, `Uncovered` — never silent extrapolation from
    /// distant samples).
    pub fn sample_at(&self, x: f64, z: f64, max_radius: f64) -> Sample {
        match self {
            ElevationSource::Grid(grid) => grid.sample_at(x, z),
            ElevationSource::PointSet(points) | ElevationSource::AsciiRows(points) => {
                points.sample_at(x, z, max_radius)
            }
        }
    }

    /// Short tag for log lines and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ElevationSource::Grid(_) => "grid",
            ElevationSource::PointSet(_) => "point-set",
            ElevationSource::AsciiRows(_) => "ascii-rows",
        }
    }

    /// Number of stored samples (grid cells or points).
    pub fn sample_count(&self) -> usize {
        match self {
            ElevationSource::Grid(grid) => grid.cell_count(),
            ElevationSource::PointSet(points) | ElevationSource::AsciiRows(points) => points.len(),
        }
    }
}

/// Load an elevation source, inferring the encoding from the file extension.
///
/// # Errors
///
/// - `UnsupportedFormat` for unrecognized extensions or malformed content.
/// - `MissingDependency` when the required optional decoding capability is
///   not compiled in. This is a clean, reported failure — the pipeline treats
///   it as non-fatal and falls back to the datum elevation.
/// - `Io` when the file cannot be read.
pub fn load(path: &Path, config: &Config) -> Result<ElevationSource> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();

    let source = match ext.as_str() {
        "tif" | "tiff" | "png" => capability::decode_grid(path, config).map(ElevationSource::Grid)?,
        "xyz" | "csv" | "txt" => {
            let text = fs::read_to_string(path)?;
            let samples = parse_ascii_rows(&text)?;
            ElevationSource::AsciiRows(PointSetSource::from_samples(samples))
        }
        "las" | "laz" => capability::decode_point_cloud(path).map(ElevationSource::PointSet)?,
        other => {
            return Err(ForgeError::UnsupportedFormat(format!(
                "unrecognized elevation file extension `{other}` for {}",
                path.display()
            )));
        }
    };

    log::info!(
        "loaded {} elevation source from {} ({} samples)",
        source.kind(),
        path.display(),
        source.sample_count()
    );
    Ok(source)
}
