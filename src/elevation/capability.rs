//! Optional decoding capabilities behind an explicit probe-and-report contract.
//!
//! Raster-grid and point-cloud decoding rely on crates that are compiled in
//! only when the matching cargo feature is enabled. Absence of a capability
//! is a first-class outcome: `load` reports `MissingDependency` and the
//! pipeline falls back to the datum elevation — never a crash.

use std::path::Path;

use crate::elevation::grid::{self, GridSource};
use crate::elevation::pointset::PointSetSource;
use crate::error::Result;
use crate::types::Config;

/// Snapshot of which optional decoders this build carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Gridded raster heightmap decoding (`image-codec` feature).
    pub raster_grid: bool,
    /// Point-cloud container decoding (`las` feature).
    pub point_cloud: bool,
}

impl Capabilities {
    /// Probe the capabilities compiled into this build.
    pub fn detect() -> Self {
        Self {
            raster_grid: cfg!(feature = "image-codec"),
            point_cloud: cfg!(feature = "las"),
        }
    }
}

/// Decode a grayscale raster heightmap into a grid source.
///
/// Gray levels map to meters: raw 8-bit levels directly, or linearly into
/// `Config::grid_value_range` when configured. Georeferencing comes from a
/// world-file sidecar; without one the grid sits at the local origin with
/// 1 m cells.
#[cfg(feature = "image-codec")]
pub fn decode_grid(path: &Path, config: &Config) -> Result<GridSource> {
    use crate::error::ForgeError;

    let img = image::open(path).map_err(|e| {
        ForgeError::UnsupportedFormat(format!("raster decode failed for {}: {e}", path.display()))
    })?;
    let gray = img.to_luma16();
    let (width, height) = gray.dimensions();

    let values: Vec<f32> = gray
        .pixels()
        .map(|p| {
            let normalized = f64::from(p.0[0]) / f64::from(u16::MAX);
            let meters = match config.grid_value_range {
                Some((min, max)) => min + normalized * (max - min),
                // No range configured: recover the 8-bit gray level as meters.
                None => normalized * 255.0,
            };
            meters as f32
        })
        .collect();

    let transform = grid::read_world_file(path)?;
    GridSource::from_parts(width as usize, height as usize, values, transform)
}

#[cfg(not(feature = "image-codec"))]
pub fn decode_grid(_path: &Path, _config: &Config) -> Result<GridSource> {
    Err(crate::error::ForgeError::MissingDependency(
        "raster grid decoding",
        "image-codec",
    ))
}

/// Decode a LAS/LAZ point cloud into planar elevation samples.
///
/// Point coordinates are assumed to already be in the local frame
/// (x = east, y = north, z = elevation), as produced by upstream extract
/// tooling.
#[cfg(feature = "las")]
pub fn decode_point_cloud(path: &Path) -> Result<PointSetSource> {
    use crate::error::ForgeError;

    let mut reader = las::Reader::from_path(path).map_err(|e| {
        ForgeError::UnsupportedFormat(format!(
            "point cloud decode failed for {}: {e}",
            path.display()
        ))
    })?;

    let mut samples = Vec::new();
    for point in reader.points() {
        let point = point.map_err(|e| {
            ForgeError::UnsupportedFormat(format!(
                "point cloud read failed for {}: {e}",
                path.display()
            ))
        })?;
        samples.push((point.x, point.y, point.z));
    }
    Ok(PointSetSource::from_samples(samples))
}

#[cfg(not(feature = "las"))]
pub fn decode_point_cloud(_path: &Path) -> Result<PointSetSource> {
    Err(crate::error::ForgeError::MissingDependency(
        "point-cloud decoding",
        "las",
    ))
}
