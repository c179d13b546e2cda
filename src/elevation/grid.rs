//! Affine-georeferenced raster elevation grids.
//!
//! A grid stores row-major sampled values plus a six-parameter affine
//! transform mapping cell (col, row) to local ground coordinates, the same
//! parameter order as ESRI world files. Queries invert the transform, round
//! to the nearest cell, and bounds-check — out of bounds means `Uncovered`,
//! not an error.

use std::fs;
use std::path::{Path, PathBuf};

use crate::elevation::Sample;
use crate::error::{ForgeError, Result};

/// Identity placement: 1 m cells anchored at the local origin.
pub const IDENTITY_TRANSFORM: [f64; 6] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

/// A gridded elevation raster.
///
/// The transform is `[a, b, c, d, e, f]` with
/// `x = a*col + b*row + c` and `z = d*col + e*row + f`.
#[derive(Debug, Clone)]
pub struct GridSource {
    width: usize,
    height: usize,
    values: Vec<f32>,
    transform: [f64; 6],
}

impl GridSource {
    /// Build a grid from row-major values and an affine transform.
    ///
    /// # Errors
    ///
    /// `UnsupportedFormat` when the value count does not match the
    /// dimensions or the transform is singular.
    pub fn from_parts(
        width: usize,
        height: usize,
        values: Vec<f32>,
        transform: [f64; 6],
    ) -> Result<Self> {
        if values.len() != width * height {
            return Err(ForgeError::UnsupportedFormat(format!(
                "grid dimensions {width}x{height} do not match {} values",
                values.len()
            )));
        }
        let det = transform[0] * transform[4] - transform[1] * transform[3];
        if det == 0.0 || !det.is_finite() {
            return Err(ForgeError::UnsupportedFormat(
                "grid affine transform is singular".into(),
            ));
        }
        Ok(Self {
            width,
            height,
            values,
            transform,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.values.len()
    }

    /// Nearest-cell lookup at local ground coordinates.
    pub fn sample_at(&self, x: f64, z: f64) -> Sample {
        let [a, b, c, d, e, f] = self.transform;
        let det = a * e - b * d;
        let rx = x - c;
        let rz = z - f;
        let col = (e * rx - b * rz) / det;
        let row = (a * rz - d * rx) / det;

        let col = col.round();
        let row = row.round();
        if col < 0.0 || row < 0.0 || col >= self.width as f64 || row >= self.height as f64 {
            return Sample::Uncovered;
        }

        let idx = row as usize * self.width + col as usize;
        Sample::Elevation(f64::from(self.values[idx]))
    }
}

/// Read a world-file sidecar (`.tfw`, `.wld`, `.pgw`) next to a raster.
///
/// World files carry six lines in the order A, D, B, E, C, F. Returns the
/// identity placement when no sidecar exists; a sidecar that exists but does
/// not parse is an `UnsupportedFormat` error rather than a silent default.
pub fn read_world_file(raster_path: &Path) -> Result<[f64; 6]> {
    let Some(sidecar) = find_sidecar(raster_path) else {
        log::debug!(
            "no world file next to {}, using identity placement",
            raster_path.display()
        );
        return Ok(IDENTITY_TRANSFORM);
    };

    let text = fs::read_to_string(&sidecar)?;
    let numbers: Vec<f64> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<f64>().map_err(|_| {
                ForgeError::UnsupportedFormat(format!(
                    "world file {} has non-numeric line `{line}`",
                    sidecar.display()
                ))
            })
        })
        .collect::<Result<_>>()?;

    if numbers.len() != 6 {
        return Err(ForgeError::UnsupportedFormat(format!(
            "world file {} has {} lines, expected 6",
            sidecar.display(),
            numbers.len()
        )));
    }

    // World file order is A, D, B, E, C, F.
    Ok([
        numbers[0], numbers[2], numbers[4], numbers[1], numbers[3], numbers[5],
    ])
}

fn find_sidecar(raster_path: &Path) -> Option<PathBuf> {
    for ext in ["tfw", "wld", "pgw"] {
        let candidate = raster_path.with_extension(ext);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}
