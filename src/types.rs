//! Core types and configuration for routeforge.
//!
//! Upstream records (`Building`, `Route`) are produced by an external parser;
//! everything downstream of projection works in local planar coordinates.

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};

/// A geodetic point: latitude/longitude in degrees, optional elevation in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    /// Elevation above the datum in meters, when the source provides one.
    #[serde(default)]
    pub elevation: Option<f64>,
}

impl GeoPoint {
    /// Create a point without elevation.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            elevation: None,
        }
    }

    /// Create a point with a known elevation in meters.
    pub fn with_elevation(lat: f64, lon: f64, elevation: f64) -> Self {
        Self {
            lat,
            lon,
            elevation: Some(elevation),
        }
    }

    /// Validate coordinate ranges: |lat| <= 90, |lon| <= 180, both finite.
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(ForgeError::InvalidCoordinate(format!(
                "non-finite coordinate ({}, {})",
                self.lat, self.lon
            )));
        }
        if self.lat.abs() > 90.0 {
            return Err(ForgeError::InvalidCoordinate(format!(
                "latitude {} outside [-90, 90]",
                self.lat
            )));
        }
        if self.lon.abs() > 180.0 {
            return Err(ForgeError::InvalidCoordinate(format!(
                "longitude {} outside [-180, 180]",
                self.lon
            )));
        }
        Ok(())
    }
}

/// A position in the local Cartesian frame, meters relative to the run origin.
///
/// Axis convention follows the downstream authoring target: x = east,
/// y = up, z = north. Projecting the origin onto itself yields (0, 0, 0).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LocalPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Planar (ground-plane) distance to another point, ignoring elevation.
    pub fn planar_distance(&self, other: &LocalPoint) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Full 3D distance to another point.
    pub fn distance(&self, other: &LocalPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// A building record from the upstream parser: ground-level footprint,
/// optional height, and a classification tag (e.g. `residential`, `yes`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub footprint: Vec<GeoPoint>,
    /// Height in meters; absent when the source carries no height data.
    #[serde(default)]
    pub height: Option<f64>,
    pub classification: String,
}

impl Building {
    pub fn new(
        footprint: Vec<GeoPoint>,
        height: Option<f64>,
        classification: impl Into<String>,
    ) -> Self {
        Self {
            footprint,
            height,
            classification: classification.into(),
        }
    }
}

/// An ordered route path from the upstream parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub stops: Vec<GeoPoint>,
    /// Display name used in run reports, when the source names the way.
    #[serde(default)]
    pub name: Option<String>,
}

impl Route {
    pub fn new(stops: Vec<GeoPoint>) -> Self {
        Self { stops, name: None }
    }

    pub fn named(stops: Vec<GeoPoint>, name: impl Into<String>) -> Self {
        Self {
            stops,
            name: Some(name.into()),
        }
    }
}

/// Conversion run configuration.
///
/// Designed to be easily serializable and loadable from JSON (or TOML with
/// the `toml` feature) while keeping complexity minimal.
///
/// # Example
///
/// ```rust
/// use routeforge::Config;
///
/// let config = Config::default();
/// assert_eq!(config.road_width, 6.0);
///
/// let json = r#"{ "datum_elevation": 12.5, "road_width": 8.0 }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.datum_elevation, 12.5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Fallback elevation substituted when no sample covers a query point.
    #[serde(default)]
    pub datum_elevation: f64,

    /// Maximum planar search radius (meters) for point-set elevation lookups.
    /// Samples farther away than this count as no coverage.
    #[serde(default = "Config::default_max_search_radius")]
    pub max_search_radius: f64,

    /// Height assigned to buildings whose source record carries none.
    #[serde(default = "Config::default_building_height")]
    pub default_building_height: f64,

    /// Road carriageway width in meters.
    #[serde(default = "Config::default_road_width")]
    pub road_width: f64,

    /// Sidewalk width in meters (one side).
    #[serde(default = "Config::default_sidewalk_width")]
    pub sidewalk_width: f64,

    /// Vertical lift applied to sidewalks so they sit above the carriageway.
    #[serde(default = "Config::default_sidewalk_lift")]
    pub sidewalk_lift: f64,

    /// Seed for deterministic procedural texture synthesis.
    #[serde(default = "Config::default_texture_seed")]
    pub texture_seed: u64,

    /// Edge length in pixels for generated texture rasters.
    #[serde(default = "Config::default_texture_size")]
    pub texture_size: u32,

    /// Optional (min, max) elevation range mapped onto normalized grid raster
    /// values. When absent, gray levels are read back as meters directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_value_range: Option<(f64, f64)>,
}

impl Config {
    const fn default_max_search_radius() -> f64 {
        50.0
    }

    const fn default_building_height() -> f64 {
        10.0
    }

    const fn default_road_width() -> f64 {
        6.0
    }

    const fn default_sidewalk_width() -> f64 {
        2.0
    }

    const fn default_sidewalk_lift() -> f64 {
        0.1
    }

    const fn default_texture_seed() -> u64 {
        42
    }

    const fn default_texture_size() -> u32 {
        512
    }

    pub fn with_datum_elevation(mut self, datum: f64) -> Self {
        self.datum_elevation = datum;
        self
    }

    pub fn with_max_search_radius(mut self, radius: f64) -> Self {
        self.max_search_radius = radius;
        self
    }

    pub fn with_default_building_height(mut self, height: f64) -> Self {
        self.default_building_height = height;
        self
    }

    pub fn with_road_width(mut self, width: f64) -> Self {
        self.road_width = width;
        self
    }

    pub fn with_sidewalk_width(mut self, width: f64) -> Self {
        self.sidewalk_width = width;
        self
    }

    pub fn with_texture_seed(mut self, seed: u64) -> Self {
        self.texture_seed = seed;
        self
    }

    pub fn with_texture_size(mut self, size: u32) -> Self {
        self.texture_size = size;
        self
    }

    pub fn with_grid_value_range(mut self, min: f64, max: f64) -> Self {
        self.grid_value_range = Some((min, max));
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if !self.datum_elevation.is_finite() {
            return Err(ForgeError::Config("datum elevation must be finite".into()));
        }
        if !self.max_search_radius.is_finite() || self.max_search_radius <= 0.0 {
            return Err(ForgeError::Config(
                "max search radius must be positive and finite".into(),
            ));
        }
        if !self.default_building_height.is_finite() || self.default_building_height <= 0.0 {
            return Err(ForgeError::Config(
                "default building height must be positive and finite".into(),
            ));
        }
        if !self.road_width.is_finite() || self.road_width <= 0.0 {
            return Err(ForgeError::Config(
                "road width must be positive and finite".into(),
            ));
        }
        if !self.sidewalk_width.is_finite() || self.sidewalk_width < 0.0 {
            return Err(ForgeError::Config(
                "sidewalk width must be non-negative and finite".into(),
            ));
        }
        if self.texture_size == 0 {
            return Err(ForgeError::Config("texture size must be non-zero".into()));
        }
        if let Some((min, max)) = self.grid_value_range {
            if !min.is_finite() || !max.is_finite() || min >= max {
                return Err(ForgeError::Config(
                    "grid value range must be finite with min < max".into(),
                ));
            }
        }
        Ok(())
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| ForgeError::Config(format!("JSON parse failed: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ForgeError::Config(format!("JSON serialize failed: {e}")))
    }

    /// Load configuration from a TOML string (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)
            .map_err(|e| ForgeError::Config(format!("TOML parse failed: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration as TOML (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ForgeError::Config(format!("TOML serialize failed: {e}")))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            datum_elevation: 0.0,
            max_search_radius: Self::default_max_search_radius(),
            default_building_height: Self::default_building_height(),
            road_width: Self::default_road_width(),
            sidewalk_width: Self::default_sidewalk_width(),
            sidewalk_lift: Self::default_sidewalk_lift(),
            texture_seed: Self::default_texture_seed(),
            texture_size: Self::default_texture_size(),
            grid_value_range: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_validation() {
        assert!(GeoPoint::new(48.858, 2.294).validate().is_ok());
        assert!(GeoPoint::new(90.0, 180.0).validate().is_ok());
        assert!(GeoPoint::new(90.1, 0.0).validate().is_err());
        assert!(GeoPoint::new(0.0, -180.5).validate().is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).validate().is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_local_point_distances() {
        let a = LocalPoint::new(0.0, 0.0, 0.0);
        let b = LocalPoint::new(3.0, 10.0, 4.0);
        assert!((a.planar_distance(&b) - 5.0).abs() < 1e-12);
        assert!((a.distance(&b) - (125.0f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.datum_elevation, 0.0);
        assert_eq!(config.max_search_radius, 50.0);
        assert_eq!(config.default_building_height, 10.0);
        assert_eq!(config.road_width, 6.0);
        assert_eq!(config.texture_seed, 42);
        assert!(config.grid_value_range.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builders() {
        let config = Config::default()
            .with_datum_elevation(35.0)
            .with_max_search_radius(25.0)
            .with_road_width(8.0)
            .with_texture_seed(7)
            .with_grid_value_range(0.0, 400.0);
        assert_eq!(config.datum_elevation, 35.0);
        assert_eq!(config.max_search_radius, 25.0);
        assert_eq!(config.road_width, 8.0);
        assert_eq!(config.texture_seed, 7);
        assert_eq!(config.grid_value_range, Some((0.0, 400.0)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.max_search_radius = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.road_width = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.datum_elevation = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.grid_value_range = Some((100.0, 100.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = Config::default()
            .with_datum_elevation(12.5)
            .with_sidewalk_width(1.5);
        let json = config.to_json().unwrap();
        let restored = Config::from_json(&json).unwrap();
        assert_eq!(restored.datum_elevation, 12.5);
        assert_eq!(restored.sidewalk_width, 1.5);
    }

    #[test]
    fn test_config_json_defaults_applied() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.max_search_radius, 50.0);
        assert_eq!(config.texture_size, 512);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config::default().with_road_width(7.5);
        let text = config.to_toml().unwrap();
        let restored = Config::from_toml(&text).unwrap();
        assert_eq!(restored.road_width, 7.5);
    }
}
