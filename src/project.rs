//! Geodetic-to-local coordinate projection.
//!
//! Uses a local equirectangular approximation: longitude deltas are scaled by
//! the cosine of the origin latitude, latitude deltas by Earth's mean radius.
//! Accurate to well under projection tolerance over patches up to roughly
//! 10 km from the origin; curvature correction beyond that is out of scope.

use geo::{Distance, Haversine, Point};

use crate::error::Result;
use crate::types::{GeoPoint, LocalPoint};

/// Earth mean radius in meters, shared with the haversine checks below.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Project a geodetic point into the local frame anchored at `origin`.
///
/// Returns x = east, z = north in meters; y is taken from the point's
/// elevation (0 when absent). Projecting the origin onto itself yields
/// exactly (0, 0, 0).
///
/// # Errors
///
/// `InvalidCoordinate` when either point has |lat| > 90, |lon| > 180, or a
/// non-finite component.
///
/// # Examples
///
/// ```rust
/// use routeforge::{GeoPoint, project};
///
/// let origin = GeoPoint::new(48.858, 2.294);
/// let local = project(&origin, &origin).unwrap();
/// assert_eq!((local.x, local.y, local.z), (0.0, 0.0, 0.0));
/// ```
pub fn project(origin: &GeoPoint, point: &GeoPoint) -> Result<LocalPoint> {
    origin.validate()?;
    point.validate()?;

    let dlat = (point.lat - origin.lat).to_radians();
    let dlon = (point.lon - origin.lon).to_radians();

    let x = dlon * EARTH_RADIUS_METERS * origin.lat.to_radians().cos();
    let z = dlat * EARTH_RADIUS_METERS;
    let y = point.elevation.unwrap_or(0.0);

    Ok(LocalPoint::new(x, y, z))
}

/// Project a whole ring/path, failing on the first invalid coordinate.
pub fn project_all(origin: &GeoPoint, points: &[GeoPoint]) -> Result<Vec<LocalPoint>> {
    points.iter().map(|p| project(origin, p)).collect()
}

/// Compass heading in degrees from `a` to `b`, normalized to [0, 360).
///
/// 0 = north, 90 = east. Used to orient stops and markers along a route.
pub fn heading_between(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let dlat = b.lat - a.lat;
    let dlon = (b.lon - a.lon) * a.lat.to_radians().cos();
    let degrees = dlon.atan2(dlat).to_degrees();
    (degrees + 360.0) % 360.0
}

/// Great-circle (haversine) distance in meters between two geodetic points.
///
/// Serves as the ground-truth reference the equirectangular projection is
/// checked against.
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    Haversine.distance(Point::new(a.lon, a.lat), Point::new(b.lon, b.lat))
}

/// Total haversine path length in meters over an ordered point sequence.
pub fn path_length(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}
