//! Building-footprint extrusion into closed prism solids.
//!
//! The footprint ring is cleaned of consecutive duplicates, normalized to a
//! consistent orientation, and extruded from a base elevation: one wall quad
//! per edge, plus floor and roof caps wound to face outward. Wall UVs follow
//! cumulative perimeter arc-length; cap UVs are planar.

use glam::DVec2;
use smallvec::SmallVec;

use crate::error::{ForgeError, Result};
use crate::mesh::{Face, Mesh};
use crate::types::LocalPoint;

const EPSILON: f64 = 1e-6;

/// Extrude a footprint ring into a closed solid.
///
/// Floor vertices sit at `base_elevation`, roof vertices at
/// `base_elevation + height`. The input ring may repeat its first vertex as
/// a closing vertex; consecutive duplicates are removed.
///
/// # Errors
///
/// `DegeneratePolygon` when fewer than 3 distinct vertices remain after
/// cleanup, or when the height is non-finite or not positive.
pub fn extrude_footprint(ring: &[LocalPoint], height: f64, base_elevation: f64) -> Result<Mesh> {
    if !height.is_finite() || height <= 0.0 {
        return Err(ForgeError::DegeneratePolygon(format!(
            "extrusion height must be positive and finite, got {height}"
        )));
    }
    if !base_elevation.is_finite() {
        return Err(ForgeError::DegeneratePolygon(
            "base elevation must be finite".into(),
        ));
    }

    let mut ring = clean_ring(ring)?;

    // Normalize to positive signed area in the ground plane so wall normals
    // face outward and cap windings are predictable.
    let area = signed_area(&ring);
    if area.abs() < EPSILON {
        return Err(ForgeError::DegeneratePolygon(
            "footprint has zero enclosed area".into(),
        ));
    }
    if area < 0.0 {
        ring.reverse();
    }

    let n = ring.len();
    let floor = base_elevation as f32;
    let roof = (base_elevation + height) as f32;

    let mut mesh = Mesh::with_capacity(2 * n, n + 2);
    for p in &ring {
        mesh.positions.push([p.x as f32, floor, p.y as f32]);
    }
    for p in &ring {
        mesh.positions.push([p.x as f32, roof, p.y as f32]);
    }

    let u_values = perimeter_uvs(&ring);

    // Wall quads, one per ring edge.
    for i in 0..n {
        let next = (i + 1) % n;
        let edge = ring[next] - ring[i];
        let len = edge.length();
        let normal = if len > EPSILON {
            [(edge.y / len) as f32, 0.0, (-edge.x / len) as f32]
        } else {
            [0.0, 0.0, 0.0]
        };

        let u_curr = u_values[i];
        let u_next = if next == 0 { 1.0 } else { u_values[next] };

        let fi = i as u32;
        let fnext = next as u32;
        let ri = (i + n) as u32;
        let rnext = (next + n) as u32;

        mesh.faces.push(Face::quad(
            [fnext, fi, ri, rnext],
            [[u_next, 0.0], [u_curr, 0.0], [u_curr, 1.0], [u_next, 1.0]],
            normal,
        ));
    }

    // Caps: planar UVs normalized over the footprint bounding box. The
    // floor keeps ring order (downward), the roof reverses it (upward), so
    // both face outward.
    let cap_uvs = planar_uvs(&ring);

    let floor_indices: SmallVec<[u32; 8]> = (0..n as u32).collect();
    mesh.faces.push(Face::ngon(
        &floor_indices,
        &cap_uvs,
        [0.0, -1.0, 0.0],
    ));

    let roof_indices: Vec<u32> = (0..n as u32).rev().map(|i| i + n as u32).collect();
    let roof_uvs: Vec<[f32; 2]> = cap_uvs.iter().rev().copied().collect();
    mesh.faces
        .push(Face::ngon(&roof_indices, &roof_uvs, [0.0, 1.0, 0.0]));

    Ok(mesh)
}

/// Remove consecutive duplicates (and a closing vertex equal to the first).
fn clean_ring(ring: &[LocalPoint]) -> Result<Vec<DVec2>> {
    let mut cleaned: Vec<DVec2> = Vec::with_capacity(ring.len());
    for p in ring {
        if !p.is_finite() {
            return Err(ForgeError::DegeneratePolygon(
                "footprint contains non-finite vertex".into(),
            ));
        }
        let v = DVec2::new(p.x, p.z);
        if let Some(last) = cleaned.last() {
            if last.distance_squared(v) < EPSILON * EPSILON {
                continue;
            }
        }
        cleaned.push(v);
    }

    if cleaned.len() >= 2 {
        let closes = cleaned[0].distance_squared(*cleaned.last().unwrap()) < EPSILON * EPSILON;
        if closes {
            cleaned.pop();
        }
    }

    if cleaned.len() < 3 {
        return Err(ForgeError::DegeneratePolygon(format!(
            "{} distinct vertices after cleanup, need at least 3",
            cleaned.len()
        )));
    }
    Ok(cleaned)
}

fn signed_area(ring: &[DVec2]) -> f64 {
    let mut area = 0.0;
    for i in 0..ring.len() {
        let j = (i + 1) % ring.len();
        area += ring[i].x * ring[j].y - ring[j].x * ring[i].y;
    }
    area * 0.5
}

/// Cumulative perimeter arc-length per vertex, normalized to [0, 1].
fn perimeter_uvs(ring: &[DVec2]) -> Vec<f32> {
    let total: f64 = (0..ring.len())
        .map(|i| ring[i].distance(ring[(i + 1) % ring.len()]))
        .sum();

    let mut cumulative = 0.0;
    let mut u_values = Vec::with_capacity(ring.len());
    for i in 0..ring.len() {
        u_values.push(if total > EPSILON {
            (cumulative / total).clamp(0.0, 1.0) as f32
        } else {
            0.0
        });
        cumulative += ring[i].distance(ring[(i + 1) % ring.len()]);
    }
    u_values
}

/// Bounding-box-normalized planar UVs for cap faces.
fn planar_uvs(ring: &[DVec2]) -> Vec<[f32; 2]> {
    let mut min = DVec2::splat(f64::INFINITY);
    let mut max = DVec2::splat(f64::NEG_INFINITY);
    for &p in ring {
        min = min.min(p);
        max = max.max(p);
    }
    let size = max - min;
    ring.iter()
        .map(|p| {
            let u = if size.x > EPSILON { (p.x - min.x) / size.x } else { 0.0 };
            let v = if size.y > EPSILON { (p.y - min.y) / size.y } else { 0.0 };
            [u as f32, v as f32]
        })
        .collect()
}
