//! Ribbon (strip) meshes following an ordered path.
//!
//! Used for road carriageways and sidewalks. Cross-section directions at
//! interior points average the incoming and outgoing segments so bends do
//! not produce seams; a lateral side offset shifts the whole ribbon to run
//! parallel to the centerline (sidewalks) without recomputing directions.

use glam::DVec2;

use crate::error::{ForgeError, Result};
use crate::mesh::{Face, Mesh};
use crate::types::{Config, LocalPoint};

const EPSILON: f64 = 1e-9;

/// Build a ribbon of `width` meters centered `side_offset` meters to the
/// left of the path (negative offsets shift right).
///
/// Each path point becomes one cross-section with a left and a right vertex;
/// consecutive cross-sections are stitched into two triangles, so a path of
/// N points yields 2·(N−1) triangles. UVs run 0→1 across the width and
/// accumulate arc-length (in width units) along the path.
///
/// # Errors
///
/// `InsufficientPoints` when the path has fewer than 2 points; `Config`
/// when the width is not positive and finite.
pub fn build_ribbon(path: &[LocalPoint], width: f64, side_offset: f64) -> Result<Mesh> {
    if path.len() < 2 {
        return Err(ForgeError::InsufficientPoints {
            needed: 2,
            got: path.len(),
        });
    }
    if !width.is_finite() || width <= 0.0 {
        return Err(ForgeError::Config(format!(
            "ribbon width must be positive and finite, got {width}"
        )));
    }
    if !side_offset.is_finite() {
        return Err(ForgeError::Config("side offset must be finite".into()));
    }

    let directions = section_directions(path);
    let half = width / 2.0;

    let mut mesh = Mesh::with_capacity(path.len() * 2, (path.len() - 1) * 2);
    let mut along = 0.0f64;

    for (i, point) in path.iter().enumerate() {
        if i > 0 {
            along += path[i - 1].planar_distance(point);
        }
        let dir = directions[i];
        // Left-hand perpendicular in the ground plane.
        let perp = DVec2::new(-dir.y, dir.x);

        let center = DVec2::new(point.x, point.z) + perp * side_offset;
        let left = center + perp * half;
        let right = center - perp * half;

        mesh.positions.push([left.x as f32, point.y as f32, left.y as f32]);
        mesh.positions.push([right.x as f32, point.y as f32, right.y as f32]);

        if i > 0 {
            let v_prev = ((along - path[i - 1].planar_distance(point)) / width) as f32;
            let v_curr = (along / width) as f32;
            let l_prev = ((i - 1) * 2) as u32;
            let r_prev = l_prev + 1;
            let l_curr = (i * 2) as u32;
            let r_curr = l_curr + 1;

            mesh.faces.push(Face::tri(
                [l_prev, l_curr, r_curr],
                [[0.0, v_prev], [0.0, v_curr], [1.0, v_curr]],
                [0.0, 1.0, 0.0],
            ));
            mesh.faces.push(Face::tri(
                [l_prev, r_curr, r_prev],
                [[0.0, v_prev], [1.0, v_curr], [1.0, v_prev]],
                [0.0, 1.0, 0.0],
            ));
        }
    }

    Ok(mesh)
}

/// Meshes for one road centerline: carriageway plus two sidewalks.
#[derive(Debug, Clone)]
pub struct RoadMeshes {
    pub road: Mesh,
    /// Left and right sidewalk, lifted slightly above the carriageway.
    pub sidewalks: [Mesh; 2],
}

/// Build a carriageway ribbon and its two flanking sidewalk ribbons from a
/// single centerline.
pub fn build_road_with_sidewalks(path: &[LocalPoint], config: &Config) -> Result<RoadMeshes> {
    let road = build_ribbon(path, config.road_width, 0.0)?;

    let lane = config.road_width / 2.0 + config.sidewalk_width / 2.0;
    let lifted: Vec<LocalPoint> = path
        .iter()
        .map(|p| LocalPoint::new(p.x, p.y + config.sidewalk_lift, p.z))
        .collect();
    let left = build_ribbon(&lifted, config.sidewalk_width, lane)?;
    let right = build_ribbon(&lifted, config.sidewalk_width, -lane)?;

    Ok(RoadMeshes {
        road,
        sidewalks: [left, right],
    })
}

/// Per-point forward directions: endpoints use their single adjacent
/// segment; interior points use the normalized average of the incoming and
/// outgoing segment directions, which avoids seams at bends.
fn section_directions(path: &[LocalPoint]) -> Vec<DVec2> {
    let n = path.len();
    let segment = |i: usize| -> DVec2 {
        let d = DVec2::new(path[i + 1].x - path[i].x, path[i + 1].z - path[i].z);
        if d.length_squared() > EPSILON {
            d.normalize()
        } else {
            DVec2::ZERO
        }
    };

    let mut directions = Vec::with_capacity(n);
    let mut last_valid = DVec2::X;
    for i in 0..n {
        let dir = if i == 0 {
            segment(0)
        } else if i == n - 1 {
            segment(n - 2)
        } else {
            let avg = segment(i - 1) + segment(i);
            if avg.length_squared() > EPSILON {
                avg.normalize()
            } else {
                // Hairpin: fall back to the incoming segment.
                segment(i - 1)
            }
        };
        if dir.length_squared() > EPSILON {
            last_valid = dir;
            directions.push(dir);
        } else {
            // Zero-length segment: reuse the last usable direction.
            directions.push(last_valid);
        }
    }
    directions
}
