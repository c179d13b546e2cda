//! Mesh descriptors handed to the downstream authoring tool.
//!
//! Vertices are shared positions; each face carries its own outward normal
//! and per-corner UVs, the layout the authoring collaborator ingests
//! directly. Triangles and quads store their indices inline; polygon caps
//! spill as n-gons.

pub mod extrude;
pub mod ribbon;

use smallvec::SmallVec;

use crate::error::{ForgeError, Result};

pub use extrude::extrude_footprint;
pub use ribbon::{RoadMeshes, build_ribbon, build_road_with_sidewalks};

/// One polygon face: vertex indices, matching per-corner UVs, and a single
/// outward face normal.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub indices: SmallVec<[u32; 4]>,
    pub uvs: SmallVec<[[f32; 2]; 4]>,
    pub normal: [f32; 3],
}

impl Face {
    pub fn tri(indices: [u32; 3], uvs: [[f32; 2]; 3], normal: [f32; 3]) -> Self {
        Self {
            indices: SmallVec::from_slice(&indices),
            uvs: SmallVec::from_slice(&uvs),
            normal,
        }
    }

    pub fn quad(indices: [u32; 4], uvs: [[f32; 2]; 4], normal: [f32; 3]) -> Self {
        Self {
            indices: SmallVec::from_slice(&indices),
            uvs: SmallVec::from_slice(&uvs),
            normal,
        }
    }

    pub fn ngon(indices: &[u32], uvs: &[[f32; 2]], normal: [f32; 3]) -> Self {
        Self {
            indices: SmallVec::from_slice(indices),
            uvs: SmallVec::from_slice(uvs),
            normal,
        }
    }

    pub fn is_triangle(&self) -> bool {
        self.indices.len() == 3
    }

    pub fn is_quad(&self) -> bool {
        self.indices.len() == 4
    }

    /// Number of triangles this face fans out to.
    pub fn triangle_count(&self) -> usize {
        self.indices.len().saturating_sub(2)
    }
}

/// Mesh container produced by the extruder and the ribbon builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_capacity: usize, face_capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_capacity),
            faces: Vec::with_capacity(face_capacity),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn quad_count(&self) -> usize {
        self.faces.iter().filter(|f| f.is_quad()).count()
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(Face::triangle_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.faces.is_empty()
    }

    /// Fan-triangulate all faces into a flat index buffer, preserving each
    /// face's winding.
    pub fn triangulated_indices(&self) -> Vec<u32> {
        let mut indices = Vec::with_capacity(self.triangle_count() * 3);
        for face in &self.faces {
            let anchor = face.indices[0];
            for pair in face.indices[1..].windows(2) {
                indices.extend_from_slice(&[anchor, pair[0], pair[1]]);
            }
        }
        indices
    }

    /// Check the structural invariants: finite positions, every face index
    /// in range, per-corner UV counts matching index counts.
    pub fn validate(&self) -> Result<()> {
        for (i, p) in self.positions.iter().enumerate() {
            if !p.iter().all(|c| c.is_finite()) {
                return Err(ForgeError::DegeneratePolygon(format!(
                    "vertex {i} has non-finite position"
                )));
            }
        }
        let limit = self.positions.len() as u32;
        for (i, face) in self.faces.iter().enumerate() {
            if face.indices.len() < 3 {
                return Err(ForgeError::DegeneratePolygon(format!(
                    "face {i} has fewer than 3 indices"
                )));
            }
            if face.uvs.len() != face.indices.len() {
                return Err(ForgeError::DegeneratePolygon(format!(
                    "face {i} has {} UVs for {} indices",
                    face.uvs.len(),
                    face.indices.len()
                )));
            }
            if let Some(&bad) = face.indices.iter().find(|&&idx| idx >= limit) {
                return Err(ForgeError::DegeneratePolygon(format!(
                    "face {i} references vertex {bad}, mesh has {limit}"
                )));
            }
        }
        Ok(())
    }
}
