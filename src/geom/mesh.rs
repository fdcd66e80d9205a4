use serde::Serialize;

use super::core::Point3;
use super::patch::PatchGrid;
use super::triangulation::{Face, FaceTopology, grid_faces, triangulate_quads};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("vertex {index} has invalid coordinates (NaN/Inf)")]
    NonFiniteVertex { index: usize },
    #[error("face {face} references vertex {index}, mesh has {vertex_count} vertices")]
    IndexOutOfBounds {
        face: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("mesh has {count} vertices, more than u32 indices can address")]
    TooManyVertices { count: usize },
}

/// Vertex and face arrays ready for export or host-side mesh construction.
///
/// For a patch, `vertices` is exactly the flattened [`PatchGrid`] and `faces`
/// is derived from the grid size alone.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MeshData {
    pub vertices: Vec<Point3>,
    pub faces: Vec<Face>,
}

impl MeshData {
    #[must_use]
    pub fn new(vertices: Vec<Point3>, faces: Vec<Face>) -> Self {
        Self { vertices, faces }
    }

    /// Take ownership of a patch grid and index it.
    #[must_use]
    pub fn from_grid(grid: PatchGrid, topology: FaceTopology) -> Self {
        let faces = grid_faces(grid.size(), topology);
        Self {
            vertices: grid.into_points(),
            faces,
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.faces
            .iter()
            .filter(|f| matches!(f, Face::Triangle(_)))
            .count()
    }

    #[must_use]
    pub fn quad_count(&self) -> usize {
        self.faces
            .iter()
            .filter(|f| matches!(f, Face::Quad(_)))
            .count()
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.vertices.iter().any(|p| !p.is_finite())
    }

    /// Returns true if all face indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.vertices.len();
        self.faces
            .iter()
            .flat_map(Face::indices)
            .all(|&i| (i as usize) < n)
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        if u32::try_from(self.vertices.len()).is_err() {
            return Err(MeshError::TooManyVertices {
                count: self.vertices.len(),
            });
        }
        if let Some(index) = self.vertices.iter().position(|p| !p.is_finite()) {
            return Err(MeshError::NonFiniteVertex { index });
        }
        for (face, f) in self.faces.iter().enumerate() {
            if let Some(&index) = f
                .indices()
                .iter()
                .find(|&&i| (i as usize) >= self.vertices.len())
            {
                return Err(MeshError::IndexOutOfBounds {
                    face,
                    index,
                    vertex_count: self.vertices.len(),
                });
            }
        }
        Ok(())
    }

    /// Position buffer as a flat `[x0, y0, z0, x1, ...]` vector.
    #[must_use]
    pub fn positions_flat(&self) -> Vec<f64> {
        self.vertices.iter().flat_map(|p| p.to_array()).collect()
    }

    /// Triangle list index buffer; quads are split along their 0–2 diagonal.
    #[must_use]
    pub fn triangle_indices(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.faces.len() * 6);
        for face in &self.faces {
            match *face {
                Face::Triangle(tri) => out.extend_from_slice(&tri),
                Face::Quad(quad) => {
                    for tri in triangulate_quads(&[quad]) {
                        out.extend_from_slice(&tri);
                    }
                }
            }
        }
        out
    }

    /// Concatenate meshes into one, offsetting face indices.
    pub fn merge(meshes: impl IntoIterator<Item = MeshData>) -> Result<MeshData, MeshError> {
        let mut merged = MeshData::default();
        for mesh in meshes {
            let count = merged.vertices.len() + mesh.vertices.len();
            if u32::try_from(count).is_err() {
                return Err(MeshError::TooManyVertices { count });
            }
            let offset = merged.vertices.len() as u32;
            merged.vertices.extend(mesh.vertices);
            merged
                .faces
                .extend(mesh.faces.into_iter().map(|f| f.offset(offset)));
        }
        Ok(merged)
    }
}
