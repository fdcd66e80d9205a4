use serde::{Deserialize, Serialize};

/// A polygon face referencing vertices by index.
///
/// Serialized untagged, i.e. as a bare `[a, b, c]` or `[a, b, c, d]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Face {
    Triangle([u32; 3]),
    Quad([u32; 4]),
}

impl Face {
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        match self {
            Face::Triangle(idx) => idx.as_slice(),
            Face::Quad(idx) => idx.as_slice(),
        }
    }

    /// The same face with every index shifted by `offset`.
    #[must_use]
    pub fn offset(self, offset: u32) -> Self {
        match self {
            Face::Triangle(idx) => Face::Triangle(idx.map(|i| i + offset)),
            Face::Quad(idx) => Face::Quad(idx.map(|i| i + offset)),
        }
    }

    /// Directed edges `(a, b)` in winding order.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let idx = self.indices();
        (0..idx.len()).map(move |k| (idx[k], idx[(k + 1) % idx.len()]))
    }
}

/// Face kind emitted for a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FaceTopology {
    Quads,
    #[default]
    Triangles,
}

impl FaceTopology {
    #[must_use]
    pub fn from_triangulate(triangulate: bool) -> Self {
        if triangulate { Self::Triangles } else { Self::Quads }
    }
}

/// Number of faces an S×S grid produces.
#[must_use]
pub fn grid_face_count(size: usize, topology: FaceTopology) -> usize {
    let cells = size.saturating_sub(1).pow(2);
    match topology {
        FaceTopology::Quads => cells,
        FaceTopology::Triangles => cells * 2,
    }
}

/// Largest grid side whose vertex indices all fit in `u32` (65536² − 1 = `u32::MAX`).
pub const MAX_GRID_SIZE: usize = 1 << 16;

/// Quads over a row-major S×S vertex grid.
///
/// Cell `(i, j)` yields `[i·S+j, (i+1)·S+j, (i+1)·S+j+1, i·S+j+1]`. The order is
/// fixed so every quad shares the same winding. Pure index arithmetic; grids
/// smaller than 2×2 have no cells.
///
/// # Panics
///
/// If `size > MAX_GRID_SIZE`; indices would no longer fit in `u32`.
#[must_use]
pub fn grid_quads(size: usize) -> Vec<[u32; 4]> {
    assert!(
        size <= MAX_GRID_SIZE,
        "grid size {size} exceeds the u32 index range (max {MAX_GRID_SIZE})"
    );
    if size < 2 {
        return Vec::new();
    }

    let mut quads = Vec::with_capacity(grid_face_count(size, FaceTopology::Quads));
    let stride = size;
    for i in 0..size - 1 {
        for j in 0..size - 1 {
            let i0 = (i * stride + j) as u32;
            let i1 = ((i + 1) * stride + j) as u32;
            let i2 = ((i + 1) * stride + j + 1) as u32;
            let i3 = (i * stride + j + 1) as u32;
            quads.push([i0, i1, i2, i3]);
        }
    }
    quads
}

/// Split every quad along its 0–2 diagonal into `[0, 1, 2]` and `[0, 2, 3]`,
/// preserving winding.
#[must_use]
pub fn triangulate_quads(quads: &[[u32; 4]]) -> Vec<[u32; 3]> {
    let mut triangles = Vec::with_capacity(quads.len() * 2);
    for &[a, b, c, d] in quads {
        triangles.push([a, b, c]);
        triangles.push([a, c, d]);
    }
    triangles
}

/// Faces over a row-major S×S vertex grid in the requested topology.
#[must_use]
pub fn grid_faces(size: usize, topology: FaceTopology) -> Vec<Face> {
    let quads = grid_quads(size);
    match topology {
        FaceTopology::Quads => quads.into_iter().map(Face::Quad).collect(),
        FaceTopology::Triangles => triangulate_quads(&quads)
            .into_iter()
            .map(Face::Triangle)
            .collect(),
    }
}

/// Flat triangle index buffer for an S×S grid (`[a0, b0, c0, a1, ...]`),
/// the layout GPU-side hosts consume.
#[must_use]
pub fn triangulate_grid(size: usize) -> Vec<u32> {
    triangulate_quads(&grid_quads(size))
        .into_iter()
        .flatten()
        .collect()
}
