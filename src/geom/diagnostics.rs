//! Patch diagnostics.
//!
//! Collected after a patch is blended and indexed, and used for:
//!
//! - Validating mesh topology (manifold, consistent winding, expected border)
//! - Checking that the grid really interpolates its boundary curves
//! - Reporting collapsed geometry (zero-area faces) without failing the build
//! - Performance profiling (timing buckets)
//!
//! # Example
//!
//! ```ignore
//! use coons_engine::pipeline::{PatchOptions, build_patches};
//!
//! let output = build_patches(&points, &PatchOptions::default())?;
//! for patch in &output.patches {
//!     println!("{}", patch.diagnostics.summary());
//! }
//! ```

use std::collections::HashMap;
use std::fmt;

use super::core::{Point3, Tolerance};
use super::mesh::MeshData;
use super::patch::{BoundaryQuad, PatchGrid};

/// Topology and fit report for one patch mesh (or several, merged).
///
/// # Topology Metrics
///
/// - `open_edge_count`: Edges with a single adjacent face. An S×S patch has
///   exactly `4·(S − 1)` of them, its border.
/// - `non_manifold_edge_count`: Edges shared by more than two faces.
/// - `winding_conflict_count`: Edges traversed twice in the same direction,
///   i.e. neighbouring faces with opposite normals.
///
/// # Geometry Metrics
///
/// - `degenerate_face_count`: Faces whose area is below tolerance.
/// - `max_boundary_deviation`: Largest distance between the grid border and
///   the input boundary samples.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PatchDiagnostics {
    /// Total number of vertices in the final mesh.
    pub vertex_count: usize,

    /// Total number of faces in the final mesh.
    pub face_count: usize,

    pub quad_count: usize,

    pub triangle_count: usize,

    /// Number of open (border) edges.
    pub open_edge_count: usize,

    /// Number of edges shared by more than two faces.
    pub non_manifold_edge_count: usize,

    /// Number of edges traversed twice in the same direction.
    pub winding_conflict_count: usize,

    /// Number of zero-area faces (collapsed boundaries produce these).
    pub degenerate_face_count: usize,

    /// Largest distance between grid border nodes and boundary samples.
    pub max_boundary_deviation: f64,

    /// Optional timing breakdown; only populated with the `patch_metrics`
    /// feature on non-WASM targets.
    pub timing: Option<super::metrics::PatchTimingReport>,

    /// Human-readable warnings, e.g. "patch has 9 degenerate faces".
    pub warnings: Vec<String>,
}

impl PatchDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no edge is shared by more than two faces.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// Returns `true` if every shared edge is traversed in opposite directions
    /// by its two faces.
    #[must_use]
    pub fn has_consistent_winding(&self) -> bool {
        self.winding_conflict_count == 0
    }

    /// Returns `true` if the mesh is manifold, consistently wound, free of
    /// degenerate faces and carries no warnings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.is_manifold()
            && self.has_consistent_winding()
            && self.degenerate_face_count == 0
            && self.warnings.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Merges another report into this one. Counts are summed, the boundary
    /// deviation takes the maximum, warnings are appended.
    ///
    /// `timing` from `other` is ignored; use a parent `PatchMetrics` to track
    /// timing across patches.
    pub fn merge(&mut self, other: &PatchDiagnostics) {
        self.vertex_count += other.vertex_count;
        self.face_count += other.face_count;
        self.quad_count += other.quad_count;
        self.triangle_count += other.triangle_count;
        self.open_edge_count += other.open_edge_count;
        self.non_manifold_edge_count += other.non_manifold_edge_count;
        self.winding_conflict_count += other.winding_conflict_count;
        self.degenerate_face_count += other.degenerate_face_count;
        self.max_boundary_deviation = self.max_boundary_deviation.max(other.max_boundary_deviation);
        self.warnings.extend(other.warnings.iter().cloned());
    }

    /// Returns a short summary string suitable for logging.
    ///
    /// Format: `"V:{vertices} F:{faces} [issues...]"`
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("V:{} F:{}", self.vertex_count, self.face_count)];

        if self.quad_count > 0 {
            parts.push(format!("quads:{}", self.quad_count));
        }
        if self.triangle_count > 0 {
            parts.push(format!("tris:{}", self.triangle_count));
        }
        parts.push(format!("open:{}", self.open_edge_count));
        if self.non_manifold_edge_count > 0 {
            parts.push(format!("non-manifold:{}", self.non_manifold_edge_count));
        }
        if self.winding_conflict_count > 0 {
            parts.push(format!("winding:{}", self.winding_conflict_count));
        }
        if self.degenerate_face_count > 0 {
            parts.push(format!("degenerate:{}", self.degenerate_face_count));
        }
        parts.push(format!("dev:{:.3e}", self.max_boundary_deviation));

        parts.join(" ")
    }
}

impl fmt::Display for PatchDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Patch Diagnostics:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(
            f,
            "  Faces: {} ({} quads, {} triangles)",
            self.face_count, self.quad_count, self.triangle_count
        )?;
        writeln!(f, "  Open edges: {}", self.open_edge_count)?;
        writeln!(f, "  Boundary deviation: {:e}", self.max_boundary_deviation)?;

        if self.non_manifold_edge_count > 0 || self.winding_conflict_count > 0 {
            writeln!(f, "  Topology issues:")?;
            if self.non_manifold_edge_count > 0 {
                writeln!(f, "    - Non-manifold edges: {}", self.non_manifold_edge_count)?;
            }
            if self.winding_conflict_count > 0 {
                writeln!(f, "    - Winding conflicts: {}", self.winding_conflict_count)?;
            }
        }

        if self.degenerate_face_count > 0 {
            writeln!(f, "  Degenerate faces: {}", self.degenerate_face_count)?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }

        if let Some(ref timing) = self.timing {
            writeln!(f, "  Timing: {} ms total", timing.total_ms())?;
        }

        let status = if self.is_clean() {
            "CLEAN"
        } else if self.is_manifold() && self.has_consistent_winding() {
            "VALID (with warnings)"
        } else {
            "ISSUES DETECTED"
        };
        writeln!(f, "  Status: {status}")?;

        Ok(())
    }
}

/// Inspect mesh topology and face areas.
#[must_use]
pub fn analyze_mesh(mesh: &MeshData, tol: Tolerance) -> PatchDiagnostics {
    let mut diag = PatchDiagnostics {
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        quad_count: mesh.quad_count(),
        triangle_count: mesh.triangle_count(),
        ..PatchDiagnostics::default()
    };

    let (open, non_manifold, winding) = count_edge_topology(mesh);
    diag.open_edge_count = open;
    diag.non_manifold_edge_count = non_manifold;
    diag.winding_conflict_count = winding;

    diag.degenerate_face_count = mesh
        .faces
        .iter()
        .filter(|face| {
            let pts: Vec<Point3> = face
                .indices()
                .iter()
                .filter_map(|&i| mesh.vertices.get(i as usize).copied())
                .collect();
            polygon_area(&pts) <= tol.eps_squared()
        })
        .count();

    if diag.degenerate_face_count > 0 {
        diag.add_warning(format!(
            "patch has {} degenerate faces",
            diag.degenerate_face_count
        ));
    }
    if !diag.is_manifold() {
        diag.add_warning("patch mesh has non-manifold edges");
    }
    if !diag.has_consistent_winding() {
        diag.add_warning("patch mesh has inconsistent face winding");
    }

    diag
}

/// Largest distance between the grid's border and the quad's boundary
/// samples: row 0 vs `c0`, row S−1 vs `c1`, column 0 vs `c2`, column S−1 vs `c3`.
#[must_use]
pub fn boundary_deviation(grid: &PatchGrid, quad: &BoundaryQuad) -> f64 {
    let size = grid.size();
    let [c0, c1, c2, c3] = quad.curves();

    let rows = grid
        .row(0)
        .iter()
        .zip(c0.points())
        .chain(grid.row(size - 1).iter().zip(c1.points()))
        .map(|(a, b)| a.distance_to(*b));
    let cols = grid
        .column(0)
        .zip(c2.points())
        .chain(grid.column(size - 1).zip(c3.points()))
        .map(|(a, b)| a.distance_to(*b));

    rows.chain(cols).fold(0.0, f64::max)
}

/// Returns `(open, non_manifold, winding_conflicts)` edge counts.
fn count_edge_topology(mesh: &MeshData) -> (usize, usize, usize) {
    // Undirected edge -> (forward uses, backward uses)
    let mut edges: HashMap<(u32, u32), (usize, usize)> = HashMap::new();
    for face in &mesh.faces {
        for (a, b) in face.edges() {
            let entry = edges.entry((a.min(b), a.max(b))).or_insert((0, 0));
            if a < b {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
    }

    let mut open = 0;
    let mut non_manifold = 0;
    let mut winding = 0;
    for &(fwd, bwd) in edges.values() {
        match fwd + bwd {
            1 => open += 1,
            2 => {
                if fwd != 1 {
                    winding += 1;
                }
            }
            _ => non_manifold += 1,
        }
    }
    (open, non_manifold, winding)
}

/// Area of a planar-ish polygon via its fan cross-product sum.
fn polygon_area(pts: &[Point3]) -> f64 {
    if pts.len() < 3 {
        return 0.0;
    }
    let origin = pts[0];
    let mut n = [0.0_f64; 3];
    for w in pts[1..].windows(2) {
        let a = w[0] - origin;
        let b = w[1] - origin;
        n[0] += a.y * b.z - a.z * b.y;
        n[1] += a.z * b.x - a.x * b.z;
        n[2] += a.x * b.y - a.y * b.x;
    }
    0.5 * (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt()
}
