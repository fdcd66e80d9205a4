mod boundary;
mod core;
mod curve;
mod diagnostics;
mod mesh;
mod metrics;
mod patch;
mod triangulation;

pub use boundary::{
    BoundaryError, BoundarySet, CURVES_PER_PATCH, POINTS_PER_CURVE, corner_group_to_polygon,
    extract_boundary_sets, extract_control_polygons,
};
pub use self::core::{Point3, Tolerance};
pub use curve::{
    BezierCurve, ControlPolygon, Curve3, CurveError, SampledCurve, binomial_row, log_binomial_row,
    sample_uniform,
};
pub use diagnostics::{PatchDiagnostics, analyze_mesh, boundary_deviation};
pub use mesh::{MeshData, MeshError};
pub use metrics::{PatchMetrics, PatchTimingReport, TimingBucket};
pub use patch::{
    BoundaryQuad, PatchError, PatchGrid, check_corners, coons_patch_grid,
    coons_patch_grid_with_resolution,
};
pub use triangulation::{
    Face, FaceTopology, MAX_GRID_SIZE, grid_face_count, grid_faces, grid_quads, triangulate_grid,
    triangulate_quads,
};

#[cfg(test)]
mod tests;
