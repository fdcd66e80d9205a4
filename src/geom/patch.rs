//! Bilinearly blended Coons patches over sampled boundary curves.
//!
//! Layout of a [`BoundaryQuad`] (grid row `i` follows `u`, column `j`
//! follows `v`):
//!
//! ```text
//!   i = S-1   p3 ──── c1 ────▶ p4
//!             ▲                ▲
//!             c2               c3
//!             │                │
//!   i = 0     p1 ──── c0 ────▶ p2
//!           j = 0            j = S-1
//! ```
//!
//! Boundary curves are indexed by sample, never re-evaluated: `c0`/`c1` are
//! read at column `j`, `c2`/`c3` at row `i`. They must therefore be sampled at
//! the grid resolution S.

use super::core::{Point3, Tolerance};
use super::curve::SampledCurve;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatchError {
    #[error("boundary curves differ in length: {lengths:?}")]
    CurveLengthMismatch { lengths: [usize; 4] },
    #[error("boundary curves have {actual} samples but the grid resolution is {expected}")]
    ResolutionMismatch { expected: usize, actual: usize },
    #[error("{edge} is off its corner by {gap} (tolerance {tolerance})")]
    CornerMismatch {
        edge: &'static str,
        gap: f64,
        tolerance: f64,
    },
    #[error("corner tolerance must be finite and non-negative, got {eps}")]
    InvalidTolerance { eps: f64 },
}

/// Four sampled boundary curves sharing four corners.
///
/// Invariants (checked at construction):
/// - all curves have the same sample count S ≥ 2;
/// - `c0` runs p1 → p2, `c1` runs p3 → p4, `c2` runs p1 → p3, `c3` runs p2 → p4,
///   each endpoint within the corner tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryQuad {
    curves: [SampledCurve; 4],
    corners: [Point3; 4],
}

impl BoundaryQuad {
    /// Build a quad whose corners are taken from the endpoints of `c0` and `c1`.
    pub fn new(curves: [SampledCurve; 4], tol: Tolerance) -> Result<Self, PatchError> {
        let [c0, c1, _, _] = &curves;
        let corners = [c0.start(), c0.end(), c1.start(), c1.end()];
        Self::with_corners(curves, corners, tol)
    }

    /// Build a quad with explicitly declared corners `[p1, p2, p3, p4]`.
    pub fn with_corners(
        curves: [SampledCurve; 4],
        corners: [Point3; 4],
        tol: Tolerance,
    ) -> Result<Self, PatchError> {
        if !tol.is_valid() {
            return Err(PatchError::InvalidTolerance { eps: tol.eps });
        }

        let lengths = [
            curves[0].len(),
            curves[1].len(),
            curves[2].len(),
            curves[3].len(),
        ];
        if lengths.iter().any(|&len| len != lengths[0]) {
            return Err(PatchError::CurveLengthMismatch { lengths });
        }

        let ends = curves.each_ref().map(|c| (c.start(), c.end()));
        check_corners(ends, corners, tol)?;

        Ok(Self { curves, corners })
    }

    /// Sample count S shared by all four curves.
    #[must_use]
    pub fn resolution(&self) -> usize {
        self.curves[0].len()
    }

    #[must_use]
    pub fn curves(&self) -> &[SampledCurve; 4] {
        &self.curves
    }

    /// Corners `[p1, p2, p3, p4]`.
    #[must_use]
    pub fn corners(&self) -> [Point3; 4] {
        self.corners
    }
}

/// Check the `(start, end)` points of `c0..c3` against corners `[p1, p2, p3, p4]`.
///
/// Works on anything with endpoints, so control polygons can be rejected
/// before they are sampled. The first endpoint outside `tol` is reported.
pub fn check_corners(
    ends: [(Point3, Point3); 4],
    corners: [Point3; 4],
    tol: Tolerance,
) -> Result<(), PatchError> {
    if !tol.is_valid() {
        return Err(PatchError::InvalidTolerance { eps: tol.eps });
    }

    let [(c0s, c0e), (c1s, c1e), (c2s, c2e), (c3s, c3e)] = ends;
    let [p1, p2, p3, p4] = corners;
    let checks = [
        ("c0 start (p1)", c0s, p1),
        ("c0 end (p2)", c0e, p2),
        ("c1 start (p3)", c1s, p3),
        ("c1 end (p4)", c1e, p4),
        ("c2 start (p1)", c2s, p1),
        ("c2 end (p3)", c2e, p3),
        ("c3 start (p2)", c3s, p2),
        ("c3 end (p4)", c3e, p4),
    ];
    for (edge, endpoint, corner) in checks {
        if !tol.points_match(endpoint, corner) {
            return Err(PatchError::CornerMismatch {
                edge,
                gap: endpoint.distance_to(corner),
                tolerance: tol.eps,
            });
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// PatchGrid
// ─────────────────────────────────────────────────────────────────────────────

/// Square S×S grid of surface points, row-major (`i` outer, `j` inner).
#[derive(Debug, Clone, PartialEq)]
pub struct PatchGrid {
    size: usize,
    points: Vec<Point3>,
}

impl PatchGrid {
    /// Side length S.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn into_points(self) -> Vec<Point3> {
        self.points
    }

    /// Node at row `i`, column `j`. Panics if either index is `>= size`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Point3 {
        assert!(i < self.size && j < self.size, "grid index ({i}, {j}) out of range");
        self.points[i * self.size + j]
    }

    #[must_use]
    pub fn row(&self, i: usize) -> &[Point3] {
        &self.points[i * self.size..(i + 1) * self.size]
    }

    pub fn column(&self, j: usize) -> impl Iterator<Item = Point3> + '_ {
        self.points.iter().skip(j).step_by(self.size).copied()
    }
}

/// Coons-blend `quad` into an S×S grid, S being the quad's own resolution.
pub fn coons_patch_grid(quad: &BoundaryQuad) -> PatchGrid {
    blend_grid(quad, false)
}

/// Coons-blend `quad` into a `resolution`×`resolution` grid.
///
/// Fails with [`PatchError::ResolutionMismatch`] when the boundary curves were
/// sampled at a different resolution. With `parallel` set (and the `parallel`
/// feature compiled in) grid rows are filled on the rayon pool; the output is
/// identical either way.
pub fn coons_patch_grid_with_resolution(
    quad: &BoundaryQuad,
    resolution: usize,
    parallel: bool,
) -> Result<PatchGrid, PatchError> {
    if quad.resolution() != resolution {
        return Err(PatchError::ResolutionMismatch {
            expected: resolution,
            actual: quad.resolution(),
        });
    }
    Ok(blend_grid(quad, parallel))
}

fn blend_grid(quad: &BoundaryQuad, parallel: bool) -> PatchGrid {
    let size = quad.resolution();
    let mut points = vec![Point3::ORIGIN; size * size];

    let fill_row = |(i, row): (usize, &mut [Point3])| {
        for (j, slot) in row.iter_mut().enumerate() {
            *slot = coons_point(quad, i, j);
        }
    };

    #[cfg(feature = "parallel")]
    if parallel {
        points.par_chunks_mut(size).enumerate().for_each(fill_row);
        log::debug!("coons patch: blended {size}x{size} grid in parallel");
        return PatchGrid { size, points };
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    points.chunks_mut(size).enumerate().for_each(fill_row);
    log::debug!("coons patch: blended {size}x{size} grid");
    PatchGrid { size, points }
}

/// Parameter of sample `k` on a curve with `size` samples; exact at both ends.
fn grid_param(k: usize, size: usize) -> f64 {
    let last = size - 1;
    if k == last { 1.0 } else { k as f64 / last as f64 }
}

/// S(u, v) = R1 + R2 − R3 at grid node (i, j).
fn coons_point(quad: &BoundaryQuad, i: usize, j: usize) -> Point3 {
    let size = quad.resolution();
    let [c0, c1, c2, c3] = &quad.curves;
    let [p1, p2, p3, p4] = quad.corners;

    let u = grid_param(i, size);
    let v = grid_param(j, size);
    let su = 1.0 - u;
    let sv = 1.0 - v;

    // Ruled blend between c0 (u = 0) and c1 (u = 1).
    let r1 = Point3::weighted_sum([(c0[j], su), (c1[j], u)]);
    // Ruled blend between c2 (v = 0) and c3 (v = 1).
    let r2 = Point3::weighted_sum([(c2[i], sv), (c3[i], v)]);
    // Bilinear corner correction.
    let r3 = Point3::weighted_sum([
        (p1, su * sv),
        (p2, su * v),
        (p3, u * sv),
        (p4, u * v),
    ]);

    r1 + r2 - r3
}
