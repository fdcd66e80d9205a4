//! Boundary extraction: flat point lists to per-patch control polygons.
//!
//! The point-file layout stores each boundary curve as four consecutive
//! points `a b c d`. The control polygon is built as `[a, b, d, c]`: the last
//! two points of every group are swapped, so `a` and `c` are the curve's
//! endpoints and `b`/`d` its inner handles. Four consecutive curves bound one
//! patch, in the `c0 c1 c2 c3` roles that [`BoundaryQuad`](super::BoundaryQuad)
//! expects:
//!
//! ```text
//!            c1: p3 ──────────▶ p4
//!            ▲                  ▲
//!        c2  │                  │  c3
//!            │                  │
//!            c0: p1 ──────────▶ p2
//! ```

use super::core::Point3;
use super::curve::{ControlPolygon, CurveError, SampledCurve};

/// Points per boundary curve group in the input layout.
pub const POINTS_PER_CURVE: usize = 4;

/// Boundary curves per Coons patch.
pub const CURVES_PER_PATCH: usize = 4;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BoundaryError {
    #[error("boundary input contains no points")]
    Empty,
    #[error("boundary point count {count} is not a multiple of 4")]
    NotMultipleOfFour { count: usize },
    #[error("boundary input yields {curves} curve(s), a patch needs 4")]
    NotEnoughCurves { curves: usize },
    #[error("boundary input yields {curves} curves, which is not a whole number of patches")]
    IncompletePatch { curves: usize },
    #[error("invalid boundary curve {curve}: {source}")]
    Curve {
        curve: usize,
        #[source]
        source: CurveError,
    },
}

/// The four boundary control polygons of one patch, in `c0 c1 c2 c3` order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundarySet {
    curves: [ControlPolygon; CURVES_PER_PATCH],
}

impl BoundarySet {
    #[must_use]
    pub fn new(curves: [ControlPolygon; CURVES_PER_PATCH]) -> Self {
        Self { curves }
    }

    #[must_use]
    pub fn curves(&self) -> &[ControlPolygon; CURVES_PER_PATCH] {
        &self.curves
    }

    /// Corners `[p1, p2, p3, p4]` as declared by `c0` and `c1`.
    #[must_use]
    pub fn corners(&self) -> [Point3; 4] {
        let [c0, c1, _, _] = &self.curves;
        [c0.start(), c0.end(), c1.start(), c1.end()]
    }

    /// `(start, end)` of each control polygon, in `c0 c1 c2 c3` order.
    #[must_use]
    pub fn endpoints(&self) -> [(Point3, Point3); CURVES_PER_PATCH] {
        self.curves.each_ref().map(|c| (c.start(), c.end()))
    }

    /// Sample all four curves at `samples` parameters.
    ///
    /// The curves are independent; with `parallel` set (and the `parallel`
    /// feature compiled in) they are evaluated on the rayon pool. The result
    /// is identical either way.
    pub fn sample(
        &self,
        samples: usize,
        parallel: bool,
    ) -> Result<[SampledCurve; CURVES_PER_PATCH], CurveError> {
        let [p0, p1, p2, p3] = &self.curves;

        #[cfg(feature = "parallel")]
        if parallel {
            let ((c0, c1), (c2, c3)) = rayon::join(
                || rayon::join(|| p0.sample(samples), || p1.sample(samples)),
                || rayon::join(|| p2.sample(samples), || p3.sample(samples)),
            );
            return Ok([c0?, c1?, c2?, c3?]);
        }
        #[cfg(not(feature = "parallel"))]
        let _ = parallel;

        Ok([
            p0.sample(samples)?,
            p1.sample(samples)?,
            p2.sample(samples)?,
            p3.sample(samples)?,
        ])
    }
}

/// Reorder one raw `a b c d` group into the control polygon `[a, b, d, c]`.
pub fn corner_group_to_polygon(group: [Point3; POINTS_PER_CURVE]) -> Result<ControlPolygon, CurveError> {
    let [a, b, c, d] = group;
    ControlPolygon::new(vec![a, b, d, c])
}

/// Partition `points` into groups of four and build one control polygon per
/// group.
pub fn extract_control_polygons(points: &[Point3]) -> Result<Vec<ControlPolygon>, BoundaryError> {
    if points.is_empty() {
        return Err(BoundaryError::Empty);
    }
    if points.len() % POINTS_PER_CURVE != 0 {
        return Err(BoundaryError::NotMultipleOfFour {
            count: points.len(),
        });
    }

    points
        .chunks_exact(POINTS_PER_CURVE)
        .enumerate()
        .map(|(curve, chunk)| {
            let group = [chunk[0], chunk[1], chunk[2], chunk[3]];
            corner_group_to_polygon(group).map_err(|source| BoundaryError::Curve { curve, source })
        })
        .collect()
}

/// Partition `points` into boundary sets of four curves each.
///
/// A list of `16·k` points yields `k` patches. Fewer than four curves, or a
/// curve count that is not a multiple of four, is malformed input.
pub fn extract_boundary_sets(points: &[Point3]) -> Result<Vec<BoundarySet>, BoundaryError> {
    let polygons = extract_control_polygons(points)?;
    let curves = polygons.len();
    if curves < CURVES_PER_PATCH {
        return Err(BoundaryError::NotEnoughCurves { curves });
    }
    if curves % CURVES_PER_PATCH != 0 {
        return Err(BoundaryError::IncompletePatch { curves });
    }

    let mut sets = Vec::with_capacity(curves / CURVES_PER_PATCH);
    let mut iter = polygons.into_iter();
    while let (Some(c0), Some(c1), Some(c2), Some(c3)) =
        (iter.next(), iter.next(), iter.next(), iter.next())
    {
        sets.push(BoundarySet::new([c0, c1, c2, c3]));
    }

    log::debug!("extracted {} boundary set(s) from {} points", sets.len(), points.len());
    Ok(sets)
}
