use super::core::Point3;

/// A parametric curve evaluated over its domain (default `[0, 1]`).
pub trait Curve3 {
    fn point_at(&self, t: f64) -> Point3;

    #[must_use]
    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("control polygon requires at least 2 points, got {count}")]
    NotEnoughControlPoints { count: usize },
    #[error("control point {index} is not finite")]
    NonFiniteControlPoint { index: usize },
    #[error("curve sampling requires at least 2 samples, got {samples}")]
    NotEnoughSamples { samples: usize },
}

// ─────────────────────────────────────────────────────────────────────────────
// ControlPolygon
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered control points of a degree-n Bezier curve (n + 1 points).
///
/// The order defines the parameterization direction: `t = 0` sits on the
/// first point and `t = 1` on the last.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPolygon {
    points: Vec<Point3>,
}

impl ControlPolygon {
    pub fn new(points: Vec<Point3>) -> Result<Self, CurveError> {
        if points.len() < 2 {
            return Err(CurveError::NotEnoughControlPoints {
                count: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(CurveError::NonFiniteControlPoint { index });
        }
        Ok(Self { points })
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn degree(&self) -> usize {
        self.points.len() - 1
    }

    #[must_use]
    pub fn start(&self) -> Point3 {
        self.points[0]
    }

    #[must_use]
    pub fn end(&self) -> Point3 {
        self.points[self.points.len() - 1]
    }

    /// The same curve traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            points: self.points.iter().rev().copied().collect(),
        }
    }

    /// Sample the Bezier curve defined by this polygon at `samples` uniform
    /// parameters in `[0, 1]`, both endpoints included.
    pub fn sample(&self, samples: usize) -> Result<SampledCurve, CurveError> {
        sample_uniform(&BezierCurve::new(self), samples)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BezierCurve
// ─────────────────────────────────────────────────────────────────────────────

/// Degrees up to this evaluate `C(n, i) · tⁱ · (1 − t)ⁿ⁻ⁱ` directly. Beyond it
/// the middle binomials and the matching power products drift towards the
/// ends of the f64 range (`C(n, n/2)` overflows just past n = 1029), so the
/// weights are formed in log space instead.
const DIRECT_MAX_DEGREE: usize = 512;

/// Bernstein-form Bezier curve of arbitrary degree.
///
/// Binomial weights are computed once per curve, so sampling a polygon at S
/// parameters costs O(S·n) instead of recomputing `C(n, i)` per sample.
#[derive(Debug, Clone)]
pub struct BezierCurve<'a> {
    points: &'a [Point3],
    weights: BinomialWeights,
}

#[derive(Debug, Clone)]
enum BinomialWeights {
    /// `C(n, i)` as plain values.
    Direct(Vec<f64>),
    /// `ln C(n, i)`.
    Log(Vec<f64>),
}

impl<'a> BezierCurve<'a> {
    #[must_use]
    pub fn new(polygon: &'a ControlPolygon) -> Self {
        let n = polygon.degree();
        let weights = if n <= DIRECT_MAX_DEGREE {
            BinomialWeights::Direct(binomial_row(n))
        } else {
            BinomialWeights::Log(log_binomial_row(n))
        };
        Self {
            points: polygon.points(),
            weights,
        }
    }

    #[must_use]
    pub fn degree(&self) -> usize {
        self.points.len() - 1
    }
}

impl Curve3 for BezierCurve<'_> {
    fn point_at(&self, t: f64) -> Point3 {
        let n = self.degree();
        // Endpoints are returned verbatim so sampled curves share corners bit-exactly.
        if t <= 0.0 {
            return self.points[0];
        }
        if t >= 1.0 {
            return self.points[n];
        }

        match &self.weights {
            BinomialWeights::Direct(binomials) => bernstein_direct(self.points, binomials, t),
            BinomialWeights::Log(ln_binomials) => bernstein_log(self.points, ln_binomials, t),
        }
    }
}

fn bernstein_direct(points: &[Point3], binomials: &[f64], t: f64) -> Point3 {
    let n = points.len() - 1;
    let s = 1.0 - t;
    Point3::weighted_sum(
        points
            .iter()
            .zip(binomials)
            .enumerate()
            .map(|(i, (&p, &c))| (p, c * t.powi(i as i32) * s.powi((n - i) as i32))),
    )
}

/// Bernstein sum with weights `exp(ln C(n, i) + i·ln t + (n − i)·ln(1 − t))`,
/// shifted by the largest exponent and renormalised to sum to one. Requires
/// `0 < t < 1`.
fn bernstein_log(points: &[Point3], ln_binomials: &[f64], t: f64) -> Point3 {
    let n = points.len() - 1;
    let (ln_t, ln_s) = (t.ln(), (1.0 - t).ln());
    let exponents: Vec<f64> = ln_binomials
        .iter()
        .enumerate()
        .map(|(i, &lc)| lc + i as f64 * ln_t + (n - i) as f64 * ln_s)
        .collect();
    let peak = exponents.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let weights: Vec<f64> = exponents.iter().map(|e| (e - peak).exp()).collect();
    let total: f64 = weights.iter().sum();
    Point3::weighted_sum(points.iter().zip(&weights).map(|(&p, &w)| (p, w / total)))
}

/// Binomial coefficients `C(n, 0..=n)` as `f64`.
///
/// Entries are exact integers while the multiplicative recurrence
/// `C(n, k + 1) = C(n, k) · (n − k) / (k + 1)` fits in `u128`: every row up to
/// n = 125, and the outer entries of larger rows. Past that point the same
/// recurrence continues in floating point from the last exact value. Middle
/// entries of rows past n = 1029 exceed `f64::MAX` and come out infinite; use
/// [`log_binomial_row`] there.
#[must_use]
pub fn binomial_row(n: usize) -> Vec<f64> {
    let mut row = vec![1.0; n + 1];
    let mut exact: Option<u128> = Some(1);
    let mut approx = 1.0_f64;

    for k in 0..n / 2 {
        let num = (n - k) as u128;
        let den = k as u128 + 1;
        exact = exact.and_then(|c| c.checked_mul(num)).map(|c| c / den);
        approx = match exact {
            Some(c) => c as f64,
            None => approx * (n - k) as f64 / (k + 1) as f64,
        };
        row[k + 1] = approx;
        row[n - k - 1] = approx;
    }

    row
}

/// Natural logarithms `ln C(n, 0..=n)`, finite for every `n`.
#[must_use]
pub fn log_binomial_row(n: usize) -> Vec<f64> {
    let mut row = vec![0.0; n + 1];
    let mut acc = 0.0_f64;

    for k in 0..n / 2 {
        acc += ((n - k) as f64).ln() - ((k + 1) as f64).ln();
        row[k + 1] = acc;
        row[n - k - 1] = acc;
    }

    row
}

// ─────────────────────────────────────────────────────────────────────────────
// SampledCurve
// ─────────────────────────────────────────────────────────────────────────────

/// A polyline of curve samples at uniform parameters `t_k = k / (len − 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledCurve {
    points: Vec<Point3>,
}

impl SampledCurve {
    /// Wrap pre-sampled points (e.g. produced outside the Bezier evaluator).
    pub fn new(points: Vec<Point3>) -> Result<Self, CurveError> {
        if points.len() < 2 {
            return Err(CurveError::NotEnoughSamples {
                samples: points.len(),
            });
        }
        Ok(Self { points })
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn start(&self) -> Point3 {
        self.points[0]
    }

    #[must_use]
    pub fn end(&self) -> Point3 {
        self.points[self.points.len() - 1]
    }

    #[must_use]
    pub fn into_points(self) -> Vec<Point3> {
        self.points
    }
}

impl std::ops::Index<usize> for SampledCurve {
    type Output = Point3;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

/// Evaluate `curve` at `samples` uniformly spaced parameters across its
/// domain, endpoints included.
pub fn sample_uniform(curve: &impl Curve3, samples: usize) -> Result<SampledCurve, CurveError> {
    if samples < 2 {
        return Err(CurveError::NotEnoughSamples { samples });
    }

    let (a, b) = curve.domain();
    let last = samples - 1;
    let points = (0..samples)
        .map(|k| {
            // k == last must land on b exactly; `last / last` is exactly 1.0.
            let f = k as f64 / last as f64;
            let t = if k == last { b } else { a + (b - a) * f };
            curve.point_at(t)
        })
        .collect();

    Ok(SampledCurve { points })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binomial_rows_match_pascal() {
        assert_eq!(binomial_row(0), vec![1.0]);
        assert_eq!(binomial_row(1), vec![1.0, 1.0]);
        assert_eq!(binomial_row(3), vec![1.0, 3.0, 3.0, 1.0]);
        assert_eq!(binomial_row(4), vec![1.0, 4.0, 6.0, 4.0, 1.0]);
        assert_eq!(binomial_row(5), vec![1.0, 5.0, 10.0, 10.0, 5.0, 1.0]);
    }

    #[test]
    fn binomial_row_is_exact_for_large_factorial_ratios() {
        // 30! overflows u64, the ratio does not.
        let row = binomial_row(30);
        assert_eq!(row[15], 155_117_520.0);
        assert_eq!(row[1], 30.0);
        assert_eq!(row[29], 30.0);
    }

    #[test]
    fn binomial_row_stays_finite_for_high_degree() {
        let row = binomial_row(400);
        assert_eq!(row.len(), 401);
        assert!(row.iter().all(|c| c.is_finite() && *c >= 1.0));
        assert_eq!(row[0], 1.0);
        assert_eq!(row[400], 1.0);
        assert_eq!(row[1], 400.0);
        // Pascal's identity still holds to floating-point precision past the u128 range.
        let prev = binomial_row(399);
        let lhs = row[200];
        let rhs = prev[199] + prev[200];
        assert!(((lhs - rhs) / lhs).abs() < 1e-12);
    }

    #[test]
    fn binomial_row_is_exact_up_to_the_u128_limit() {
        // C(125, 62) = 125! / (62! · 63!), built in u128 then rounded once.
        let row = binomial_row(125);
        let from_logs = log_binomial_row(125)[62].exp();
        assert!(((row[62] - from_logs) / row[62]).abs() < 1e-12);
        assert_eq!(row[62], row[63]);
    }

    #[test]
    fn log_binomial_row_matches_direct_row() {
        let direct = binomial_row(60);
        let logs = log_binomial_row(60);
        assert_eq!(logs[0], 0.0);
        assert_eq!(logs[60], 0.0);
        for (c, lc) in direct.iter().zip(&logs) {
            assert!(((c.ln() - lc) / lc.max(1.0)).abs() < 1e-13, "{c} vs exp({lc})");
        }
        assert!(log_binomial_row(1100).iter().all(|lc| lc.is_finite()));
    }

    #[test]
    fn log_and_direct_bernstein_agree() {
        let points: Vec<Point3> = (0..=40)
            .map(|k| {
                let x = k as f64;
                Point3::new(x, (x * 0.7).cos(), x * x * 0.01)
            })
            .collect();
        let binomials = binomial_row(40);
        let ln_binomials = log_binomial_row(40);
        for t in [1e-3, 0.2, 0.5, 0.77, 0.999] {
            let direct = bernstein_direct(&points, &binomials, t);
            let logged = bernstein_log(&points, &ln_binomials, t);
            assert!(direct.distance_to(logged) < 1e-9, "t = {t}");
        }
    }

    #[test]
    fn bezier_endpoints_are_exact() {
        let polygon = ControlPolygon::new(vec![
            Point3::new(0.1, 0.2, 0.3),
            Point3::new(1.7, -3.0, 2.0),
            Point3::new(4.0, 4.0, -1.0),
            Point3::new(0.3, 0.7, 0.9),
        ])
        .expect("valid polygon");
        let curve = BezierCurve::new(&polygon);
        assert_eq!(curve.point_at(0.0), polygon.start());
        assert_eq!(curve.point_at(1.0), polygon.end());
    }

    #[test]
    fn polygon_rejects_single_point() {
        let err = ControlPolygon::new(vec![Point3::ORIGIN]).unwrap_err();
        assert_eq!(err, CurveError::NotEnoughControlPoints { count: 1 });
        assert!(ControlPolygon::new(Vec::new()).is_err());
    }

    #[test]
    fn polygon_rejects_non_finite_point() {
        let err = ControlPolygon::new(vec![Point3::ORIGIN, Point3::new(f64::NAN, 0.0, 0.0)])
            .unwrap_err();
        assert_eq!(err, CurveError::NonFiniteControlPoint { index: 1 });
    }

    #[test]
    fn reversed_polygon_swaps_endpoints() {
        let polygon = ControlPolygon::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ])
        .expect("valid polygon");
        let rev = polygon.reversed();
        assert_eq!(rev.start(), polygon.end());
        assert_eq!(rev.end(), polygon.start());
        assert_eq!(rev.degree(), 2);
    }

    #[test]
    fn sample_rejects_fewer_than_two_samples() {
        let polygon =
            ControlPolygon::new(vec![Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0)]).expect("valid");
        assert_eq!(
            polygon.sample(1).unwrap_err(),
            CurveError::NotEnoughSamples { samples: 1 }
        );
    }
}
