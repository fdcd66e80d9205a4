use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geom::{BezierCurve, ControlPolygon, Curve3, Point3, sample_uniform};

fn random_point(rng: &mut StdRng) -> Point3 {
    Point3::new(
        rng.random_range(-10.0..10.0),
        rng.random_range(-10.0..10.0),
        rng.random_range(-10.0..10.0),
    )
}

#[test]
fn two_point_polygon_samples_straight_line() {
    let a = Point3::new(1.0, -2.0, 0.5);
    let b = Point3::new(4.0, 2.0, -1.5);
    let polygon = ControlPolygon::new(vec![a, b]).expect("valid polygon");
    let samples = polygon.sample(11).expect("sample");

    assert_eq!(samples.len(), 11);
    for (k, p) in samples.points().iter().enumerate() {
        let expected = a.lerp(b, k as f64 / 10.0);
        assert!(p.distance_to(expected) < 1e-12, "sample {k}: {p:?} vs {expected:?}");
    }
}

#[test]
fn sampled_endpoints_match_control_endpoints_exactly() {
    let mut rng = StdRng::seed_from_u64(0x00C0_0E5);
    for degree in 1..=9 {
        let points: Vec<Point3> = (0..=degree).map(|_| random_point(&mut rng)).collect();
        let polygon = ControlPolygon::new(points.clone()).expect("valid polygon");
        for samples in [2, 3, 17, 100] {
            let curve = polygon.sample(samples).expect("sample");
            assert_eq!(curve.len(), samples);
            assert_eq!(curve.start(), points[0]);
            assert_eq!(curve.end(), points[degree]);
        }
    }
}

#[test]
fn samples_stay_inside_control_point_bounds() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        let points: Vec<Point3> = (0..4).map(|_| random_point(&mut rng)).collect();
        let polygon = ControlPolygon::new(points.clone()).expect("valid polygon");
        let min = points.iter().fold(Point3::new(f64::MAX, f64::MAX, f64::MAX), |m, p| {
            Point3::new(m.x.min(p.x), m.y.min(p.y), m.z.min(p.z))
        });
        let max = points.iter().fold(Point3::new(f64::MIN, f64::MIN, f64::MIN), |m, p| {
            Point3::new(m.x.max(p.x), m.y.max(p.y), m.z.max(p.z))
        });

        for p in polygon.sample(33).expect("sample").points() {
            assert!(p.x >= min.x - 1e-9 && p.x <= max.x + 1e-9);
            assert!(p.y >= min.y - 1e-9 && p.y <= max.y + 1e-9);
            assert!(p.z >= min.z - 1e-9 && p.z <= max.z + 1e-9);
        }
    }
}

#[test]
fn reversed_polygon_samples_in_reverse_order() {
    let polygon = ControlPolygon::new(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 2.0, 0.0),
        Point3::new(3.0, 2.0, 1.0),
        Point3::new(4.0, 0.0, 0.0),
    ])
    .expect("valid polygon");
    let forward = polygon.sample(9).expect("sample");
    let backward = polygon.reversed().sample(9).expect("sample");

    for k in 0..9 {
        assert!(forward[k].distance_to(backward[8 - k]) < 1e-12);
    }
}

#[test]
fn cubic_midpoint_matches_de_casteljau() {
    let p = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(1.0, 0.0, 1.0),
    ];
    let polygon = ControlPolygon::new(p.to_vec()).expect("valid polygon");
    let curve = BezierCurve::new(&polygon);

    // (p0 + 3p1 + 3p2 + p3) / 8
    let expected = (p[0] + p[1] * 3.0 + p[2] * 3.0 + p[3]) * 0.125;
    assert!(curve.point_at(0.5).distance_to(expected) < 1e-12);
    assert_eq!(curve.domain(), (0.0, 1.0));
}

#[test]
fn high_degree_curve_stays_finite() {
    let points: Vec<Point3> = (0..=200)
        .map(|k| Point3::new(k as f64, (k as f64 * 0.1).sin(), 0.0))
        .collect();
    let polygon = ControlPolygon::new(points).expect("valid polygon");
    let curve = sample_uniform(&BezierCurve::new(&polygon), 50).expect("sample");

    assert!(curve.points().iter().all(|p| p.is_finite()));
    assert_eq!(curve.start(), Point3::new(0.0, 0.0, 0.0));
    assert_eq!(curve.end().x, 200.0);
    // Uniformly spaced x control points give x(t) = 200·t.
    assert!((curve[25].x - 200.0 * 25.0 / 49.0).abs() < 1e-6);
}

#[test]
fn very_high_degree_curve_stays_finite() {
    // C(1100, 550) alone is beyond f64::MAX.
    let points: Vec<Point3> = (0..=1100).map(|k| Point3::new(k as f64, 1.0, 0.0)).collect();
    let polygon = ControlPolygon::new(points).expect("valid polygon");
    let curve = polygon.sample(5).expect("sample");

    assert!(curve.points().iter().all(|p| p.is_finite()));
    assert_eq!(curve.start(), Point3::new(0.0, 1.0, 0.0));
    assert_eq!(curve.end(), Point3::new(1100.0, 1.0, 0.0));
    for (k, p) in curve.points().iter().enumerate() {
        let t = k as f64 / 4.0;
        assert!((p.x - 1100.0 * t).abs() < 1e-6, "x({t}) = {}", p.x);
        assert!((p.y - 1.0).abs() < 1e-12, "y({t}) = {}", p.y);
        assert_eq!(p.z, 0.0);
    }
}
