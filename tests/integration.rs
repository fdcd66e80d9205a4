use std::fs;
use std::path::PathBuf;

use coons_engine::export::{ExportError, ObjWriter, write_obj_file};
use coons_engine::geom::{BoundaryError, Point3};
use coons_engine::parse::points::{ParseError, parse_points, read_points_file};
use coons_engine::pipeline::{PatchBatch, PatchOptions, PipelineError, build_patches, run_to_sink};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixture() -> Vec<Point3> {
    read_points_file(fixture_path("coons_patch_points.txt")).expect("read fixture")
}

fn scratch_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("coons_engine_it_{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir.join(name)
}

#[test]
fn fixture_builds_default_patch() {
    let points = load_fixture();
    assert_eq!(points.len(), 16);

    let batch = build_patches(&points, &PatchOptions::default()).expect("build patches");
    assert_eq!(batch.patches.len(), 1);

    let patch = &batch.patches[0];
    assert_eq!(patch.grid.size(), 100);
    assert_eq!(patch.mesh.vertex_count(), 100 * 100);
    assert_eq!(patch.mesh.triangle_count(), 2 * 99 * 99);
    assert_eq!(patch.mesh.quad_count(), 0);
    patch.mesh.validate().expect("valid mesh");

    let diag = &patch.diagnostics;
    assert!(diag.max_boundary_deviation < 1e-9);
    assert_eq!(diag.open_edge_count, 4 * 99);
    assert!(diag.is_clean(), "{diag}");

    let corners = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(3.0, 0.0, 0.0),
        Point3::new(0.0, 3.0, 0.0),
        Point3::new(3.0, 3.0, 0.0),
    ];
    assert!(patch.grid.get(0, 0).distance_to(corners[0]) < 1e-12);
    assert!(patch.grid.get(0, 99).distance_to(corners[1]) < 1e-12);
    assert!(patch.grid.get(99, 0).distance_to(corners[2]) < 1e-12);
    assert!(patch.grid.get(99, 99).distance_to(corners[3]) < 1e-12);
}

#[test]
fn fixture_center_balances_opposing_boundaries() {
    let options = PatchOptions {
        samples_per_curve: 11,
        triangulate: false,
        ..PatchOptions::default()
    };
    let batch = build_patches(&load_fixture(), &options).expect("build patches");
    let grid = &batch.patches[0].grid;

    // c0/c1 bulge up by 0.75 at their midpoint, c2/c3 dip by 0.75.
    assert!((grid.get(0, 5).z - 0.75).abs() < 1e-12);
    assert!((grid.get(5, 0).z + 0.75).abs() < 1e-12);
    let center = grid.get(5, 5);
    assert!(center.distance_to(Point3::new(1.5, 1.5, 0.0)) < 1e-12, "{center:?}");
}

#[test]
fn repeated_fixture_builds_are_identical() {
    let options = PatchOptions {
        samples_per_curve: 40,
        ..PatchOptions::default()
    };
    let points = load_fixture();
    let first = build_patches(&points, &options).expect("first build");
    let second = build_patches(&points, &options).expect("second build");

    assert_eq!(first.patches.len(), second.patches.len());
    for (a, b) in first.patches.iter().zip(&second.patches) {
        assert_eq!(a.quad, b.quad);
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.mesh, b.mesh);
    }

    let serial = build_patches(
        &points,
        &PatchOptions {
            parallel: false,
            ..options
        },
    )
    .expect("serial build");
    assert_eq!(serial.patches[0].grid, first.patches[0].grid);
}

#[test]
fn sixteen_identical_points_build_a_collapsed_patch() {
    let p = Point3::new(4.0, -2.0, 7.5);
    let options = PatchOptions {
        samples_per_curve: 10,
        ..PatchOptions::default()
    };
    let batch = build_patches(&[p; 16], &options).expect("collapsed input is not an error");
    let patch = &batch.patches[0];

    assert_eq!(patch.grid.size(), 10);
    for q in patch.grid.points() {
        assert!(q.distance_to(p) < 1e-12, "{q:?}");
    }
    assert!(patch.diagnostics.has_warnings());
    assert_eq!(patch.diagnostics.degenerate_face_count, 2 * 9 * 9);
}

#[test]
fn obj_file_round_trip_and_overwrite_guard() {
    let options = PatchOptions {
        samples_per_curve: 5,
        ..PatchOptions::default()
    };
    let batch = build_patches(&load_fixture(), &options).expect("build patches");
    let mesh = &batch.patches[0].mesh;
    let path = scratch_path("fixture.obj");
    let _ = fs::remove_file(&path);

    write_obj_file(&path, [("fixture", mesh)], false).expect("write obj");
    let text = fs::read_to_string(&path).expect("read obj");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "# OBJ file");
    assert_eq!(lines[1], "o fixture");
    assert_eq!(lines[2], "v 0.0000 0.0000 0.0000");
    assert_eq!(lines.iter().filter(|l| l.starts_with("v ")).count(), 25);
    assert_eq!(lines.iter().filter(|l| l.starts_with("f ")).count(), 32);
    assert!(lines.contains(&"f 1 6 7"));

    let err = write_obj_file(&path, [("fixture", mesh)], false).unwrap_err();
    assert!(matches!(err, ExportError::Exists(_)));
    write_obj_file(&path, [("fixture", mesh)], true).expect("overwrite obj");

    let _ = fs::remove_file(&path);
}

#[test]
fn two_patches_export_as_two_objects() {
    let mut points = load_fixture();
    points.extend(load_fixture().into_iter().map(|p| p + Point3::new(10.0, 0.0, 0.0)));
    let options = PatchOptions {
        samples_per_curve: 3,
        triangulate: false,
        ..PatchOptions::default()
    };
    let batch = build_patches(&points, &options).expect("build patches");
    assert_eq!(batch.patches.len(), 2);

    let mut writer = ObjWriter::new(Vec::new());
    run_to_sink(&batch, "", &mut writer).expect("export");
    let text = String::from_utf8(writer.into_inner()).expect("utf8");

    assert!(text.contains("o patch_0\n"));
    assert!(text.contains("o patch_1\n"));
    assert!(text.contains("\nf 1 4 5 2\n"));
    assert!(text.contains("\nf 10 13 14 11\n"));

    let merged = batch.merged_mesh().expect("merge");
    assert_eq!(merged.vertex_count(), 18);
    assert_eq!(merged.face_count(), 8);
    assert_eq!(batch.diagnostics().face_count, 8);
    assert_eq!(PatchBatch::patch_name("roof", 1, 2), "roof_1");
}

#[test]
fn truncated_point_list_is_malformed() {
    let points = load_fixture();
    let err = build_patches(&points[..15], &PatchOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Boundary(BoundaryError::NotMultipleOfFour { count: 15 })
    ));
}

#[test]
fn parse_errors_carry_line_numbers() {
    let err = parse_points("0 0 0\n1 1\n").unwrap_err();
    assert!(matches!(err, ParseError::MissingCoordinate { line: 2, found: 2 }));

    let missing = read_points_file(fixture_path("does_not_exist.txt")).unwrap_err();
    assert!(matches!(missing, ParseError::Io(_)));
}
