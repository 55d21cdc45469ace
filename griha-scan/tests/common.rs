//! Test utilities for griha-scan integration tests.
//!
//! Helpers build engines on temporary property files and generate wall
//! segments for common room shapes.

#![allow(dead_code)]

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use griha_scan::{
    GrihaConfig, Point2D, PropertyEngine, RoomBoundary, RoomId, RoomKind, ScanMethod, Segment,
};

/// Engine with a freshly created property inside `dir`.
pub fn engine_in(dir: &tempfile::TempDir) -> PropertyEngine {
    let mut engine = PropertyEngine::new(GrihaConfig::default());
    engine
        .create_property(property_path(dir))
        .expect("create property");
    engine
}

/// Default property file location inside `dir`.
pub fn property_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("property.rugsfile")
}

/// Corners of an axis-aligned rectangle, counter-clockwise from (x, y).
pub fn rectangle_corners(x: f32, y: f32, width: f32, height: f32) -> Vec<Point2D> {
    vec![
        Point2D::new(x, y),
        Point2D::new(x + width, y),
        Point2D::new(x + width, y + height),
        Point2D::new(x, y + height),
    ]
}

/// L-shaped room: 5 m × 3 m with a 2 m × 2 m wing (19 m²).
pub fn l_shape_corners() -> Vec<Point2D> {
    vec![
        Point2D::new(0.0, 0.0),
        Point2D::new(5.0, 0.0),
        Point2D::new(5.0, 3.0),
        Point2D::new(2.0, 3.0),
        Point2D::new(2.0, 5.0),
        Point2D::new(0.0, 5.0),
    ]
}

/// Exact walls walking `corners` and back to the first one.
pub fn walls(corners: &[Point2D]) -> Vec<Segment> {
    let n = corners.len();
    (0..n)
        .map(|i| Segment::between(corners[i], corners[(i + 1) % n]))
        .collect()
}

/// Walls with every corner jittered by up to `noise` meters.
///
/// Consecutive walls share their jittered corner except the last, which
/// ends on an independently jittered copy of the start.
pub fn noisy_walls(corners: &[Point2D], noise: f32, seed: u64) -> Vec<Segment> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut jitter = |p: Point2D| {
        Point2D::new(
            p.x + rng.gen_range(-noise..noise),
            p.y + rng.gen_range(-noise..noise),
        )
    };

    let mut measured: Vec<Point2D> = corners.iter().map(|c| jitter(*c)).collect();
    measured.push(jitter(corners[0]));

    measured
        .windows(2)
        .map(|pair| Segment::between(pair[0], pair[1]))
        .collect()
}

/// Add a room and scan it with exact walls around `corners`.
pub fn scan_room(
    engine: &PropertyEngine,
    name: &str,
    floor: &str,
    kind: RoomKind,
    corners: &[Point2D],
) -> RoomId {
    let room = engine.add_room(name, floor, kind).expect("add room");
    let mut session = engine
        .start_scan(room, ScanMethod::WallTouch)
        .expect("start scan");
    for segment in walls(corners) {
        session.feed(segment).expect("feed");
    }
    session.commit().expect("commit");
    room
}

/// Interior angle sum of a boundary in degrees.
pub fn angle_sum_deg(boundary: &RoomBoundary) -> f32 {
    boundary.interior_angles().iter().sum::<f32>().to_degrees()
}

/// Shoelace area of exact corners (m²).
pub fn polygon_area(corners: &[Point2D]) -> f32 {
    let n = corners.len();
    (0..n)
        .map(|i| corners[i].cross(&corners[(i + 1) % n]))
        .sum::<f32>()
        .abs()
        / 2.0
}
