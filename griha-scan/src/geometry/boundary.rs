//! Closed room outline.
//!
//! A [`RoomBoundary`] can only be built through validation, so every
//! instance is a finite, simple polygon whose interior angles sum to
//! (n-2)·180° within tolerance.

use std::f32::consts::PI;

use crate::core::Point2D;
use crate::core::math::{deg_to_rad, rad_to_deg};

use super::GeometryError;

/// Default interior-angle-sum tolerance (0.5°).
pub const DEFAULT_ANGLE_SUM_TOLERANCE: f32 = 0.5 * PI / 180.0;

/// Distance below which points count as touching a wall (m).
const CONTACT_EPSILON: f32 = 1e-3;

/// Depth at which overlap sample points sit inside a wall (m)
const SAMPLE_DEPTH: f32 = 0.01;

/// Shortest wall a boundary may contain (m).
const MIN_WALL_LENGTH: f32 = 1e-3;

/// Closed polygon describing a room's floor plan.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomBoundary {
    vertices: Vec<Point2D>,
}

impl RoomBoundary {
    /// Validate and wrap `vertices` with the default angle tolerance.
    pub fn new(vertices: Vec<Point2D>) -> Result<Self, GeometryError> {
        Self::with_tolerance(vertices, DEFAULT_ANGLE_SUM_TOLERANCE)
    }

    /// Validate and wrap `vertices`.
    ///
    /// # Arguments
    /// * `vertices` - Corner points in walking order, closing edge implied
    /// * `angle_sum_tolerance` - Allowed deviation of the angle sum (radians)
    pub fn with_tolerance(
        vertices: Vec<Point2D>,
        angle_sum_tolerance: f32,
    ) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewSegments {
                count: vertices.len(),
            });
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(GeometryError::InvalidSegment);
        }

        let boundary = Self { vertices };

        for i in 0..boundary.len() {
            let length = boundary.wall_length(i);
            if length < MIN_WALL_LENGTH {
                return Err(GeometryError::DegenerateSegment { length });
            }
        }

        if boundary.signed_area().abs() < 1e-6 {
            return Err(GeometryError::NotSimple("outline encloses no area".into()));
        }

        if let Some((i, j)) = boundary.first_self_intersection() {
            return Err(GeometryError::NotSimple(format!(
                "wall {} crosses wall {}",
                i, j
            )));
        }

        let expected = (boundary.len() as f32 - 2.0) * PI;
        let actual = boundary.interior_angle_sum();
        if (actual - expected).abs() > angle_sum_tolerance.max(deg_to_rad(1e-3)) {
            return Err(GeometryError::AngleSum {
                expected: rad_to_deg(expected),
                actual: rad_to_deg(actual),
            });
        }

        Ok(boundary)
    }

    /// Corner points in walking order.
    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    /// Number of corners (equal to number of walls).
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Wall `i` as (start, end); wall `n-1` closes back to vertex 0.
    pub fn wall(&self, i: usize) -> Option<(Point2D, Point2D)> {
        if i >= self.len() {
            return None;
        }
        Some((self.vertices[i], self.vertices[(i + 1) % self.len()]))
    }

    /// Iterate over all walls.
    pub fn walls(&self) -> impl Iterator<Item = (Point2D, Point2D)> + '_ {
        (0..self.len()).map(move |i| (self.vertices[i], self.vertices[(i + 1) % self.len()]))
    }

    /// Length of wall `i` (0 for out-of-range indices).
    pub fn wall_length(&self, i: usize) -> f32 {
        self.wall(i).map(|(a, b)| a.distance(&b)).unwrap_or(0.0)
    }

    /// Shoelace area, positive for counter-clockwise outlines.
    pub fn signed_area(&self) -> f32 {
        0.5 * self.walls().map(|(a, b)| a.cross(&b)).sum::<f32>()
    }

    /// Enclosed floor area (m²).
    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    /// Total wall length (m).
    pub fn perimeter(&self) -> f32 {
        self.walls().map(|(a, b)| a.distance(&b)).sum()
    }

    /// Outline runs counter-clockwise.
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Area centroid.
    pub fn centroid(&self) -> Point2D {
        let area = self.signed_area();
        let (mut cx, mut cy) = (0.0f32, 0.0f32);
        for (a, b) in self.walls() {
            let cross = a.cross(&b);
            cx += (a.x + b.x) * cross;
            cy += (a.y + b.y) * cross;
        }
        Point2D::new(cx / (6.0 * area), cy / (6.0 * area))
    }

    /// Axis-aligned bounds as (min, max).
    pub fn bounds(&self) -> (Point2D, Point2D) {
        let mut min = Point2D::new(f32::MAX, f32::MAX);
        let mut max = Point2D::new(f32::MIN, f32::MIN);
        for v in &self.vertices {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
        }
        (min, max)
    }

    /// Interior angle at every corner (radians), reflex corners exceed π.
    pub fn interior_angles(&self) -> Vec<f32> {
        let n = self.len();
        let orientation = if self.is_ccw() { 1.0 } else { -1.0 };
        (0..n)
            .map(|i| {
                let prev = self.vertices[(i + n - 1) % n];
                let here = self.vertices[i];
                let next = self.vertices[(i + 1) % n];
                let turn = turn_angle(here - prev, next - here);
                PI - orientation * turn
            })
            .collect()
    }

    /// Sum of interior angles (radians).
    pub fn interior_angle_sum(&self) -> f32 {
        self.interior_angles().iter().sum()
    }

    /// Outward unit normal of wall `i`.
    pub fn outward_normal(&self, i: usize) -> Option<Point2D> {
        let (a, b) = self.wall(i)?;
        let left = (b - a).normalized().perpendicular();
        Some(if self.is_ccw() { left * -1.0 } else { left })
    }

    /// Point lies inside the outline and not on a wall.
    pub fn contains_strictly(&self, point: Point2D) -> bool {
        self.contains(point) && self.distance_to_walls(point) > CONTACT_EPSILON
    }

    /// Even-odd point-in-polygon test.
    pub fn contains(&self, point: Point2D) -> bool {
        let mut inside = false;
        for (a, b) in self.walls() {
            if (a.y > point.y) != (b.y > point.y) {
                let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if point.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Distance from `point` to the nearest wall.
    pub fn distance_to_walls(&self, point: Point2D) -> f32 {
        self.walls()
            .map(|(a, b)| point_segment_distance(point, a, b))
            .fold(f32::MAX, f32::min)
    }

    /// Interiors intersect.
    ///
    /// Walls that merely touch or are shared between neighbouring rooms do
    /// not count.
    pub fn overlaps(&self, other: &RoomBoundary) -> bool {
        for (a1, a2) in self.walls() {
            for (b1, b2) in other.walls() {
                if segments_cross_properly(a1, a2, b1, b2) {
                    return true;
                }
            }
        }

        self.vertices.iter().any(|v| other.contains_strictly(*v))
            || other.vertices.iter().any(|v| self.contains_strictly(*v))
            || self.wall_samples(other).any(|p| other.contains_strictly(p))
            || other.wall_samples(self).any(|p| self.contains_strictly(p))
    }

    /// Points just inside each wall, one per stretch between places where
    /// `other` meets the wall. Catches overlaps whose outlines only touch.
    fn wall_samples<'a>(&'a self, other: &'a RoomBoundary) -> impl Iterator<Item = Point2D> + 'a {
        (0..self.len()).flat_map(move |i| {
            let (a, b) = self.walls_at(i);
            let ab = b - a;
            let len_sq = ab.dot(&ab).max(f32::EPSILON);
            let inward = self
                .outward_normal(i)
                .map_or(Point2D::ZERO, |n| n * -SAMPLE_DEPTH);

            let mut cuts = vec![0.0, 1.0];
            for (c, d) in other.walls() {
                for v in [c, d] {
                    if point_segment_distance(v, a, b) <= CONTACT_EPSILON {
                        cuts.push(((v - a).dot(&ab) / len_sq).clamp(0.0, 1.0));
                    }
                }
                let denom = ab.cross(&(d - c));
                if segments_cross_properly(a, b, c, d) && denom.abs() > f32::EPSILON {
                    cuts.push(((c - a).cross(&(d - c)) / denom).clamp(0.0, 1.0));
                }
            }
            cuts.sort_by(f32::total_cmp);

            cuts.windows(2)
                .filter(|w| w[1] - w[0] > f32::EPSILON)
                .map(|w| a + ab * ((w[0] + w[1]) / 2.0) + inward)
                .collect::<Vec<_>>()
        })
    }

    /// First pair of walls that touch or cross, if any.
    fn first_self_intersection(&self) -> Option<(usize, usize)> {
        let n = self.len();
        for i in 0..n {
            let (a1, a2) = self.walls_at(i);

            // Adjacent walls only meet at their shared corner unless one folds back
            let (_, next_end) = self.walls_at((i + 1) % n);
            if turn_angle(a2 - a1, next_end - a2).abs() > PI - 1e-4 {
                return Some((i, (i + 1) % n));
            }

            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                let (b1, b2) = self.walls_at(j);
                if segments_touch(a1, a2, b1, b2) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    #[inline]
    fn walls_at(&self, i: usize) -> (Point2D, Point2D) {
        (self.vertices[i], self.vertices[(i + 1) % self.len()])
    }
}

/// Signed turn from direction `d1` to direction `d2`, in (-π, π].
#[inline]
fn turn_angle(d1: Point2D, d2: Point2D) -> f32 {
    d1.cross(&d2).atan2(d1.dot(&d2))
}

/// Distance from `p` to segment `a`-`b`.
fn point_segment_distance(p: Point2D, a: Point2D, b: Point2D) -> f32 {
    let ab = b - a;
    let len_sq = ab.dot(&ab);
    if len_sq <= f32::EPSILON {
        return p.distance(&a);
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    p.distance(&(a + ab * t))
}

#[inline]
fn orientation(a: Point2D, b: Point2D, c: Point2D) -> f32 {
    (b - a).cross(&(c - a))
}

/// Segments share at least one point (endpoint contact included).
fn segments_touch(a1: Point2D, a2: Point2D, b1: Point2D, b2: Point2D) -> bool {
    let eps = CONTACT_EPSILON * CONTACT_EPSILON;
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    if ((d1 > eps && d2 < -eps) || (d1 < -eps && d2 > eps))
        && ((d3 > eps && d4 < -eps) || (d3 < -eps && d4 > eps))
    {
        return true;
    }

    point_segment_distance(a1, b1, b2) <= CONTACT_EPSILON
        || point_segment_distance(a2, b1, b2) <= CONTACT_EPSILON
        || point_segment_distance(b1, a1, a2) <= CONTACT_EPSILON
        || point_segment_distance(b2, a1, a2) <= CONTACT_EPSILON
}

/// Segments cross through each other's interiors.
fn segments_cross_properly(a1: Point2D, a2: Point2D, b1: Point2D, b2: Point2D) -> bool {
    let eps = CONTACT_EPSILON * CONTACT_EPSILON;
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);
    ((d1 > eps && d2 < -eps) || (d1 < -eps && d2 > eps))
        && ((d3 > eps && d4 < -eps) || (d3 < -eps && d4 > eps))
}
