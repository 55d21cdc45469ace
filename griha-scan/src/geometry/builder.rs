//! Incremental room outline assembly.
//!
//! Segments arrive one wall at a time. The builder keeps an open polyline,
//! watches for the outline returning to its start and, on [`finalize`],
//! reconciles the noisy measurements into a closed [`RoomBoundary`].
//!
//! # Closure reconciliation
//!
//! ```text
//!  measured headings ──► turning angles ──► square near-right corners
//!                                                   │
//!                          residual Σturn − 2π·w ◄──┘
//!                                   │  spread over corners by uncertainty
//!                                   ▼
//!  reconciled headings ──► misclosure of Σ Lᵢ·uᵢ ──► weighted least squares
//!                                                    on wall lengths
//!                                                           │
//!                                                           ▼
//!                                              closed, validated boundary
//! ```
//!
//! Length corrections keep every corner angle intact. When the length
//! system is degenerate the compass rule (correction proportional to
//! travelled distance) is used instead.
//!
//! [`finalize`]: RoomGraphBuilder::finalize

use std::f32::consts::{FRAC_PI_2, TAU};

use log::{debug, trace};

use crate::core::Point2D;
use crate::core::math::{angle_diff, deg_to_rad};

use super::{GeometryError, RoomBoundary, Segment};

/// Tolerances applied while assembling one outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    /// Max distance between a segment start and the outline end (m)
    pub join: f32,
    /// Max distance between outline end and start to allow closing (m)
    pub close: f32,
    /// Corners within this of ±90° are squared (radians, 0 disables)
    pub square: f32,
    /// Allowed deviation of the interior angle sum (radians)
    pub angle_sum: f32,
    /// Largest length misclosure accepted, as a fraction of the perimeter
    pub max_misclosure_ratio: f32,
    /// Shorter walls are rejected as degenerate (m)
    pub min_wall_length: f32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            join: 0.10,
            close: 0.15,
            square: deg_to_rad(4.0),
            angle_sum: deg_to_rad(0.5),
            max_misclosure_ratio: 0.05,
            min_wall_length: 0.01,
        }
    }
}

/// Progress of the open outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BuilderStatus {
    /// Outline is still open
    Extending {
        /// Accepted walls so far
        segments: usize,
        /// Distance from outline end back to its start (m)
        closure_gap: f32,
    },
    /// Outline has returned to its start and can be finalized
    ReadyToClose {
        /// Accepted walls so far
        segments: usize,
        /// Distance from outline end back to its start (m)
        closure_gap: f32,
    },
}

impl BuilderStatus {
    /// Outline can be finalized.
    pub fn is_ready_to_close(&self) -> bool {
        matches!(self, BuilderStatus::ReadyToClose { .. })
    }

    /// Accepted wall count.
    pub fn segments(&self) -> usize {
        match *self {
            BuilderStatus::Extending { segments, .. }
            | BuilderStatus::ReadyToClose { segments, .. } => segments,
        }
    }
}

/// Assembles wall segments into a closed room outline.
#[derive(Clone, Debug)]
pub struct RoomGraphBuilder {
    tolerances: Tolerances,
    segments: Vec<Segment>,
    /// Accumulated join gaps (m)
    drift: f32,
}

impl RoomGraphBuilder {
    /// Create an empty builder.
    pub fn new(tolerances: Tolerances) -> Self {
        Self {
            tolerances,
            segments: Vec::new(),
            drift: 0.0,
        }
    }

    /// Tolerances in effect.
    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    /// Accepted segments in walking order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Sum of join gaps absorbed so far (m).
    pub fn drift(&self) -> f32 {
        self.drift
    }

    /// Distance from the outline end back to its start (m).
    pub fn closure_gap(&self) -> f32 {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => last.end.distance(&first.start),
            _ => f32::INFINITY,
        }
    }

    /// Current status.
    pub fn status(&self) -> BuilderStatus {
        let segments = self.segments.len();
        let closure_gap = self.closure_gap();
        if segments >= 3 && closure_gap <= self.tolerances.close {
            BuilderStatus::ReadyToClose {
                segments,
                closure_gap,
            }
        } else {
            BuilderStatus::Extending {
                segments,
                closure_gap,
            }
        }
    }

    /// Try to extend the outline with `segment`.
    ///
    /// On error the outline is left unchanged.
    pub fn add_segment(&mut self, segment: Segment) -> Result<BuilderStatus, GeometryError> {
        if !segment.is_valid() {
            return Err(GeometryError::InvalidSegment);
        }
        if segment.length < self.tolerances.min_wall_length {
            return Err(GeometryError::DegenerateSegment {
                length: segment.length,
            });
        }

        if let Some(last) = self.segments.last() {
            let gap = last.end.distance(&segment.start);
            if gap > self.tolerances.join {
                return Err(GeometryError::Disjoint {
                    gap,
                    tolerance: self.tolerances.join,
                });
            }
            self.drift += gap;
        }

        self.segments.push(segment);
        let status = self.status();
        trace!(
            "Accepted wall {} ({:.3} m), closure gap {:.3} m",
            self.segments.len(),
            segment.length,
            self.closure_gap()
        );
        Ok(status)
    }

    /// Close the outline and return the reconciled boundary.
    pub fn finalize(&self) -> Result<RoomBoundary, GeometryError> {
        let n = self.segments.len();
        if n < 3 {
            return Err(GeometryError::TooFewSegments { count: n });
        }

        let gap = self.closure_gap();
        if gap > self.tolerances.close {
            return Err(GeometryError::NotClosed {
                gap,
                tolerance: self.tolerances.close,
            });
        }

        let (headings, winding) = self.reconcile_headings()?;
        let lengths = self.reconcile_lengths(&headings)?;

        // Walk the reconciled walls from the first vertex; the closing
        // point lands back on it and is dropped.
        let mut vertices = Vec::with_capacity(n);
        let mut cursor = self.segments[0].start;
        for (heading, length) in headings.iter().zip(lengths.iter()) {
            vertices.push(cursor);
            cursor = cursor + Point2D::from_angle(*heading) * *length;
        }

        debug!(
            "Closed outline: {} walls, winding {:+}, drift {:.3} m, residual gap {:.2e} m",
            n,
            winding,
            self.drift,
            cursor.distance(&vertices[0])
        );

        RoomBoundary::with_tolerance(vertices, self.tolerances.angle_sum)
    }

    /// Reconciled wall headings plus the winding direction (+1 CCW, -1 CW).
    fn reconcile_headings(&self) -> Result<(Vec<f32>, f32), GeometryError> {
        let n = self.segments.len();

        // Turn at corner i, entering wall i from wall i-1
        let mut turns: Vec<f32> = (0..n)
            .map(|i| angle_diff(self.segments[(i + n - 1) % n].angle, self.segments[i].angle))
            .collect();

        let winding = (turns.iter().sum::<f32>() / TAU).round();
        if winding.abs() != 1.0 {
            return Err(GeometryError::NotSimple(format!(
                "outline winds {} times",
                winding
            )));
        }

        let mut squared = vec![false; n];
        if self.tolerances.square > 0.0 {
            for (turn, is_squared) in turns.iter_mut().zip(squared.iter_mut()) {
                let target = FRAC_PI_2.copysign(*turn);
                if (*turn - target).abs() <= self.tolerances.square {
                    *turn = target;
                    *is_squared = true;
                }
            }
        }

        let residual = turns.iter().sum::<f32>() - winding * TAU;
        if residual != 0.0 {
            // Free corners absorb the residual; if every corner was squared
            // they all share it.
            let any_free = squared.iter().any(|s| !s);
            let weights: Vec<f32> = (0..n)
                .map(|i| {
                    if any_free && squared[i] {
                        0.0
                    } else {
                        self.corner_uncertainty(i)
                    }
                })
                .collect();
            let total: f32 = weights.iter().sum();
            for (turn, weight) in turns.iter_mut().zip(weights.iter()) {
                *turn -= residual * weight / total;
            }
            debug!(
                "Distributed {:.3}° angular residual over {} corners",
                residual.to_degrees(),
                weights.iter().filter(|w| **w > 0.0).count()
            );
        }

        // Unanchored headings, then rotate so the plan best matches the
        // measured headings.
        let mut relative = Vec::with_capacity(n);
        let mut acc = 0.0f32;
        relative.push(0.0);
        for turn in turns.iter().skip(1) {
            acc += turn;
            relative.push(acc);
        }

        let (mut sin_sum, mut cos_sum) = (0.0f32, 0.0f32);
        for (segment, rel) in self.segments.iter().zip(relative.iter()) {
            let weight = segment.length * segment.confidence;
            let offset = segment.angle - rel;
            sin_sum += weight * offset.sin();
            cos_sum += weight * offset.cos();
        }
        let anchor = sin_sum.atan2(cos_sum);

        Ok((relative.iter().map(|rel| anchor + rel).collect(), winding))
    }

    /// Corner weight from the confidence of its two walls.
    ///
    /// A small floor keeps fully-confident corners in play.
    fn corner_uncertainty(&self, corner: usize) -> f32 {
        let n = self.segments.len();
        let before = self.segments[(corner + n - 1) % n].confidence;
        let after = self.segments[corner].confidence;
        (1.0 - before) + (1.0 - after) + 1e-3
    }

    /// Adjust measured lengths so the walls close along `headings`.
    fn reconcile_lengths(&self, headings: &[f32]) -> Result<Vec<f32>, GeometryError> {
        let directions: Vec<Point2D> = headings.iter().map(|h| Point2D::from_angle(*h)).collect();
        let mut lengths: Vec<f32> = self.segments.iter().map(|s| s.length).collect();
        let perimeter: f32 = lengths.iter().sum();

        let misclosure = directions
            .iter()
            .zip(lengths.iter())
            .fold(Point2D::ZERO, |acc, (u, l)| acc + *u * *l);
        let gap = misclosure.length();
        let allowed = self
            .tolerances
            .close
            .max(self.tolerances.max_misclosure_ratio * perimeter);
        if gap > allowed {
            return Err(GeometryError::NotClosed {
                gap,
                tolerance: allowed,
            });
        }

        // Variance grows with length and shrinks with confidence
        let variances: Vec<f32> = self
            .segments
            .iter()
            .map(|s| s.length / s.confidence)
            .collect();

        let (mut a, mut b, mut d) = (0.0f32, 0.0f32, 0.0f32);
        for (u, v) in directions.iter().zip(variances.iter()) {
            a += v * u.x * u.x;
            b += v * u.x * u.y;
            d += v * u.y * u.y;
        }
        let det = a * d - b * b;

        if det > 1e-6 * (a + d) * (a + d) {
            // λ = M⁻¹·m, δLᵢ = −vᵢ·(uᵢ·λ)
            let lambda = Point2D::new(
                (d * misclosure.x - b * misclosure.y) / det,
                (a * misclosure.y - b * misclosure.x) / det,
            );
            for ((length, u), v) in lengths.iter_mut().zip(directions.iter()).zip(variances.iter())
            {
                *length -= v * u.dot(&lambda);
            }
        } else {
            return self.compass_rule(&directions, &lengths, misclosure, perimeter);
        }

        if let Some(shortest) = lengths
            .iter()
            .copied()
            .find(|l| *l < self.tolerances.min_wall_length)
        {
            return Err(GeometryError::DegenerateSegment { length: shortest });
        }

        Ok(lengths)
    }

    /// Fallback: shift each vertex by the misclosure share of distance walked,
    /// then read back lengths along the fixed headings.
    fn compass_rule(
        &self,
        directions: &[Point2D],
        lengths: &[f32],
        misclosure: Point2D,
        perimeter: f32,
    ) -> Result<Vec<f32>, GeometryError> {
        let mut corrected = Vec::with_capacity(lengths.len());
        let mut walked = 0.0f32;
        let mut previous = Point2D::ZERO;
        let mut raw = Point2D::ZERO;
        for (u, l) in directions.iter().zip(lengths.iter()) {
            raw = raw + *u * *l;
            walked += l;
            let adjusted = raw - misclosure * (walked / perimeter);
            corrected.push((adjusted - previous).dot(u));
            previous = adjusted;
        }

        if corrected
            .iter()
            .any(|l| *l < self.tolerances.min_wall_length)
        {
            return Err(GeometryError::NotSimple(
                "wall collapsed while closing the outline".into(),
            ));
        }
        Ok(corrected)
    }
}
