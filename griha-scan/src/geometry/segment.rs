//! Measured wall segment.

use serde::{Deserialize, Serialize};

use crate::core::Point2D;

/// One wall measurement from the capture source.
///
/// Endpoints locate the wall for joining and closure detection. The
/// measured `length` and `angle` are what the closure pass reconciles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Wall start in plan coordinates (m)
    pub start: Point2D,
    /// Wall end in plan coordinates (m)
    pub end: Point2D,
    /// Measured wall length (m)
    pub length: f32,
    /// Measured wall heading (radians, CCW from +X)
    pub angle: f32,
    /// Measurement confidence in (0, 1]
    pub confidence: f32,
}

impl Segment {
    /// Create a segment with explicit measurements.
    pub fn new(start: Point2D, end: Point2D, length: f32, angle: f32, confidence: f32) -> Self {
        Self {
            start,
            end,
            length,
            angle,
            confidence,
        }
    }

    /// Segment whose measurements agree exactly with its endpoints.
    pub fn between(start: Point2D, end: Point2D) -> Self {
        Self {
            start,
            end,
            length: start.distance(&end),
            angle: start.angle_to(&end),
            confidence: 1.0,
        }
    }

    /// Same geometry with a different confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Unit vector along the measured heading.
    #[inline]
    pub fn direction(&self) -> Point2D {
        Point2D::from_angle(self.angle)
    }

    /// All measurements are usable.
    pub fn is_valid(&self) -> bool {
        self.start.is_finite()
            && self.end.is_finite()
            && self.length.is_finite()
            && self.length >= 0.0
            && self.angle.is_finite()
            && self.confidence > 0.0
            && self.confidence <= 1.0
    }
}
