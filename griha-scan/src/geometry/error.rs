//! Geometry errors raised while assembling room outlines.

use thiserror::Error;

/// Errors from segment acceptance, loop closure and boundary validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Segment does not start where the current outline ends
    #[error("segment starts {gap:.3} m away from the open outline end (tolerance {tolerance:.3} m)")]
    Disjoint {
        /// Distance between segment start and outline end (m)
        gap: f32,
        /// Join tolerance in effect (m)
        tolerance: f32,
    },

    /// Closing requires at least three walls
    #[error("a room needs at least 3 walls, have {count}")]
    TooFewSegments {
        /// Number of accepted walls
        count: usize,
    },

    /// Outline end is too far from its start to auto-close
    #[error("outline is open: closing gap {gap:.3} m exceeds {tolerance:.3} m")]
    NotClosed {
        /// Remaining gap (m)
        gap: f32,
        /// Close tolerance in effect (m)
        tolerance: f32,
    },

    /// Non-finite coordinates, negative length or confidence outside (0, 1]
    #[error("segment carries invalid measurements")]
    InvalidSegment,

    /// Wall too short to carry a direction
    #[error("segment length {length:.4} m is below the minimum wall length")]
    DegenerateSegment {
        /// Measured length (m)
        length: f32,
    },

    /// Outline crosses itself or does not wind exactly once
    #[error("outline is not a simple polygon: {0}")]
    NotSimple(String),

    /// Interior angles do not add up to (n-2)·180°
    #[error("interior angles sum to {actual:.3}°, expected {expected:.3}°")]
    AngleSum {
        /// (n-2)·180 in degrees
        expected: f32,
        /// Measured sum in degrees
        actual: f32,
    },
}

impl GeometryError {
    /// Live capture can continue after this error.
    ///
    /// Everything else is an invariant violation that ends the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GeometryError::Disjoint { .. } | GeometryError::DegenerateSegment { .. }
        )
    }
}
