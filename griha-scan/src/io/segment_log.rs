//! Segment log YAML parsing.
//!
//! A segment log is a recorded wall capture that can be replayed through a
//! scan session:
//!
//! ```yaml
//! name: "Kitchen"
//! method: wall_touch
//! segments:
//!   - { start: [0.0, 0.0], end: [3.0, 0.0] }
//!   - { start: [3.0, 0.0], end: [3.0, 4.0], length: 4.02, confidence: 0.8 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::Point2D;
use crate::core::math::deg_to_rad;
use crate::geometry::Segment;
use crate::scan::ScanMethod;

/// A recorded capture loaded from YAML
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SegmentLog {
    /// Human-readable capture name
    #[serde(default)]
    pub name: String,

    /// Capture method the log was recorded with
    #[serde(default)]
    pub method: Option<ScanMethod>,

    /// Walls in capture order
    pub segments: Vec<SegmentRecord>,
}

/// One recorded wall
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SegmentRecord {
    /// Wall start [x, y] in meters
    pub start: [f32; 2],

    /// Wall end [x, y] in meters
    pub end: [f32; 2],

    /// Measured length; defaults to the start-end distance
    #[serde(default)]
    pub length: Option<f32>,

    /// Measured heading in degrees CCW from +X; defaults to the start-end
    /// direction
    #[serde(default)]
    pub heading_deg: Option<f32>,

    /// Measurement confidence in (0, 1]
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

impl SegmentRecord {
    /// Convert to a builder segment.
    pub fn to_segment(&self) -> Segment {
        let start = Point2D::new(self.start[0], self.start[1]);
        let end = Point2D::new(self.end[0], self.end[1]);
        let length = self.length.unwrap_or_else(|| start.distance(&end));
        let angle = self
            .heading_deg
            .map(deg_to_rad)
            .unwrap_or_else(|| start.angle_to(&end));
        Segment::new(start, end, length, angle, self.confidence)
    }
}

/// Error type for segment log loading
#[derive(Debug, Clone)]
pub enum SegmentLogError {
    /// File read error
    Io(String),
    /// YAML parse error
    Parse(String),
}

impl std::fmt::Display for SegmentLogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentLogError::Io(msg) => write!(f, "I/O error: {}", msg),
            SegmentLogError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for SegmentLogError {}

impl SegmentLog {
    /// Load a segment log from a YAML file
    pub fn load(path: &Path) -> Result<Self, SegmentLogError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| SegmentLogError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a segment log from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, SegmentLogError> {
        serde_yaml::from_str(yaml).map_err(|e| SegmentLogError::Parse(e.to_string()))
    }

    /// Segments in capture order
    pub fn to_segments(&self) -> Vec<Segment> {
        self.segments.iter().map(SegmentRecord::to_segment).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_parse_log_with_defaults() {
        let yaml = r#"
name: "Box room"
method: brick_mode
segments:
  - { start: [0.0, 0.0], end: [3.0, 0.0] }
  - { start: [3.0, 0.0], end: [3.0, 4.0], length: 4.05, confidence: 0.5 }
  - start: [3.0, 4.0]
    end: [0.0, 4.0]
    heading_deg: 181.0
"#;
        let log = SegmentLog::from_yaml(yaml).unwrap();
        assert_eq!(log.name, "Box room");
        assert_eq!(log.method, Some(ScanMethod::BrickMode));

        let segments = log.to_segments();
        assert_eq!(segments.len(), 3);
        assert_relative_eq!(segments[0].length, 3.0);
        assert_relative_eq!(segments[0].angle, 0.0);
        assert_relative_eq!(segments[0].confidence, 1.0);
        assert_relative_eq!(segments[1].length, 4.05);
        assert_relative_eq!(segments[1].angle, FRAC_PI_2, epsilon = 1e-6);
        assert_relative_eq!(segments[1].confidence, 0.5);
        assert_relative_eq!(segments[2].angle, deg_to_rad(181.0));
    }

    #[test]
    fn test_missing_segments_is_parse_error() {
        let result = SegmentLog::from_yaml("name: empty\n");
        assert!(matches!(result, Err(SegmentLogError::Parse(_))));
    }
}
