//! Capture methods.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a room is captured.
///
/// The method only changes how far apart consecutive walls may be before a
/// segment is rejected as disjoint; the session state machine is identical.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMethod {
    /// Device held against each wall in turn
    WallTouch,
    /// Guided AR capture with tighter acceptance ("brick mode")
    BrickMode,
    /// Depth-sensor room capture
    RoomPlan,
    /// Plan drawn by hand, lengths typed or taken from a laser
    DrawManually,
}

impl ScanMethod {
    /// All methods in file-code order.
    pub const ALL: [ScanMethod; 4] = [
        ScanMethod::WallTouch,
        ScanMethod::BrickMode,
        ScanMethod::RoomPlan,
        ScanMethod::DrawManually,
    ];

    /// Stable code used by the property file.
    pub fn code(self) -> u8 {
        match self {
            ScanMethod::WallTouch => 0,
            ScanMethod::BrickMode => 1,
            ScanMethod::RoomPlan => 2,
            ScanMethod::DrawManually => 3,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == code)
    }

    /// Short name used in config files and the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            ScanMethod::WallTouch => "wall-touch",
            ScanMethod::BrickMode => "brick-mode",
            ScanMethod::RoomPlan => "room-plan",
            ScanMethod::DrawManually => "draw-manually",
        }
    }
}

impl fmt::Display for ScanMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| format!("unknown scan method '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for method in ScanMethod::ALL {
            assert_eq!(ScanMethod::from_code(method.code()), Some(method));
        }
        assert_eq!(ScanMethod::from_code(9), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("brick_mode".parse::<ScanMethod>(), Ok(ScanMethod::BrickMode));
        assert_eq!("Wall-Touch".parse::<ScanMethod>(), Ok(ScanMethod::WallTouch));
        assert!("lidar".parse::<ScanMethod>().is_err());
    }
}
