//! Scan acceptance configuration section.

use serde::{Deserialize, Serialize};

use crate::core::math::deg_to_rad;
use crate::geometry::Tolerances;
use crate::scan::ScanMethod;

use super::defaults;

/// Scan settings section
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanSection {
    /// Max gap between a new wall and the outline end (m)
    #[serde(default = "defaults::join_tolerance")]
    pub join_tolerance: f32,

    /// Max gap between outline end and start for closing (m)
    #[serde(default = "defaults::close_tolerance")]
    pub close_tolerance: f32,

    /// Corners within this of a right angle are squared (degrees, 0 = off)
    #[serde(default = "defaults::square_tolerance_deg")]
    pub square_tolerance_deg: f32,

    /// Allowed interior angle sum deviation (degrees)
    #[serde(default = "defaults::angle_sum_tolerance_deg")]
    pub angle_sum_tolerance_deg: f32,

    /// Largest length misclosure accepted, as a fraction of the perimeter
    #[serde(default = "defaults::max_misclosure_ratio")]
    pub max_misclosure_ratio: f32,

    /// Walls shorter than this are degenerate (m)
    #[serde(default = "defaults::min_wall_length")]
    pub min_wall_length: f32,

    /// Command queue depth of the scan worker thread
    #[serde(default = "defaults::worker_queue")]
    pub worker_queue: usize,

    /// Join tolerance multiplier per capture method
    #[serde(default)]
    pub methods: MethodMultipliers,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            join_tolerance: defaults::join_tolerance(),
            close_tolerance: defaults::close_tolerance(),
            square_tolerance_deg: defaults::square_tolerance_deg(),
            angle_sum_tolerance_deg: defaults::angle_sum_tolerance_deg(),
            max_misclosure_ratio: defaults::max_misclosure_ratio(),
            min_wall_length: defaults::min_wall_length(),
            worker_queue: defaults::worker_queue(),
            methods: MethodMultipliers::default(),
        }
    }
}

impl ScanSection {
    /// Builder tolerances before any method scaling.
    pub fn tolerances(&self) -> Tolerances {
        Tolerances {
            join: self.join_tolerance,
            close: self.close_tolerance,
            square: deg_to_rad(self.square_tolerance_deg),
            angle_sum: deg_to_rad(self.angle_sum_tolerance_deg),
            max_misclosure_ratio: self.max_misclosure_ratio,
            min_wall_length: self.min_wall_length,
        }
    }

    /// Builder tolerances with the join tolerance scaled for `method`.
    pub fn tolerances_for(&self, method: ScanMethod) -> Tolerances {
        let mut tolerances = self.tolerances();
        tolerances.join *= self.methods.factor(method);
        tolerances
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        let positive = [
            ("join_tolerance", self.join_tolerance),
            ("close_tolerance", self.close_tolerance),
            ("angle_sum_tolerance_deg", self.angle_sum_tolerance_deg),
            ("max_misclosure_ratio", self.max_misclosure_ratio),
            ("min_wall_length", self.min_wall_length),
        ];
        for (name, value) in positive.into_iter().chain(self.methods.entries()) {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("scan.{} must be positive, got {}", name, value));
            }
        }
        if !(0.0..45.0).contains(&self.square_tolerance_deg) {
            return Err(format!(
                "scan.square_tolerance_deg must be in [0, 45), got {}",
                self.square_tolerance_deg
            ));
        }
        if self.worker_queue == 0 {
            return Err("scan.worker_queue must be at least 1".into());
        }
        Ok(())
    }
}

/// Join tolerance multipliers per capture method
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodMultipliers {
    #[serde(default = "defaults::wall_touch")]
    pub wall_touch: f32,

    #[serde(default = "defaults::brick_mode")]
    pub brick_mode: f32,

    #[serde(default = "defaults::room_plan")]
    pub room_plan: f32,

    #[serde(default = "defaults::draw_manually")]
    pub draw_manually: f32,
}

impl Default for MethodMultipliers {
    fn default() -> Self {
        Self {
            wall_touch: defaults::wall_touch(),
            brick_mode: defaults::brick_mode(),
            room_plan: defaults::room_plan(),
            draw_manually: defaults::draw_manually(),
        }
    }
}

impl MethodMultipliers {
    /// Multiplier for `method`.
    pub fn factor(&self, method: ScanMethod) -> f32 {
        match method {
            ScanMethod::WallTouch => self.wall_touch,
            ScanMethod::BrickMode => self.brick_mode,
            ScanMethod::RoomPlan => self.room_plan,
            ScanMethod::DrawManually => self.draw_manually,
        }
    }

    fn entries(&self) -> [(&'static str, f32); 4] {
        [
            ("methods.wall_touch", self.wall_touch),
            ("methods.brick_mode", self.brick_mode),
            ("methods.room_plan", self.room_plan),
            ("methods.draw_manually", self.draw_manually),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_method_scales_join_only() {
        let section = ScanSection::default();
        let base = section.tolerances();
        let brick = section.tolerances_for(ScanMethod::BrickMode);
        assert_relative_eq!(brick.join, base.join * 0.5);
        assert_eq!(brick.close, base.close);
        assert_eq!(brick.square, base.square);
        assert_eq!(section.tolerances_for(ScanMethod::WallTouch), base);
    }

    #[test]
    fn test_validate() {
        assert!(ScanSection::default().validate().is_ok());

        let mut section = ScanSection::default();
        section.methods.room_plan = 0.0;
        assert!(section.validate().unwrap_err().contains("room_plan"));

        let mut section = ScanSection::default();
        section.square_tolerance_deg = 60.0;
        assert!(section.validate().is_err());
    }
}
