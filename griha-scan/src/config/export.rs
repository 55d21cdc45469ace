//! Export configuration section.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Paper size for PDF reports
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// 210 × 297 mm
    #[default]
    A4,
    /// 8.5 × 11 in
    Letter,
}

impl PageSize {
    /// Width and height in PDF points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.0, 842.0),
            PageSize::Letter => (612.0, 792.0),
        }
    }
}

/// Export settings section
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportSection {
    /// PDF paper size
    #[serde(default)]
    pub page: PageSize,

    /// PDF page margin (points)
    #[serde(default = "defaults::margin")]
    pub margin: f32,

    /// Ceiling height used for rooms without one (m)
    #[serde(default = "defaults::default_ceiling_height")]
    pub default_ceiling_height: f32,

    /// Heading printed on every PDF page
    #[serde(default = "defaults::report_title")]
    pub report_title: String,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            page: PageSize::default(),
            margin: defaults::margin(),
            default_ceiling_height: defaults::default_ceiling_height(),
            report_title: defaults::report_title(),
        }
    }
}

impl ExportSection {
    pub(crate) fn validate(&self) -> Result<(), String> {
        let (width, height) = self.page.dimensions();
        if !(self.margin.is_finite() && self.margin >= 0.0 && 4.0 * self.margin < width.min(height))
        {
            return Err(format!("export.margin {} leaves no drawing area", self.margin));
        }
        if !(self.default_ceiling_height.is_finite() && self.default_ceiling_height > 0.0) {
            return Err(format!(
                "export.default_ceiling_height must be positive, got {}",
                self.default_ceiling_height
            ));
        }
        Ok(())
    }
}
