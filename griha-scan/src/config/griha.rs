//! Main GrihaConfig and loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ConfigLoadError;
use super::export::ExportSection;
use super::property::PropertySection;
use super::scan::ScanSection;

/// Default config file location
pub const DEFAULT_CONFIG_PATH: &str = "configs/griha.yaml";

/// Full configuration loaded from YAML
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct GrihaConfig {
    /// Segment acceptance and closure
    #[serde(default)]
    pub scan: ScanSection,

    /// PDF and ESX output
    #[serde(default)]
    pub export: ExportSection,

    /// Property file location
    #[serde(default)]
    pub property: PropertySection,
}

impl GrihaConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load from default config path (configs/griha.yaml)
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        self.scan.validate().map_err(ConfigLoadError::Invalid)?;
        self.export.validate().map_err(ConfigLoadError::Invalid)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageSize;
    use crate::scan::ScanMethod;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config() {
        let config = GrihaConfig::default();
        assert_eq!(config.scan.join_tolerance, 0.10);
        assert_eq!(config.export.page, PageSize::A4);
        assert_eq!(config.property.file_name, "property.rugsfile");
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = GrihaConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = GrihaConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
scan:
  close_tolerance: 0.2
  methods:
    brick_mode: 0.4
export:
  page: letter
"#;
        let config = GrihaConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.scan.close_tolerance, 0.2);
        assert_eq!(config.scan.join_tolerance, 0.10);
        assert_relative_eq!(
            config.scan.tolerances_for(ScanMethod::BrickMode).join,
            0.04,
            epsilon = 1e-6
        );
        assert_eq!(config.scan.methods.room_plan, 0.75);
        assert_eq!(config.export.page, PageSize::Letter);
        assert_eq!(config.export.margin, 36.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = GrihaConfig::from_yaml("scan:\n  join_tolerance: -1.0\n");
        assert!(matches!(result, Err(ConfigLoadError::Invalid(_))));

        let result = GrihaConfig::from_yaml("export:\n  page: tabloid\n");
        assert!(matches!(result, Err(ConfigLoadError::Parse(_))));
    }
}
