//! Configuration loading.
//!
//! All settings live in one YAML file with defaults for every field.
//!
//! ```rust,ignore
//! use griha_scan::config::GrihaConfig;
//!
//! // configs/griha.yaml if present, otherwise built-in defaults
//! let config = GrihaConfig::load_default()?;
//! let tolerances = config.scan.tolerances_for(ScanMethod::BrickMode);
//! ```
//!
//! | Section | Description |
//! |---------|-------------|
//! | [`ScanSection`] | Join/close/squaring tolerances, per-method multipliers |
//! | [`ExportSection`] | Paper size, margins, default ceiling height |
//! | [`PropertySection`] | Property file name and directory |
//!
//! ```yaml
//! scan:
//!   join_tolerance: 0.10      # m
//!   close_tolerance: 0.15     # m
//!   square_tolerance_deg: 4.0
//!   methods:
//!     brick_mode: 0.5         # × join_tolerance
//! export:
//!   page: a4
//! ```

mod defaults;
mod error;
mod export;
mod griha;
mod property;
mod scan;

pub use error::ConfigLoadError;
pub use griha::{DEFAULT_CONFIG_PATH, GrihaConfig};

pub use export::{ExportSection, PageSize};
pub use property::PropertySection;
pub use scan::{MethodMultipliers, ScanSection};
