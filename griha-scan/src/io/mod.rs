//! File formats: the property file and segment log YAML.

pub mod rugs_format;
mod segment_log;

pub use segment_log::{SegmentLog, SegmentLogError, SegmentRecord};
