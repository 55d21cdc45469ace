//! Core types shared by every layer.
//!
//! - [`Point2D`]: plan-space point/vector in meters
//! - [`math`]: angle normalization and conversions
//! - [`checksum`]: CRC-32 for file trailers and archive entries

pub mod checksum;
pub mod math;
mod point;

pub use point::Point2D;
