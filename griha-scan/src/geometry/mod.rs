//! Room outline geometry.
//!
//! - [`Segment`]: one measured wall from the capture source
//! - [`RoomGraphBuilder`]: joins segments, detects loop closure, reconciles
//! - [`RoomBoundary`]: validated closed polygon
//! - [`GeometryError`]: acceptance and validation failures

mod boundary;
mod builder;
mod error;
mod segment;

pub use boundary::{DEFAULT_ANGLE_SUM_TOLERANCE, RoomBoundary};
pub use builder::{BuilderStatus, RoomGraphBuilder, Tolerances};
pub use error::GeometryError;
pub use segment::Segment;
