//! # Griha Scan
//!
//! Room-scan property engine: turns measured wall segments into closed room
//! outlines, keeps them in a property file, and exports floor plans.
//!
//! ## Overview
//!
//! - **Geometry**: segments are joined into a polyline until it closes, then
//!   reconciled into a validated [`RoomBoundary`]
//! - **Scanning**: a [`ScanSession`] drives one capture of one room and is
//!   the only writer of that room's outline
//! - **Property**: floors and rooms in a [`PropertyDocument`], saved to a
//!   checksummed binary file
//! - **Export**: PDF plans, Xactimate ESX and a CSV inventory
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use griha_scan::{ExportFormat, GrihaConfig, PropertyEngine, RoomKind, ScanMethod};
//!
//! let mut engine = PropertyEngine::new(GrihaConfig::load_default()?);
//! engine.create_property("property.rugsfile")?;
//! let room = engine.add_room("My Room", "Ground Floor", RoomKind::Room)?;
//!
//! let mut session = engine.start_scan(room, ScanMethod::WallTouch)?;
//! for segment in segments {
//!     session.feed(segment)?;
//! }
//! session.commit()?;
//! engine.save()?;
//!
//! let result = engine.export(ExportFormat::Pdf)?;
//! ```
//!
//! ## Coordinate System
//!
//! Plan coordinates in meters, X right and Y up. Angles are radians, CCW
//! positive from +X.

// Points and math shared by all layers
pub mod core;

// Segments, outline building and validation
pub mod geometry;

// Floors, rooms and the property document
pub mod property;

// Scan sessions, room leases and the worker thread
pub mod scan;

// Property file and segment log formats
pub mod io;

// PDF, ESX and CSV encoders
pub mod export;

// YAML configuration
pub mod config;

mod engine;
mod error;

pub use config::GrihaConfig;
pub use core::Point2D;
pub use engine::PropertyEngine;
pub use error::{Error, Result};
pub use export::{ExportError, ExportFormat, ExportResult};
pub use geometry::{BuilderStatus, GeometryError, RoomBoundary, RoomGraphBuilder, Segment};
pub use io::SegmentLog;
pub use property::{
    DocumentError, FormatError, IoError, Opening, OpeningKind, PropertyDocument, Room, RoomId,
    RoomKind,
};
pub use scan::{FeedOutcome, ScanMethod, ScanSession, ScanWorker, SessionError, SessionState};
