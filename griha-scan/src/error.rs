//! Error types for griha-scan

use crate::config::ConfigLoadError;
use crate::export::ExportError;
use crate::geometry::GeometryError;
use crate::io::SegmentLogError;
use crate::property::{DocumentError, FormatError, IoError, RoomEditError};
use crate::scan::SessionError;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// griha-scan error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Outline construction or validation failed
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Scan session misuse or failure
    #[error("Scan error: {0}")]
    Session(#[from] SessionError),

    /// Property file I/O
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Property file contents
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Room edit rejected
    #[error("Room error: {0}")]
    RoomEdit(#[from] RoomEditError),

    /// Export refused
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Export produced no output
    #[error("Export failed: {0}")]
    ExportFailed(String),

    /// Configuration file
    #[error("Config error: {0}")]
    Config(#[from] ConfigLoadError),

    /// Segment log file
    #[error("Segment log error: {0}")]
    SegmentLog(#[from] SegmentLogError),

    /// No property has been created or loaded
    #[error("No property is open")]
    NoProperty,

    /// Scan worker thread could not be spawned
    #[error("Worker error: {0}")]
    Worker(#[from] std::io::Error),
}

impl From<DocumentError> for Error {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Io(e) => Error::Io(e),
            DocumentError::Format(e) => Error::Format(e),
        }
    }
}
