//! Property file errors.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::RoomId;

/// Filesystem failure while creating, loading or saving a property.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IoError {
    #[error("no property file at {}", .0.display())]
    NotFound(PathBuf),

    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("permission denied for {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("I/O error on {}: {message}", path.display())]
    Other { path: PathBuf, message: String },
}

impl IoError {
    /// Classify a std I/O error for `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => IoError::NotFound(path),
            io::ErrorKind::AlreadyExists => IoError::AlreadyExists(path),
            io::ErrorKind::PermissionDenied => IoError::PermissionDenied(path),
            _ => IoError::Other {
                path,
                message: err.to_string(),
            },
        }
    }
}

/// Property file contents could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("corrupt property file: {0}")]
    Corrupt(String),

    #[error("unsupported property file version {found} (supported: {supported})")]
    UnsupportedVersion { found: u16, supported: u16 },
}

/// Failure loading a property document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Rejected edit of a room's metadata or features.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomEditError {
    #[error("{0} is not part of this property")]
    UnknownRoom(RoomId),

    #[error("{0} has no committed outline")]
    NotScanned(RoomId),

    #[error("invalid opening: {0}")]
    InvalidOpening(String),
}
