//! Export failures.

use thiserror::Error;

/// Reason an export produced no bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("property has no scanned rooms to export")]
    EmptyDocument,

    #[error("not supported by this format: {0}")]
    UnsupportedFeature(String),

    #[error("rooms '{first}' and '{second}' on {floor} overlap")]
    OverlappingRooms {
        floor: String,
        first: String,
        second: String,
    },

    #[error("encoding failed: {0}")]
    Encoding(String),
}
