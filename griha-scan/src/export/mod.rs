//! Property export.
//!
//! Every [`ExportFormat`] maps to one [`Encoder`] through a fixed selection
//! table. Encoders return bytes plus non-fatal warnings; [`export`] folds
//! both into an [`ExportResult`].
//!
//! | Format | Output |
//! |--------|--------|
//! | [`ExportFormat::Pdf`] | PDF 1.4, one page per floor plan |
//! | [`ExportFormat::PdfRoomAreas`] | PDF with room areas and floor totals |
//! | [`ExportFormat::PdfWallMeasurements`] | PDF with every wall length |
//! | [`ExportFormat::Xactimate`] | ESX (ZIP holding `XACTDOC.XML`) |
//! | [`ExportFormat::CsvInventory`] | CSV, one row per scanned room |

mod error;
mod esx;
mod inventory;
mod layout;
mod pdf;
mod zip;

use std::fmt;
use std::str::FromStr;

use log::{info, warn};

pub use error::ExportError;

use crate::config::ExportSection;
use crate::property::PropertyDocument;

/// Closed set of output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Pdf,
    PdfRoomAreas,
    PdfWallMeasurements,
    Xactimate,
    CsvInventory,
}

impl ExportFormat {
    /// All formats.
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Pdf,
        ExportFormat::PdfRoomAreas,
        ExportFormat::PdfWallMeasurements,
        ExportFormat::Xactimate,
        ExportFormat::CsvInventory,
    ];

    /// CLI name.
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::PdfRoomAreas => "pdf-room-areas",
            ExportFormat::PdfWallMeasurements => "pdf-wall-measurements",
            ExportFormat::Xactimate => "esx",
            ExportFormat::CsvInventory => "csv",
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf | ExportFormat::PdfRoomAreas | ExportFormat::PdfWallMeasurements => {
                "pdf"
            }
            ExportFormat::Xactimate => "esx",
            ExportFormat::CsvInventory => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == normalized)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|f| f.as_str()).collect();
                format!("unknown format '{}' (expected one of {})", s, names.join(", "))
            })
    }
}

/// Outcome of an export: bytes, a message, or both.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportResult {
    /// Encoded output; absent on failure
    pub bytes: Option<Vec<u8>>,
    /// Failure reason or joined warnings
    pub message: Option<String>,
}

impl ExportResult {
    /// Output was produced.
    pub fn is_success(&self) -> bool {
        self.bytes.is_some()
    }

    fn failed(err: &ExportError) -> Self {
        Self {
            bytes: None,
            message: Some(err.to_string()),
        }
    }
}

/// Encoder output before it is folded into an [`ExportResult`].
#[derive(Clone, Debug, Default)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub warnings: Vec<String>,
}

/// One output format.
pub trait Encoder: Sync {
    /// Encode a read-only view of the document.
    fn encode(
        &self,
        document: &PropertyDocument,
        options: &ExportSection,
    ) -> Result<Encoded, ExportError>;
}

static PDF_PLAN: pdf::PdfEncoder = pdf::PdfEncoder::new(pdf::Labels::Names);
static PDF_AREAS: pdf::PdfEncoder = pdf::PdfEncoder::new(pdf::Labels::Areas);
static PDF_WALLS: pdf::PdfEncoder = pdf::PdfEncoder::new(pdf::Labels::WallLengths);
static ESX: esx::EsxEncoder = esx::EsxEncoder;
static CSV: inventory::CsvEncoder = inventory::CsvEncoder;

/// Format selection table.
pub fn encoder_for(format: ExportFormat) -> &'static dyn Encoder {
    match format {
        ExportFormat::Pdf => &PDF_PLAN,
        ExportFormat::PdfRoomAreas => &PDF_AREAS,
        ExportFormat::PdfWallMeasurements => &PDF_WALLS,
        ExportFormat::Xactimate => &ESX,
        ExportFormat::CsvInventory => &CSV,
    }
}

/// Export `document` as `format`.
pub fn export(
    document: &PropertyDocument,
    format: ExportFormat,
    options: &ExportSection,
) -> ExportResult {
    if document.scanned_rooms().next().is_none() {
        warn!("Export {} skipped: {}", format, ExportError::EmptyDocument);
        return ExportResult::failed(&ExportError::EmptyDocument);
    }

    match encoder_for(format).encode(document, options) {
        Ok(encoded) => {
            info!(
                "Exported {} ({} bytes, {} warnings)",
                format,
                encoded.bytes.len(),
                encoded.warnings.len()
            );
            let message = (!encoded.warnings.is_empty()).then(|| encoded.warnings.join("\n"));
            ExportResult {
                bytes: Some(encoded.bytes),
                message,
            }
        }
        Err(err) => {
            warn!("Export {} failed: {}", format, err);
            ExportResult::failed(&err)
        }
    }
}

/// Warnings for rooms the exporters leave out.
fn unscanned_warnings(document: &PropertyDocument) -> Vec<String> {
    document
        .rooms()
        .filter(|r| !r.is_scanned())
        .map(|r| {
            format!(
                "'{}' on {} has not been scanned and was left out",
                r.name(),
                r.floor()
            )
        })
        .collect()
}

/// Room name for messages; ids are not user-facing.
fn room_name(document: &PropertyDocument, id: crate::property::RoomId) -> String {
    document
        .room(id)
        .map_or_else(|| id.to_string(), |r| r.name().to_string())
}

fn format_area(area: f32) -> String {
    format!("{:.2} m²", area)
}

fn format_length(length: f32) -> String {
    format!("{:.2} m", length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        for format in ExportFormat::ALL {
            assert_eq!(format.as_str().parse::<ExportFormat>(), Ok(format));
        }
        assert!("docx".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::PdfWallMeasurements.extension(), "pdf");
    }

    #[test]
    fn test_empty_document() {
        let mut doc = PropertyDocument::new("unused.rugsfile");
        doc.add_room("Kitchen", "Ground Floor", crate::property::RoomKind::Room);
        for format in ExportFormat::ALL {
            let result = export(&doc, format, &ExportSection::default());
            assert_eq!(result.bytes, None);
            assert_eq!(
                result.message.as_deref(),
                Some("property has no scanned rooms to export")
            );
        }
    }
}
