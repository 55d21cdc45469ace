//! Export pipeline through the engine.

mod common;

use common::*;

use griha_scan::{ExportError, ExportFormat, RoomKind};

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[test]
fn test_empty_property_exports_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(&dir);
    engine.add_room("Kitchen", "Ground Floor", RoomKind::Room).unwrap();

    for format in ExportFormat::ALL {
        let result = engine.export(format).unwrap();
        assert_eq!(result.bytes, None, "{}", format);
        assert_eq!(
            result.message,
            Some(ExportError::EmptyDocument.to_string()),
            "{}",
            format
        );
    }
}

#[test]
fn test_pdf_has_one_page_per_floor() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(&dir);
    scan_room(
        &engine,
        "Kitchen",
        "Ground Floor",
        RoomKind::Room,
        &rectangle_corners(0.0, 0.0, 3.0, 4.0),
    );
    scan_room(
        &engine,
        "Bedroom",
        "First Floor",
        RoomKind::Room,
        &rectangle_corners(0.0, 0.0, 4.0, 4.0),
    );

    for format in [
        ExportFormat::Pdf,
        ExportFormat::PdfRoomAreas,
        ExportFormat::PdfWallMeasurements,
    ] {
        let result = engine.export(format).unwrap();
        assert_eq!(result.message, None);
        let pdf = text(&result.bytes.unwrap());
        assert!(pdf.starts_with("%PDF-1.4"));
        assert!(pdf.contains("/Count 2"));
        assert!(pdf.trim_end().ends_with("%%EOF"));
    }
}

#[test]
fn test_esx_contains_xactdoc() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(&dir);
    scan_room(
        &engine,
        "Kitchen",
        "Ground Floor",
        RoomKind::Room,
        &rectangle_corners(0.0, 0.0, 3.0, 4.0),
    );
    scan_room(
        &engine,
        "Garden",
        "Ground Floor",
        RoomKind::Plot,
        &rectangle_corners(-5.0, -5.0, 20.0, 15.0),
    );

    let result = engine.export(ExportFormat::Xactimate).unwrap();
    let message = result.message.clone().unwrap();
    assert!(message.contains("Garden"));

    let bytes = result.bytes.unwrap();
    assert!(bytes.starts_with(b"PK\x03\x04"));
    let archive = text(&bytes);
    assert!(archive.contains("XACTDOC.XML"));
    assert!(archive.contains("<XACTDOC>"));
    assert!(archive.contains("name=\"Kitchen\""));
    assert!(!archive.contains("name=\"Garden\""));
}

#[test]
fn test_esx_refuses_plots_only() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(&dir);
    scan_room(
        &engine,
        "Garden",
        "Site",
        RoomKind::Plot,
        &rectangle_corners(0.0, 0.0, 20.0, 15.0),
    );

    let result = engine.export(ExportFormat::Xactimate).unwrap();
    assert!(!result.is_success());
    assert!(result.message.unwrap().starts_with("not supported by this format"));

    // The plan export still works
    assert!(engine.export(ExportFormat::Pdf).unwrap().is_success());
}

#[test]
fn test_overlapping_rooms() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(&dir);
    scan_room(
        &engine,
        "Lounge",
        "Ground Floor",
        RoomKind::Room,
        &rectangle_corners(0.0, 0.0, 4.0, 4.0),
    );
    scan_room(
        &engine,
        "Dining",
        "Ground Floor",
        RoomKind::Room,
        &rectangle_corners(4.0, 0.0, 3.0, 4.0),
    );
    // Sharing a wall is fine
    assert_eq!(engine.find_overlapping_rooms().unwrap(), None);
    assert!(engine.export(ExportFormat::Xactimate).unwrap().is_success());

    scan_room(
        &engine,
        "Study",
        "Ground Floor",
        RoomKind::Room,
        &rectangle_corners(3.0, 3.0, 2.0, 2.0),
    );
    let overlap = engine.find_overlapping_rooms().unwrap().unwrap();
    assert_eq!(overlap.floor, "Ground Floor");

    let esx = engine.export(ExportFormat::Xactimate).unwrap();
    assert_eq!(esx.bytes, None);
    assert_eq!(
        esx.message.unwrap(),
        "rooms 'Lounge' and 'Study' on Ground Floor overlap"
    );

    let pdf = engine.export(ExportFormat::Pdf).unwrap();
    assert!(pdf.is_success());
    assert!(pdf.message.unwrap().contains("overlap"));
}

#[test]
fn test_csv_inventory() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(&dir);
    scan_room(
        &engine,
        "Kitchen",
        "Ground Floor",
        RoomKind::Room,
        &rectangle_corners(0.0, 0.0, 3.0, 4.0),
    );
    scan_room(&engine, "Snug", "First Floor", RoomKind::Room, &l_shape_corners());
    engine.add_room("Loft", "Attic", RoomKind::Room).unwrap();

    let result = engine.export(ExportFormat::CsvInventory).unwrap();
    assert!(result.message.unwrap().contains("Loft"));

    let csv = text(&result.bytes.unwrap());
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("floor,room,kind,area_m2"));
    assert!(lines[1].starts_with("Ground Floor,Kitchen,room,12.00,14.00,"));
    assert!(lines[2].starts_with("First Floor,Snug,room,19.00,20.00,"));
}
