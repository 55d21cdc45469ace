//! Property file persistence: create, save, load.

mod common;

use std::fs;

use common::*;
use uuid::Uuid;

use griha_scan::io::rugs_format::{HEADER_SIZE, MAGIC, VERSION};
use griha_scan::property::AreaDisplay;
use griha_scan::{
    DocumentError, Error, FormatError, GrihaConfig, IoError, Opening, OpeningKind,
    PropertyDocument, PropertyEngine, RoomKind,
};

fn furnished_engine(dir: &tempfile::TempDir) -> PropertyEngine {
    let engine = engine_in(dir);
    let kitchen = scan_room(
        &engine,
        "Kitchen",
        "Ground Floor",
        RoomKind::Room,
        &rectangle_corners(0.0, 0.0, 3.0, 4.0),
    );
    scan_room(
        &engine,
        "Snug",
        "First Floor",
        RoomKind::Room,
        &l_shape_corners(),
    );
    scan_room(
        &engine,
        "Garden",
        "Site",
        RoomKind::Plot,
        &rectangle_corners(-5.0, -5.0, 20.0, 15.0),
    );
    engine.add_room("Loft", "Attic", RoomKind::Room).unwrap();

    let document = engine.property().unwrap();
    let mut document = document.write();
    document.details_mut().street = "12 Orchard Lane".into();
    document.details_mut().town = "Ashford".into();
    document.details_mut().notes = "Survey for insurance".into();
    document
        .add_opening(kitchen, Opening::new(OpeningKind::Door, 0, 0.4, 0.9))
        .unwrap();
    let settings = document.room_settings_mut(kitchen).unwrap();
    settings.height = Some(2.6);
    settings.area_display = AreaDisplay::Hide;
    settings.group = Some(Uuid::from_u128(0x5eed));
    settings.custom_subtitle = Some("Open plan".into());
    settings.answers.insert("flooring".into(), "oak".into());
    drop(document);

    engine.save().unwrap();
    engine
}

#[test]
fn test_create_writes_empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = property_path(&dir);
    let document = PropertyDocument::create(&path).unwrap();
    assert_eq!(document.room_count(), 0);

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], MAGIC);
    assert_eq!(u16::from_le_bytes([bytes[8], bytes[9]]), VERSION);
    assert!(bytes.len() > HEADER_SIZE);
    assert_eq!(PropertyDocument::load(&path).unwrap(), document);
}

#[test]
fn test_create_refuses_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = property_path(&dir);
    fs::write(&path, b"not a property").unwrap();

    assert_eq!(
        PropertyDocument::create(&path).unwrap_err(),
        IoError::AlreadyExists(path.clone())
    );
    assert_eq!(fs::read(&path).unwrap(), b"not a property");
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.rugsfile");
    assert_eq!(
        PropertyDocument::load(&path).unwrap_err(),
        DocumentError::Io(IoError::NotFound(path))
    );
}

#[test]
fn test_save_twice_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let engine = furnished_engine(&dir);
    let first = fs::read(property_path(&dir)).unwrap();
    engine.save().unwrap();
    let second = fs::read(property_path(&dir)).unwrap();
    assert_eq!(first, second);

    // No temp files left behind
    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_load_reproduces_document() {
    let dir = tempfile::tempdir().unwrap();
    let engine = furnished_engine(&dir);
    let saved = engine.property().unwrap().read().clone();

    let mut reloaded = PropertyEngine::new(GrihaConfig::default());
    reloaded.load_property(property_path(&dir)).unwrap();
    let loaded = reloaded.property().unwrap().read().clone();
    assert_eq!(loaded, saved);

    let names: Vec<_> = loaded.floors().iter().map(|f| f.name()).collect();
    assert_eq!(names, ["Ground Floor", "First Floor", "Site", "Attic"]);
    let kitchen = loaded.find_room("Kitchen", "Ground Floor").unwrap();
    assert_eq!(kitchen.openings().len(), 1);
    assert_eq!(kitchen.settings().answers["flooring"], "oak");
    assert_eq!(loaded.details().town, "Ashford");
    assert!(!loaded.find_room("Loft", "Attic").unwrap().is_scanned());

    // load → save reproduces the file exactly
    let before = fs::read(property_path(&dir)).unwrap();
    reloaded.save().unwrap();
    assert_eq!(fs::read(property_path(&dir)).unwrap(), before);
}

#[test]
fn test_new_rooms_after_reload_get_fresh_ids() {
    let dir = tempfile::tempdir().unwrap();
    let engine = furnished_engine(&dir);
    let existing: Vec<_> = engine
        .property()
        .unwrap()
        .read()
        .rooms()
        .map(|r| r.id())
        .collect();

    let mut reloaded = PropertyEngine::new(GrihaConfig::default());
    reloaded.load_property(property_path(&dir)).unwrap();
    let id = reloaded.add_room("Porch", "Ground Floor", RoomKind::Exterior).unwrap();
    assert!(!existing.contains(&id));
}

#[test]
fn test_unknown_version_loads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    furnished_engine(&dir);
    let path = property_path(&dir);

    let mut bytes = fs::read(&path).unwrap();
    bytes[8..10].copy_from_slice(&7u16.to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    let mut engine = PropertyEngine::new(GrihaConfig::default());
    match engine.load_property(&path) {
        Err(Error::Format(FormatError::UnsupportedVersion { found, supported })) => {
            assert_eq!(found, 7);
            assert_eq!(supported, VERSION);
        }
        other => panic!("expected UnsupportedVersion, got {:?}", other),
    }
    assert!(!engine.has_property());
}

#[test]
fn test_corrupt_payload_rejected() {
    let dir = tempfile::tempdir().unwrap();
    furnished_engine(&dir);
    let path = property_path(&dir);

    let mut bytes = fs::read(&path).unwrap();
    bytes[HEADER_SIZE + 5] ^= 0x40;
    fs::write(&path, &bytes).unwrap();
    assert!(matches!(
        PropertyDocument::load(&path),
        Err(DocumentError::Format(FormatError::Corrupt(_)))
    ));

    fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();
    assert!(matches!(
        PropertyDocument::load(&path),
        Err(DocumentError::Format(FormatError::Corrupt(_)))
    ));
}
