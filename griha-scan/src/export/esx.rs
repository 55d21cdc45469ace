//! Xactimate ESX export: a ZIP archive holding `XACTDOC.XML`.
//!
//! Only interior rooms are exported. Plots and exteriors are skipped with a
//! warning, and overlapping rooms fail the export since the estimate would
//! double count floor area.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use super::zip::ZipWriter;
use super::{Encoded, Encoder, ExportError, room_name};
use crate::config::ExportSection;
use crate::property::{PropertyDocument, Room, RoomKind};

/// Name of the estimate document inside the archive
pub(crate) const XACTDOC_NAME: &str = "XACTDOC.XML";

pub(crate) struct EsxEncoder;

impl Encoder for EsxEncoder {
    fn encode(
        &self,
        document: &PropertyDocument,
        options: &ExportSection,
    ) -> Result<Encoded, ExportError> {
        let mut warnings = super::unscanned_warnings(document);
        for room in document.scanned_rooms() {
            if room.kind() != RoomKind::Room {
                warnings.push(format!(
                    "{} '{}' on {} is not supported by Xactimate and was left out",
                    room.kind(),
                    room.name(),
                    room.floor()
                ));
            }
        }

        if !document.scanned_rooms().any(exportable) {
            return Err(ExportError::UnsupportedFeature(
                "Xactimate export needs at least one scanned room; plots and exteriors cannot be exported".into(),
            ));
        }
        if let Some(overlap) = document.find_overlapping_rooms() {
            return Err(ExportError::OverlappingRooms {
                first: room_name(document, overlap.first),
                second: room_name(document, overlap.second),
                floor: overlap.floor,
            });
        }

        let xml = write_xactdoc(document, options)?;
        let mut zip = ZipWriter::new();
        zip.add_file(XACTDOC_NAME, &xml)
            .map_err(ExportError::Encoding)?;
        let bytes = zip.finish().map_err(ExportError::Encoding)?;
        Ok(Encoded { bytes, warnings })
    }
}

fn exportable(room: &Room) -> bool {
    room.kind() == RoomKind::Room && room.is_scanned()
}

fn encoding(err: impl std::fmt::Display) -> ExportError {
    ExportError::Encoding(err.to_string())
}

type XmlResult = Result<(), ExportError>;

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> XmlResult {
    writer.write_event(event).map_err(encoding)
}

fn write_xactdoc(
    document: &PropertyDocument,
    options: &ExportSection,
) -> Result<Vec<u8>, ExportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    emit(&mut writer, Event::Start(BytesStart::new("XACTDOC")))?;

    let details = document.details();
    let mut project = BytesStart::new("PROJECT_INFO");
    project.push_attribute(("name", details.address_line().as_str()));
    project.push_attribute(("notes", details.notes.as_str()));
    emit(&mut writer, Event::Empty(project))?;

    emit(&mut writer, Event::Start(BytesStart::new("ADM")))?;
    let mut address = BytesStart::new("ADDRESS");
    address.push_attribute(("street", details.street.as_str()));
    address.push_attribute(("city", details.town.as_str()));
    address.push_attribute(("postal", details.postal_code.as_str()));
    address.push_attribute(("country", details.country.as_str()));
    emit(&mut writer, Event::Empty(address))?;
    emit(&mut writer, Event::End(BytesEnd::new("ADM")))?;

    let mut sketch = BytesStart::new("SKETCH");
    sketch.push_attribute(("units", "meters"));
    emit(&mut writer, Event::Start(sketch))?;
    for floor in document.floors() {
        let rooms: Vec<&Room> = floor.rooms().iter().filter(|r| exportable(r)).collect();
        if rooms.is_empty() {
            continue;
        }
        let mut level = BytesStart::new("LEVEL");
        level.push_attribute(("name", floor.name()));
        level.push_attribute(("floorArea", fixed(floor.area()).as_str()));
        emit(&mut writer, Event::Start(level))?;
        for room in rooms {
            write_room(&mut writer, room, options)?;
        }
        emit(&mut writer, Event::End(BytesEnd::new("LEVEL")))?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("SKETCH")))?;

    emit(&mut writer, Event::End(BytesEnd::new("XACTDOC")))?;
    Ok(writer.into_inner())
}

fn write_room(writer: &mut Writer<Vec<u8>>, room: &Room, options: &ExportSection) -> XmlResult {
    let Some(boundary) = room.boundary() else {
        return Ok(());
    };
    let settings = room.settings();
    let height = settings.height.unwrap_or(options.default_ceiling_height);

    let mut element = BytesStart::new("ROOM");
    element.push_attribute(("id", room.id().value().to_string().as_str()));
    element.push_attribute(("name", room.name()));
    element.push_attribute(("height", fixed(height).as_str()));
    element.push_attribute(("floorArea", fixed(boundary.area()).as_str()));
    element.push_attribute(("perimeter", fixed(boundary.perimeter()).as_str()));
    element.push_attribute(("wallArea", fixed(boundary.perimeter() * height).as_str()));
    if let Some(method) = room.scan_method() {
        element.push_attribute(("captureMethod", method.as_str()));
    }
    emit(writer, Event::Start(element))?;

    emit(writer, Event::Start(BytesStart::new("POINTS")))?;
    for v in boundary.vertices() {
        let mut point = BytesStart::new("POINT");
        point.push_attribute(("x", fixed(v.x).as_str()));
        point.push_attribute(("y", fixed(v.y).as_str()));
        emit(writer, Event::Empty(point))?;
    }
    emit(writer, Event::End(BytesEnd::new("POINTS")))?;

    if !room.openings().is_empty() {
        emit(writer, Event::Start(BytesStart::new("OPENINGS")))?;
        for opening in room.openings() {
            let mut element = BytesStart::new("OPENING");
            element.push_attribute(("type", opening.kind.as_str()));
            element.push_attribute(("wall", opening.wall.to_string().as_str()));
            element.push_attribute(("offset", fixed(opening.offset).as_str()));
            element.push_attribute(("width", fixed(opening.width).as_str()));
            emit(writer, Event::Empty(element))?;
        }
        emit(writer, Event::End(BytesEnd::new("OPENINGS")))?;
    }

    if !settings.answers.is_empty() {
        emit(writer, Event::Start(BytesStart::new("NOTES")))?;
        for (key, value) in &settings.answers {
            let mut note = BytesStart::new("NOTE");
            note.push_attribute(("key", key.as_str()));
            note.push_attribute(("value", value.as_str()));
            emit(writer, Event::Empty(note))?;
        }
        emit(writer, Event::End(BytesEnd::new("NOTES")))?;
    }

    emit(writer, Event::End(BytesEnd::new("ROOM")))
}

fn fixed(value: f32) -> String {
    format!("{:.3}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point2D;
    use crate::export::zip::read_stored;
    use crate::geometry::RoomBoundary;
    use crate::scan::ScanMethod;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> RoomBoundary {
        RoomBoundary::new(vec![
            Point2D::new(x, y),
            Point2D::new(x + w, y),
            Point2D::new(x + w, y + h),
            Point2D::new(x, y + h),
        ])
        .unwrap()
    }

    fn xml_of(encoded: &Encoded) -> String {
        let files = read_stored(&encoded.bytes);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, XACTDOC_NAME);
        String::from_utf8(files[0].1.clone()).unwrap()
    }

    #[test]
    fn test_rooms_exported_plots_skipped() {
        let mut doc = PropertyDocument::new("unused.rugsfile");
        let kitchen = doc.add_room("Kitchen & Diner", "Ground Floor", RoomKind::Room);
        let garden = doc.add_room("Garden", "Ground Floor", RoomKind::Plot);
        doc.commit_boundary(kitchen, rect(0.0, 0.0, 3.0, 4.0), ScanMethod::WallTouch);
        doc.commit_boundary(garden, rect(-5.0, -5.0, 20.0, 20.0), ScanMethod::DrawManually);
        doc.room_settings_mut(kitchen).unwrap().height = Some(2.5);

        let encoded = EsxEncoder.encode(&doc, &ExportSection::default()).unwrap();
        let xml = xml_of(&encoded);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("name=\"Kitchen &amp; Diner\""));
        assert!(xml.contains("floorArea=\"12.000\""));
        assert!(xml.contains("wallArea=\"35.000\""));
        assert!(!xml.contains("Garden"));
        assert_eq!(encoded.warnings.len(), 1);
        assert!(encoded.warnings[0].contains("Garden"));
    }

    #[test]
    fn test_only_plots_unsupported() {
        let mut doc = PropertyDocument::new("unused.rugsfile");
        let plot = doc.add_room("Plot", "Site", RoomKind::Plot);
        doc.commit_boundary(plot, rect(0.0, 0.0, 10.0, 10.0), ScanMethod::DrawManually);
        assert!(matches!(
            EsxEncoder.encode(&doc, &ExportSection::default()),
            Err(ExportError::UnsupportedFeature(_))
        ));
    }

    #[test]
    fn test_overlap_refused() {
        let mut doc = PropertyDocument::new("unused.rugsfile");
        let a = doc.add_room("A", "G", RoomKind::Room);
        let b = doc.add_room("B", "G", RoomKind::Room);
        doc.commit_boundary(a, rect(0.0, 0.0, 3.0, 3.0), ScanMethod::WallTouch);
        doc.commit_boundary(b, rect(2.0, 0.0, 3.0, 3.0), ScanMethod::WallTouch);
        assert_eq!(
            EsxEncoder.encode(&doc, &ExportSection::default()).unwrap_err(),
            ExportError::OverlappingRooms {
                floor: "G".into(),
                first: "A".into(),
                second: "B".into()
            }
        );
    }

    #[test]
    fn test_default_height_used() {
        let mut doc = PropertyDocument::new("unused.rugsfile");
        let a = doc.add_room("A", "G", RoomKind::Room);
        doc.commit_boundary(a, rect(0.0, 0.0, 2.0, 2.0), ScanMethod::WallTouch);
        let xml = xml_of(&EsxEncoder.encode(&doc, &ExportSection::default()).unwrap());
        assert!(xml.contains("height=\"2.400\""));
        assert!(xml.contains("captureMethod=\"wall-touch\""));
    }
}
