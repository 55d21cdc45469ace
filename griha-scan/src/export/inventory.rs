//! Room inventory as CSV, one row per scanned room.

use super::{Encoded, Encoder, ExportError};
use crate::config::ExportSection;
use crate::property::{AreaDisplay, OpeningKind, PropertyDocument, Room};

const HEADER: [&str; 13] = [
    "floor",
    "room",
    "kind",
    "area_m2",
    "perimeter_m",
    "height_m",
    "wall_area_m2",
    "walls",
    "doors",
    "windows",
    "passages",
    "scan_method",
    "created_at_ms",
];

pub(crate) struct CsvEncoder;

impl Encoder for CsvEncoder {
    fn encode(
        &self,
        document: &PropertyDocument,
        options: &ExportSection,
    ) -> Result<Encoded, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(HEADER).map_err(encoding)?;
        for room in document.scanned_rooms() {
            writer
                .write_record(row(room, options))
                .map_err(encoding)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| ExportError::Encoding(err.error().to_string()))?;

        Ok(Encoded {
            bytes,
            warnings: super::unscanned_warnings(document),
        })
    }
}

fn encoding(err: csv::Error) -> ExportError {
    ExportError::Encoding(err.to_string())
}

fn row(room: &Room, options: &ExportSection) -> Vec<String> {
    let height = room
        .settings()
        .height
        .unwrap_or(options.default_ceiling_height);
    let (area, perimeter, walls) = room.boundary().map_or((0.0, 0.0, 0), |b| {
        (b.area(), b.perimeter(), b.len())
    });
    let count = |kind: OpeningKind| {
        room.openings()
            .iter()
            .filter(|o| o.kind == kind)
            .count()
            .to_string()
    };

    vec![
        room.floor().to_string(),
        room.name().to_string(),
        room.kind().to_string(),
        match room.settings().area_display {
            AreaDisplay::Show => format!("{:.2}", area),
            AreaDisplay::Hide | AreaDisplay::Exclude => String::new(),
        },
        format!("{:.2}", perimeter),
        format!("{:.2}", height),
        format!("{:.2}", perimeter * height),
        walls.to_string(),
        count(OpeningKind::Door),
        count(OpeningKind::Window),
        count(OpeningKind::Passage),
        room.scan_method()
            .map_or_else(String::new, |m| m.as_str().to_string()),
        room.created_at_ms().to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point2D;
    use crate::geometry::RoomBoundary;
    use crate::property::{Opening, RoomKind};
    use crate::scan::ScanMethod;

    fn rect(w: f32, h: f32) -> RoomBoundary {
        RoomBoundary::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(w, 0.0),
            Point2D::new(w, h),
            Point2D::new(0.0, h),
        ])
        .unwrap()
    }

    fn lines(encoded: &Encoded) -> Vec<String> {
        String::from_utf8(encoded.bytes.clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_one_row_per_scanned_room() {
        let mut doc = PropertyDocument::new("unused.rugsfile");
        let kitchen = doc.add_room("Kitchen, rear", "Ground Floor", RoomKind::Room);
        doc.add_room("Loft", "Attic", RoomKind::Room);
        doc.commit_boundary(kitchen, rect(3.0, 4.0), ScanMethod::BrickMode);
        doc.add_opening(kitchen, Opening::new(OpeningKind::Door, 0, 0.5, 0.8))
            .unwrap();
        doc.add_opening(kitchen, Opening::new(OpeningKind::Window, 1, 1.0, 1.2))
            .unwrap();

        let encoded = CsvEncoder.encode(&doc, &ExportSection::default()).unwrap();
        let lines = lines(&encoded);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], HEADER.join(","));

        let created = doc.room(kitchen).unwrap().created_at_ms();
        assert_eq!(
            lines[1],
            format!(
                "Ground Floor,\"Kitchen, rear\",room,12.00,14.00,2.40,33.60,4,1,1,0,brick-mode,{}",
                created
            )
        );
        assert_eq!(encoded.warnings.len(), 1);
        assert!(encoded.warnings[0].contains("Loft"));
    }

    #[test]
    fn test_hidden_area_left_blank() {
        let mut doc = PropertyDocument::new("unused.rugsfile");
        let store = doc.add_room("Store", "G", RoomKind::Room);
        doc.commit_boundary(store, rect(1.0, 1.0), ScanMethod::DrawManually);
        doc.room_settings_mut(store).unwrap().area_display = AreaDisplay::Hide;

        let encoded = CsvEncoder.encode(&doc, &ExportSection::default()).unwrap();
        let fields: Vec<String> = lines(&encoded)[1].split(',').map(str::to_string).collect();
        assert_eq!(fields[3], "");
        assert_eq!(fields[4], "4.00");
        assert!(encoded.warnings.is_empty());
    }
}
