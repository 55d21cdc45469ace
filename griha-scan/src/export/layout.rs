//! Plan pages and world-to-page mapping.

use uuid::Uuid;

use crate::core::Point2D;
use crate::property::{PropertyDocument, Room, RoomKind};

/// Rooms drawn together on one plan page.
#[derive(Debug)]
pub(crate) struct PlanPage<'a> {
    pub floor: &'a str,
    pub group: Option<Uuid>,
    pub rooms: Vec<&'a Room>,
}

/// One page per (floor, group), floors in document order and groups in
/// order of first appearance. Ungrouped rooms share the floor's main page.
/// Outlines are ordered plots first, then exteriors, then rooms, so rooms
/// are painted on top.
pub(crate) fn plan_pages(document: &PropertyDocument) -> Vec<PlanPage<'_>> {
    let mut pages: Vec<PlanPage<'_>> = Vec::new();

    for floor in document.floors() {
        let first_page = pages.len();
        for room in floor.rooms().iter().filter(|r| r.is_scanned()) {
            let group = room.settings().group;
            match pages[first_page..].iter_mut().find(|p| p.group == group) {
                Some(page) => page.rooms.push(room),
                None => pages.push(PlanPage {
                    floor: floor.name(),
                    group,
                    rooms: vec![room],
                }),
            }
        }
    }

    for page in &mut pages {
        page.rooms.sort_by_key(|r| paint_order(r.kind()));
    }
    pages
}

fn paint_order(kind: RoomKind) -> u8 {
    match kind {
        RoomKind::Plot => 0,
        RoomKind::Exterior => 1,
        RoomKind::Room => 2,
    }
}

/// Uniform scale mapping world meters into a page rectangle, centred.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Viewport {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl Viewport {
    /// Largest scale (capped at `max_scale` points per meter) fitting
    /// `min..max` into the rectangle at (`x`, `y`) sized `width` × `height`.
    pub fn fit(
        (min, max): (Point2D, Point2D),
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        max_scale: f32,
    ) -> Self {
        let span_x = (max.x - min.x).max(1e-3);
        let span_y = (max.y - min.y).max(1e-3);
        let scale = (width / span_x).min(height / span_y).min(max_scale);

        let offset_x = x + (width - span_x * scale) / 2.0 - min.x * scale;
        let offset_y = y + (height - span_y * scale) / 2.0 - min.y * scale;
        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    /// World point to page point (both y-up).
    pub fn map(&self, p: Point2D) -> Point2D {
        Point2D::new(p.x * self.scale + self.offset_x, p.y * self.scale + self.offset_y)
    }
}

/// Combined bounds of all outlines on a page.
pub(crate) fn page_bounds(rooms: &[&Room]) -> Option<(Point2D, Point2D)> {
    rooms
        .iter()
        .filter_map(|r| r.boundary())
        .map(|b| b.bounds())
        .reduce(|(amin, amax), (bmin, bmax)| {
            (
                Point2D::new(amin.x.min(bmin.x), amin.y.min(bmin.y)),
                Point2D::new(amax.x.max(bmax.x), amax.y.max(bmax.y)),
            )
        })
}
