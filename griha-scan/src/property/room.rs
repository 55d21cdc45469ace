//! Rooms and their metadata.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::geometry::RoomBoundary;
use crate::scan::ScanMethod;

/// Immutable room identifier, unique within one property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(pub(crate) u32);

impl RoomId {
    /// Raw numeric value.
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room#{}", self.0)
    }
}

/// What the outline describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoomKind {
    /// Interior room
    Room,
    /// Land plot outline
    Plot,
    /// Building outline captured from outside
    Exterior,
}

impl RoomKind {
    /// Stable code used by the property file.
    pub fn code(self) -> u8 {
        match self {
            RoomKind::Room => 1,
            RoomKind::Plot => 2,
            RoomKind::Exterior => 3,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(RoomKind::Room),
            2 => Some(RoomKind::Plot),
            3 => Some(RoomKind::Exterior),
            _ => None,
        }
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            RoomKind::Room => "room",
            RoomKind::Plot => "plot",
            RoomKind::Exterior => "exterior",
        }
    }
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "room" => Ok(RoomKind::Room),
            "plot" => Ok(RoomKind::Plot),
            "exterior" => Ok(RoomKind::Exterior),
            other => Err(format!("unknown room kind '{}'", other)),
        }
    }
}

/// How the room's size is presented and totalled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum AreaDisplay {
    /// Size shown, area counted in floor totals
    #[default]
    Show,
    /// Size hidden, area still counted
    Hide,
    /// Size hidden, area not counted
    Exclude,
}

impl AreaDisplay {
    pub(crate) fn code(self) -> u8 {
        match self {
            AreaDisplay::Show => 0,
            AreaDisplay::Hide => 1,
            AreaDisplay::Exclude => 2,
        }
    }

    pub(crate) fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(AreaDisplay::Show),
            1 => Some(AreaDisplay::Hide),
            2 => Some(AreaDisplay::Exclude),
            _ => None,
        }
    }
}

/// Line style for the room's walls on plans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum WallStyle {
    /// Standard wall
    #[default]
    Normal,
    /// Thin wall (balconies, outdoor areas)
    Thin,
    /// Thin dashed line
    Broken,
}

impl WallStyle {
    pub(crate) fn code(self) -> u8 {
        match self {
            WallStyle::Normal => 0,
            WallStyle::Thin => 1,
            WallStyle::Broken => 2,
        }
    }

    pub(crate) fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(WallStyle::Normal),
            1 => Some(WallStyle::Thin),
            2 => Some(WallStyle::Broken),
            _ => None,
        }
    }
}

/// RGBA fill colour, components in 0..=1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Colour {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Colour {
    /// Create a colour, clamping components into range.
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Grey with alpha.
    pub fn grey(level: f32, a: f32) -> Self {
        Self::rgba(level, level, level, a)
    }

    /// Opaque RGB after compositing over white paper.
    pub fn over_white(&self) -> (f32, f32, f32) {
        let blend = |c: f32| 1.0 - self.a * (1.0 - c);
        (blend(self.r), blend(self.g), blend(self.b))
    }
}

impl Default for Colour {
    fn default() -> Self {
        Self::grey(0.92, 1.0)
    }
}

/// Kind of wall opening.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpeningKind {
    /// Hinged door
    Door,
    /// Window
    Window,
    /// Open passage without a door leaf
    Passage,
}

impl OpeningKind {
    pub(crate) fn code(self) -> u8 {
        match self {
            OpeningKind::Door => 0,
            OpeningKind::Window => 1,
            OpeningKind::Passage => 2,
        }
    }

    pub(crate) fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(OpeningKind::Door),
            1 => Some(OpeningKind::Window),
            2 => Some(OpeningKind::Passage),
            _ => None,
        }
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            OpeningKind::Door => "door",
            OpeningKind::Window => "window",
            OpeningKind::Passage => "passage",
        }
    }
}

/// Door, window or passage placed along one wall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Opening {
    /// Opening type
    pub kind: OpeningKind,
    /// Index of the wall in the room boundary
    pub wall: usize,
    /// Distance from the wall start to the opening's near edge (m)
    pub offset: f32,
    /// Opening width along the wall (m)
    pub width: f32,
}

impl Opening {
    /// Create an opening.
    pub fn new(kind: OpeningKind, wall: usize, offset: f32, width: f32) -> Self {
        Self {
            kind,
            wall,
            offset,
            width,
        }
    }

    /// Check that the opening lies on an existing wall of `boundary`.
    pub fn fits(&self, boundary: &RoomBoundary) -> Result<(), String> {
        if !(self.offset.is_finite() && self.width.is_finite()) {
            return Err("opening has non-finite dimensions".into());
        }
        if self.width <= 0.0 || self.offset < 0.0 {
            return Err(format!(
                "opening needs positive width and non-negative offset (offset {:.3}, width {:.3})",
                self.offset, self.width
            ));
        }
        if self.wall >= boundary.len() {
            return Err(format!(
                "wall {} does not exist, room has {} walls",
                self.wall,
                boundary.len()
            ));
        }
        let wall_length = boundary.wall_length(self.wall);
        if self.offset + self.width > wall_length + 1e-4 {
            return Err(format!(
                "{} of {:.2} m at {:.2} m overruns wall {} ({:.2} m)",
                self.kind.as_str(),
                self.width,
                self.offset,
                self.wall,
                wall_length
            ));
        }
        Ok(())
    }
}

/// Editable presentation and survey settings.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RoomSettings {
    /// Rooms sharing a group are drawn on the same plan diagram
    pub group: Option<Uuid>,
    /// Fill colour on plans
    pub colour: Colour,
    /// Ceiling height (m); exporters fall back to the configured default
    pub height: Option<f32>,
    /// Size presentation
    pub area_display: AreaDisplay,
    /// Wall line style
    pub wall_style: WallStyle,
    /// Replaces the configured subtitle under the room name
    pub custom_subtitle: Option<String>,
    /// Survey answers, kept in key order
    pub answers: BTreeMap<String, String>,
}

/// One room, plot or exterior outline within a property.
#[derive(Clone, Debug, PartialEq)]
pub struct Room {
    id: RoomId,
    name: String,
    floor: String,
    kind: RoomKind,
    created_at_ms: u64,
    scan_method: Option<ScanMethod>,
    boundary: Option<RoomBoundary>,
    openings: Vec<Opening>,
    settings: RoomSettings,
}

impl Room {
    pub(crate) fn new(
        id: RoomId,
        name: String,
        floor: String,
        kind: RoomKind,
        created_at_ms: u64,
    ) -> Self {
        Self {
            id,
            name,
            floor,
            kind,
            created_at_ms,
            scan_method: None,
            boundary: None,
            openings: Vec::new(),
            settings: RoomSettings::default(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        id: RoomId,
        name: String,
        floor: String,
        kind: RoomKind,
        created_at_ms: u64,
        scan_method: Option<ScanMethod>,
        boundary: Option<RoomBoundary>,
        openings: Vec<Opening>,
        settings: RoomSettings,
    ) -> Self {
        Self {
            id,
            name,
            floor,
            kind,
            created_at_ms,
            scan_method,
            boundary,
            openings,
            settings,
        }
    }

    /// Identifier.
    pub fn id(&self) -> RoomId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Floor label.
    pub fn floor(&self) -> &str {
        &self.floor
    }

    /// Room, plot or exterior.
    pub fn kind(&self) -> RoomKind {
        self.kind
    }

    /// Creation time, milliseconds since the Unix epoch.
    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    /// Method of the committed scan, if any.
    pub fn scan_method(&self) -> Option<ScanMethod> {
        self.scan_method
    }

    /// Committed outline, if the room has been scanned.
    pub fn boundary(&self) -> Option<&RoomBoundary> {
        self.boundary.as_ref()
    }

    /// Room has a committed outline.
    pub fn is_scanned(&self) -> bool {
        self.boundary.is_some()
    }

    /// Doors, windows and passages.
    pub fn openings(&self) -> &[Opening] {
        &self.openings
    }

    /// Presentation settings.
    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    pub(crate) fn settings_mut(&mut self) -> &mut RoomSettings {
        &mut self.settings
    }

    /// Floor area (m²) of the committed outline.
    pub fn area(&self) -> Option<f32> {
        self.boundary.as_ref().map(RoomBoundary::area)
    }

    /// Total wall area (m²) when both outline and height are known.
    pub fn wall_area(&self) -> Option<f32> {
        Some(self.boundary.as_ref()?.perimeter() * self.settings.height?)
    }

    /// Write a committed outline; only scan sessions call this.
    pub(crate) fn commit_boundary(&mut self, boundary: RoomBoundary, method: ScanMethod) {
        // Openings refer to wall indices of the previous outline
        self.openings.clear();
        self.boundary = Some(boundary);
        self.scan_method = Some(method);
    }

    pub(crate) fn push_opening(&mut self, opening: Opening) {
        self.openings.push(opening);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point2D;

    fn square() -> RoomBoundary {
        RoomBoundary::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0, 0.0),
            Point2D::new(2.0, 2.0),
            Point2D::new(0.0, 2.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_kind_codes() {
        for kind in [RoomKind::Room, RoomKind::Plot, RoomKind::Exterior] {
            assert_eq!(RoomKind::from_code(kind.code()), Some(kind));
            assert_eq!(kind.as_str().parse::<RoomKind>(), Ok(kind));
        }
        assert_eq!(RoomKind::from_code(0), None);
    }

    #[test]
    fn test_opening_fits() {
        let boundary = square();
        assert!(Opening::new(OpeningKind::Door, 0, 0.5, 0.9).fits(&boundary).is_ok());
        assert!(Opening::new(OpeningKind::Window, 1, 1.5, 0.9).fits(&boundary).is_err());
        assert!(Opening::new(OpeningKind::Door, 4, 0.0, 0.5).fits(&boundary).is_err());
        assert!(Opening::new(OpeningKind::Door, 0, 0.0, 0.0).fits(&boundary).is_err());
    }

    #[test]
    fn test_colour_over_white() {
        let (r, g, b) = Colour::rgba(0.0, 0.5, 1.0, 0.5).over_white();
        assert_eq!((r, g, b), (0.5, 0.75, 1.0));
    }

    #[test]
    fn test_wall_area_needs_height() {
        let mut room = Room::new(
            RoomId(1),
            "Hall".into(),
            "Ground Floor".into(),
            RoomKind::Room,
            0,
        );
        room.commit_boundary(square(), ScanMethod::WallTouch);
        assert_eq!(room.wall_area(), None);
        room.settings_mut().height = Some(2.5);
        assert_eq!(room.wall_area(), Some(20.0));
        assert_eq!(room.area(), Some(4.0));
    }
}
