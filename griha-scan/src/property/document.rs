//! The property document: floors, rooms and details.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};

use super::error::{DocumentError, IoError, RoomEditError};
use super::room::{AreaDisplay, Opening, Room, RoomId, RoomKind, RoomSettings};
use crate::geometry::RoomBoundary;
use crate::io::rugs_format;
use crate::scan::ScanMethod;

/// Postal details of the surveyed property.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyDetails {
    pub street: String,
    pub town: String,
    pub postal_code: String,
    pub country: String,
    pub notes: String,
}

impl PropertyDetails {
    /// Single-line address, skipping empty parts.
    pub fn address_line(&self) -> String {
        [&self.street, &self.town, &self.postal_code, &self.country]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Named floor holding rooms in insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct Floor {
    name: String,
    rooms: Vec<Room>,
}

impl Floor {
    pub(crate) fn new(name: String, rooms: Vec<Room>) -> Self {
        Self { name, rooms }
    }

    /// Floor label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rooms in insertion order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Summed area of scanned rooms, skipping rooms set to
    /// [`AreaDisplay::Exclude`] and non-room outlines.
    pub fn area(&self) -> f32 {
        self.rooms
            .iter()
            .filter(|r| r.kind() == RoomKind::Room)
            .filter(|r| r.settings().area_display != AreaDisplay::Exclude)
            .filter_map(Room::area)
            .sum()
    }
}

/// Two rooms on one floor whose outlines overlap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomOverlap {
    pub floor: String,
    pub first: RoomId,
    pub second: RoomId,
}

/// A property: ordered floors of rooms plus address details.
///
/// Held behind `Arc<RwLock<_>>` by [`PropertyEngine`](crate::PropertyEngine);
/// room outlines are only written through a committed scan session.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDocument {
    path: PathBuf,
    details: PropertyDetails,
    floors: Vec<Floor>,
    next_room_id: u32,
}

impl PropertyDocument {
    /// Empty, unsaved document bound to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            details: PropertyDetails::default(),
            floors: Vec::new(),
            next_room_id: 1,
        }
    }

    pub(crate) fn from_parts(
        path: PathBuf,
        details: PropertyDetails,
        floors: Vec<Floor>,
        next_room_id: u32,
    ) -> Self {
        Self {
            path,
            details,
            floors,
            next_room_id,
        }
    }

    /// Create a new property file at `path` and write the empty document.
    ///
    /// Fails with [`IoError::AlreadyExists`] if anything exists at `path`.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, IoError> {
        let path = path.into();
        // Reserve the name; the atomic save below replaces the empty file.
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| IoError::from_io(&path, e))?;

        let document = Self::new(path).fill_reserved(Self::save)?;
        info!("Created property at {}", document.path.display());
        Ok(document)
    }

    /// Run the first write over a reserved empty file, removing the file
    /// again if the write fails.
    fn fill_reserved(
        self,
        write: impl FnOnce(&Self) -> Result<(), IoError>,
    ) -> Result<Self, IoError> {
        if let Err(err) = write(&self) {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!("Could not remove {}: {}", self.path.display(), e);
            }
            return Err(err);
        }
        Ok(self)
    }

    /// Load a property file. Nothing is returned unless the whole file
    /// decodes and validates.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let document = rugs_format::load_rugs(path.as_ref())?;
        info!(
            "Loaded property from {} ({} floors, {} rooms)",
            document.path.display(),
            document.floors.len(),
            document.room_count()
        );
        Ok(document)
    }

    /// Atomically write the document to its path.
    pub fn save(&self) -> Result<(), IoError> {
        rugs_format::save_rugs(self, &self.path)?;
        debug!("Saved property to {}", self.path.display());
        Ok(())
    }

    /// Encoded file contents, as [`save`](Self::save) would write them.
    pub fn to_bytes(&self) -> Vec<u8> {
        rugs_format::encode(self)
    }

    /// File path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Address details.
    pub fn details(&self) -> &PropertyDetails {
        &self.details
    }

    /// Mutable address details.
    pub fn details_mut(&mut self) -> &mut PropertyDetails {
        &mut self.details
    }

    /// Floors in insertion order.
    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    /// Floor by label.
    pub fn floor(&self, name: &str) -> Option<&Floor> {
        self.floors.iter().find(|f| f.name == name)
    }

    /// All rooms, floor by floor.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> + '_ {
        self.floors.iter().flat_map(|f| f.rooms.iter())
    }

    /// Total number of rooms.
    pub fn room_count(&self) -> usize {
        self.floors.iter().map(|f| f.rooms.len()).sum()
    }

    /// Rooms with a committed outline.
    pub fn scanned_rooms(&self) -> impl Iterator<Item = &Room> + '_ {
        self.rooms().filter(|r| r.is_scanned())
    }

    /// Room by id.
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms().find(|r| r.id() == id)
    }

    /// First room matching `name` on `floor`.
    pub fn find_room(&self, name: &str, floor: &str) -> Option<&Room> {
        self.floor(floor)?.rooms.iter().find(|r| r.name() == name)
    }

    pub(crate) fn next_room_id(&self) -> u32 {
        self.next_room_id
    }

    fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.floors
            .iter_mut()
            .flat_map(|f| f.rooms.iter_mut())
            .find(|r| r.id() == id)
    }

    /// Add a room to `floor`, creating the floor if needed.
    pub fn add_room(&mut self, name: &str, floor: &str, kind: RoomKind) -> RoomId {
        let id = RoomId(self.next_room_id);
        self.next_room_id += 1;

        let created_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let room = Room::new(id, name.to_string(), floor.to_string(), kind, created_at_ms);

        match self.floors.iter_mut().find(|f| f.name == floor) {
            Some(existing) => existing.rooms.push(room),
            None => self.floors.push(Floor::new(floor.to_string(), vec![room])),
        }
        debug!("Added {} '{}' on '{}' as {}", kind, name, floor, id);
        id
    }

    /// Mutable presentation settings of a room.
    pub fn room_settings_mut(&mut self, id: RoomId) -> Result<&mut RoomSettings, RoomEditError> {
        self.room_mut(id)
            .map(Room::settings_mut)
            .ok_or(RoomEditError::UnknownRoom(id))
    }

    /// Place a door, window or passage on a scanned room's wall.
    pub fn add_opening(&mut self, id: RoomId, opening: Opening) -> Result<(), RoomEditError> {
        let room = self.room_mut(id).ok_or(RoomEditError::UnknownRoom(id))?;
        let boundary = room.boundary().ok_or(RoomEditError::NotScanned(id))?;
        opening.fits(boundary).map_err(RoomEditError::InvalidOpening)?;
        room.push_opening(opening);
        Ok(())
    }

    /// Write a finalized outline into a room. Returns false for an unknown id.
    pub(crate) fn commit_boundary(
        &mut self,
        id: RoomId,
        boundary: RoomBoundary,
        method: ScanMethod,
    ) -> bool {
        match self.room_mut(id) {
            Some(room) => {
                room.commit_boundary(boundary, method);
                true
            }
            None => false,
        }
    }

    /// Summed floor area (m²) honouring each room's area display setting.
    pub fn floor_area(&self, floor: &str) -> f32 {
        self.floor(floor).map(Floor::area).unwrap_or(0.0)
    }

    /// First pair of overlapping rooms on the same floor.
    ///
    /// Only scanned rooms of kind [`RoomKind::Room`] are compared; walls
    /// shared between neighbours do not count.
    pub fn find_overlapping_rooms(&self) -> Option<RoomOverlap> {
        for floor in &self.floors {
            let outlines: Vec<(RoomId, &RoomBoundary)> = floor
                .rooms
                .iter()
                .filter(|r| r.kind() == RoomKind::Room)
                .filter_map(|r| r.boundary().map(|b| (r.id(), b)))
                .collect();

            for (i, (first, a)) in outlines.iter().enumerate() {
                for (second, b) in &outlines[i + 1..] {
                    if a.overlaps(b) {
                        return Some(RoomOverlap {
                            floor: floor.name.clone(),
                            first: *first,
                            second: *second,
                        });
                    }
                }
            }
        }
        None
    }
}
