//! Property documents: floors, rooms, settings and file errors.

mod document;
mod error;
mod room;

pub use document::{Floor, PropertyDetails, PropertyDocument, RoomOverlap};
pub use error::{DocumentError, FormatError, IoError, RoomEditError};
pub use room::{
    AreaDisplay, Colour, Opening, OpeningKind, Room, RoomId, RoomKind, RoomSettings, WallStyle,
};
