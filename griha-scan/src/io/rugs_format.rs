//! Native `.rugsfile` binary format for property persistence.
//!
//! Format (all integers and floats little-endian):
//! - Header (16 bytes):
//!   - Magic: "RUGSPROP" (8 bytes)
//!   - Version: u16
//!   - Reserved: u16 (zero)
//!   - Payload length: u32
//! - Payload (see [`encode`])
//! - Trailer: CRC-32 of the payload (u32)
//!
//! Strings are a u32 byte length followed by UTF-8. Optional values carry a
//! u8 presence flag. Encoding is deterministic: the same document always
//! produces the same bytes.

use std::collections::{BTreeMap, HashSet};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::core::Point2D;
use crate::core::checksum::crc32;
use crate::geometry::RoomBoundary;
use crate::property::{
    AreaDisplay, Colour, DocumentError, Floor, FormatError, IoError, Opening, OpeningKind,
    PropertyDetails, PropertyDocument, Room, RoomId, RoomKind, RoomSettings, WallStyle,
};
use crate::scan::ScanMethod;

/// Magic bytes for .rugsfile format
pub const MAGIC: &[u8; 8] = b"RUGSPROP";

/// Current format version
pub const VERSION: u16 = 1;

/// Header size in bytes
pub const HEADER_SIZE: usize = 16;

const TRAILER_SIZE: usize = 4;

/// Scan method byte for "not scanned"
const NO_METHOD: u8 = 0xFF;

/// Atomically save a document: write a sibling temp file, sync, rename.
pub fn save_rugs(document: &PropertyDocument, path: &Path) -> Result<(), IoError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".rugs-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| IoError::from_io(dir, e))?;

    write_rugs(document, temp.as_file_mut()).map_err(|e| IoError::from_io(path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| IoError::from_io(path, e))?;
    temp.persist(path)
        .map_err(|e| IoError::from_io(path, e.error))?;
    Ok(())
}

/// Write a document to a writer in .rugsfile format.
pub fn write_rugs<W: Write>(document: &PropertyDocument, writer: &mut W) -> std::io::Result<()> {
    writer.write_all(&encode(document))?;
    writer.flush()
}

/// Load a document from a .rugsfile.
pub fn load_rugs(path: &Path) -> Result<PropertyDocument, DocumentError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::from_io(path, e))?;
    read_rugs(path.to_path_buf(), &mut file)
}

/// Read a document from a reader; `path` becomes the document's save path.
pub fn read_rugs<R: Read>(path: PathBuf, reader: &mut R) -> Result<PropertyDocument, DocumentError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| IoError::from_io(&path, e))?;
    Ok(decode(path, &bytes)?)
}

/// Encode a document to file bytes.
///
/// Payload layout:
/// - details: street, town, postal code, country, notes (strings)
/// - next room id (u32)
/// - floor count (u32), then per floor: name, room count (u32), rooms
/// - per room: id (u32), name, kind (u8), created at ms (u64), scan method
///   (u8, 0xFF = none), settings, boundary vertex count (u32, 0 = none) with
///   x/y f32 pairs, opening count (u32) with kind (u8), wall (u32), offset
///   and width (f32)
pub fn encode(document: &PropertyDocument) -> Vec<u8> {
    let mut out = ByteWriter::default();

    let details = document.details();
    for field in [
        &details.street,
        &details.town,
        &details.postal_code,
        &details.country,
        &details.notes,
    ] {
        out.put_str(field);
    }

    out.put_u32(document.next_room_id());
    out.put_len(document.floors().len());
    for floor in document.floors() {
        out.put_str(floor.name());
        out.put_len(floor.rooms().len());
        for room in floor.rooms() {
            encode_room(&mut out, room);
        }
    }

    let payload = out.into_inner();
    let mut file = Vec::with_capacity(HEADER_SIZE + payload.len() + TRAILER_SIZE);
    file.extend_from_slice(MAGIC);
    file.extend_from_slice(&VERSION.to_le_bytes());
    file.extend_from_slice(&0u16.to_le_bytes());
    file.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    file.extend_from_slice(&payload);
    file.extend_from_slice(&crc32(&payload).to_le_bytes());
    file
}

fn encode_room(out: &mut ByteWriter, room: &Room) {
    out.put_u32(room.id().value());
    out.put_str(room.name());
    out.put_u8(room.kind().code());
    out.put_u64(room.created_at_ms());
    out.put_u8(room.scan_method().map_or(NO_METHOD, ScanMethod::code));

    let settings = room.settings();
    match settings.group {
        Some(group) => {
            out.put_u8(1);
            out.put_bytes(group.as_bytes());
        }
        None => out.put_u8(0),
    }
    let c = settings.colour;
    for component in [c.r, c.g, c.b, c.a] {
        out.put_f32(component);
    }
    match settings.height {
        Some(height) => {
            out.put_u8(1);
            out.put_f32(height);
        }
        None => out.put_u8(0),
    }
    out.put_u8(settings.area_display.code());
    out.put_u8(settings.wall_style.code());
    match &settings.custom_subtitle {
        Some(subtitle) => {
            out.put_u8(1);
            out.put_str(subtitle);
        }
        None => out.put_u8(0),
    }
    out.put_len(settings.answers.len());
    for (key, value) in &settings.answers {
        out.put_str(key);
        out.put_str(value);
    }

    match room.boundary() {
        Some(boundary) => {
            out.put_len(boundary.len());
            for v in boundary.vertices() {
                out.put_f32(v.x);
                out.put_f32(v.y);
            }
        }
        None => out.put_u32(0),
    }

    out.put_len(room.openings().len());
    for opening in room.openings() {
        out.put_u8(opening.kind.code());
        out.put_len(opening.wall);
        out.put_f32(opening.offset);
        out.put_f32(opening.width);
    }
}

/// Decode file bytes into a document bound to `path`.
///
/// The document is only built once every field has been read and
/// validated, so a failure never yields partial state.
pub fn decode(path: PathBuf, bytes: &[u8]) -> Result<PropertyDocument, FormatError> {
    if bytes.len() < MAGIC.len() || &bytes[..MAGIC.len()] != MAGIC {
        return Err(corrupt("not a property file (bad magic)"));
    }
    if bytes.len() < HEADER_SIZE {
        return Err(corrupt("truncated header"));
    }

    let version = u16::from_le_bytes([bytes[8], bytes[9]]);
    if version != VERSION {
        return Err(FormatError::UnsupportedVersion {
            found: version,
            supported: VERSION,
        });
    }

    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;
    let expected_len = HEADER_SIZE
        .checked_add(payload_len)
        .and_then(|n| n.checked_add(TRAILER_SIZE));
    if expected_len != Some(bytes.len()) {
        return Err(corrupt(format!(
            "payload length {} does not match file size {}",
            payload_len,
            bytes.len()
        )));
    }

    let payload = &bytes[HEADER_SIZE..HEADER_SIZE + payload_len];
    let trailer = &bytes[HEADER_SIZE + payload_len..];
    let stored = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let computed = crc32(payload);
    if stored != computed {
        return Err(corrupt(format!(
            "checksum mismatch (stored {:08x}, computed {:08x})",
            stored, computed
        )));
    }

    decode_payload(path, payload)
}

fn decode_payload(path: PathBuf, payload: &[u8]) -> Result<PropertyDocument, FormatError> {
    let mut input = ByteReader::new(payload);

    let details = PropertyDetails {
        street: input.get_str()?,
        town: input.get_str()?,
        postal_code: input.get_str()?,
        country: input.get_str()?,
        notes: input.get_str()?,
    };

    let next_room_id = input.get_u32()?;
    let floor_count = input.get_len()?;

    let mut floor_names = HashSet::new();
    let mut room_ids = HashSet::new();
    let mut floors = Vec::new();
    for _ in 0..floor_count {
        let name = input.get_str()?;
        if !floor_names.insert(name.clone()) {
            return Err(corrupt(format!("duplicate floor '{}'", name)));
        }

        let room_count = input.get_len()?;
        let mut rooms = Vec::new();
        for _ in 0..room_count {
            let room = decode_room(&mut input, &name)?;
            let id = room.id();
            if id.value() >= next_room_id {
                return Err(corrupt(format!(
                    "{} is not below next id {}",
                    id, next_room_id
                )));
            }
            if !room_ids.insert(id) {
                return Err(corrupt(format!("duplicate {}", id)));
            }
            rooms.push(room);
        }
        floors.push(Floor::new(name, rooms));
    }

    if input.remaining() != 0 {
        return Err(corrupt(format!(
            "{} trailing bytes after last floor",
            input.remaining()
        )));
    }

    Ok(PropertyDocument::from_parts(
        path,
        details,
        floors,
        next_room_id,
    ))
}

fn decode_room(input: &mut ByteReader<'_>, floor: &str) -> Result<Room, FormatError> {
    let id = RoomId(input.get_u32()?);
    let name = input.get_str()?;
    let kind_code = input.get_u8()?;
    let kind = RoomKind::from_code(kind_code)
        .ok_or_else(|| corrupt(format!("{}: unknown room kind {}", id, kind_code)))?;
    let created_at_ms = input.get_u64()?;
    let method_code = input.get_u8()?;
    let scan_method = match method_code {
        NO_METHOD => None,
        code => Some(
            ScanMethod::from_code(code)
                .ok_or_else(|| corrupt(format!("{}: unknown scan method {}", id, code)))?,
        ),
    };

    let group = match input.get_flag()? {
        true => {
            let raw = input.get_bytes(16)?;
            let mut uuid = [0u8; 16];
            uuid.copy_from_slice(raw);
            Some(Uuid::from_bytes(uuid))
        }
        false => None,
    };
    let colour = Colour {
        r: input.get_f32()?,
        g: input.get_f32()?,
        b: input.get_f32()?,
        a: input.get_f32()?,
    };
    let height = match input.get_flag()? {
        true => Some(input.get_f32()?),
        false => None,
    };
    let area_display = AreaDisplay::from_code(input.get_u8()?)
        .ok_or_else(|| corrupt(format!("{}: unknown area display", id)))?;
    let wall_style = WallStyle::from_code(input.get_u8()?)
        .ok_or_else(|| corrupt(format!("{}: unknown wall style", id)))?;
    let custom_subtitle = match input.get_flag()? {
        true => Some(input.get_str()?),
        false => None,
    };
    let answer_count = input.get_len()?;
    let mut answers = BTreeMap::new();
    for _ in 0..answer_count {
        let key = input.get_str()?;
        let value = input.get_str()?;
        if answers.insert(key, value).is_some() {
            return Err(corrupt(format!("{}: duplicate survey answer", id)));
        }
    }

    let vertex_count = input.get_len()?;
    let boundary = match vertex_count {
        0 => None,
        n => {
            let mut vertices = Vec::new();
            for _ in 0..n {
                vertices.push(Point2D::new(input.get_f32()?, input.get_f32()?));
            }
            Some(
                RoomBoundary::new(vertices)
                    .map_err(|e| corrupt(format!("{} '{}': {}", id, name, e)))?,
            )
        }
    };

    let opening_count = input.get_len()?;
    let mut openings = Vec::new();
    for _ in 0..opening_count {
        let kind_code = input.get_u8()?;
        let kind = OpeningKind::from_code(kind_code)
            .ok_or_else(|| corrupt(format!("{}: unknown opening kind {}", id, kind_code)))?;
        let wall = input.get_u32()? as usize;
        let opening = Opening::new(kind, wall, input.get_f32()?, input.get_f32()?);
        let boundary = boundary
            .as_ref()
            .ok_or_else(|| corrupt(format!("{}: opening on unscanned room", id)))?;
        opening
            .fits(boundary)
            .map_err(|e| corrupt(format!("{}: {}", id, e)))?;
        openings.push(opening);
    }

    let settings = RoomSettings {
        group,
        colour,
        height,
        area_display,
        wall_style,
        custom_subtitle,
        answers,
    };

    Ok(Room::restore(
        id,
        name,
        floor.to_string(),
        kind,
        created_at_ms,
        scan_method,
        boundary,
        openings,
        settings,
    ))
}

fn corrupt(message: impl Into<String>) -> FormatError {
    FormatError::Corrupt(message.into())
}

/// Little-endian payload builder.
#[derive(Default)]
struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn put_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn put_len(&mut self, n: usize) {
        self.put_u32(n as u32);
    }

    fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn put_str(&mut self, s: &str) {
        self.put_len(s.len());
        self.put_bytes(s.as_bytes());
    }
}

/// Bounds-checked payload cursor.
struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn get_bytes(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        if n > self.remaining() {
            return Err(corrupt(format!(
                "unexpected end of payload at byte {} (wanted {} more)",
                self.pos, n
            )));
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn get_array<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.get_bytes(N)?);
        Ok(array)
    }

    fn get_u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.get_bytes(1)?[0])
    }

    fn get_flag(&mut self) -> Result<bool, FormatError> {
        match self.get_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(corrupt(format!("invalid flag byte {}", other))),
        }
    }

    fn get_u32(&mut self) -> Result<u32, FormatError> {
        Ok(u32::from_le_bytes(self.get_array()?))
    }

    fn get_u64(&mut self) -> Result<u64, FormatError> {
        Ok(u64::from_le_bytes(self.get_array()?))
    }

    fn get_f32(&mut self) -> Result<f32, FormatError> {
        Ok(f32::from_le_bytes(self.get_array()?))
    }

    /// Element count; every element takes at least one byte, so anything
    /// larger than the remaining payload is corrupt.
    fn get_len(&mut self) -> Result<usize, FormatError> {
        let n = self.get_u32()? as usize;
        if n > self.remaining() {
            return Err(corrupt(format!(
                "count {} exceeds remaining payload {}",
                n,
                self.remaining()
            )));
        }
        Ok(n)
    }

    fn get_str(&mut self) -> Result<String, FormatError> {
        let len = self.get_len()?;
        let bytes = self.get_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| corrupt("string is not valid UTF-8"))
    }
}
