//! Minimal ZIP writer: stored (uncompressed) entries, fixed timestamps.
//!
//! Layout per entry: local file header (30 bytes + name) followed by the
//! data; then one central directory record per entry (46 bytes + name) and
//! the end-of-central-directory record (22 bytes).

use crate::core::checksum::crc32;

const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIG: u32 = 0x0201_4b50;
const END_OF_CENTRAL_SIG: u32 = 0x0605_4b50;

/// ZIP 2.0
const VERSION: u16 = 20;

/// 1980-01-01 00:00, the earliest DOS timestamp
const DOS_TIME: u16 = 0;
const DOS_DATE: u16 = (1 << 5) | 1;

struct Entry {
    name: String,
    crc: u32,
    size: u32,
    offset: u32,
}

/// Archive under construction.
#[derive(Default)]
pub(crate) struct ZipWriter {
    buf: Vec<u8>,
    entries: Vec<Entry>,
}

impl ZipWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a stored file.
    pub(crate) fn add_file(&mut self, name: &str, data: &[u8]) -> Result<(), String> {
        let size = u32::try_from(data.len()).map_err(|_| format!("{} is too large", name))?;
        let offset =
            u32::try_from(self.buf.len()).map_err(|_| "archive is too large".to_string())?;
        let name_len =
            u16::try_from(name.len()).map_err(|_| format!("entry name {} is too long", name))?;
        let crc = crc32(data);

        put_u32(&mut self.buf, LOCAL_HEADER_SIG);
        put_u16(&mut self.buf, VERSION);
        put_u16(&mut self.buf, 0); // flags
        put_u16(&mut self.buf, 0); // stored
        put_u16(&mut self.buf, DOS_TIME);
        put_u16(&mut self.buf, DOS_DATE);
        put_u32(&mut self.buf, crc);
        put_u32(&mut self.buf, size);
        put_u32(&mut self.buf, size);
        put_u16(&mut self.buf, name_len);
        put_u16(&mut self.buf, 0); // extra length
        self.buf.extend_from_slice(name.as_bytes());
        self.buf.extend_from_slice(data);

        self.entries.push(Entry {
            name: name.to_string(),
            crc,
            size,
            offset,
        });
        Ok(())
    }

    /// Write the central directory and return the archive bytes.
    pub(crate) fn finish(mut self) -> Result<Vec<u8>, String> {
        let directory_offset =
            u32::try_from(self.buf.len()).map_err(|_| "archive is too large".to_string())?;
        let count = u16::try_from(self.entries.len()).map_err(|_| "too many entries".to_string())?;

        for entry in &self.entries {
            put_u32(&mut self.buf, CENTRAL_HEADER_SIG);
            put_u16(&mut self.buf, VERSION); // made by
            put_u16(&mut self.buf, VERSION); // needed
            put_u16(&mut self.buf, 0);
            put_u16(&mut self.buf, 0);
            put_u16(&mut self.buf, DOS_TIME);
            put_u16(&mut self.buf, DOS_DATE);
            put_u32(&mut self.buf, entry.crc);
            put_u32(&mut self.buf, entry.size);
            put_u32(&mut self.buf, entry.size);
            put_u16(&mut self.buf, entry.name.len() as u16);
            put_u16(&mut self.buf, 0); // extra
            put_u16(&mut self.buf, 0); // comment
            put_u16(&mut self.buf, 0); // disk
            put_u16(&mut self.buf, 0); // internal attributes
            put_u32(&mut self.buf, 0); // external attributes
            put_u32(&mut self.buf, entry.offset);
            self.buf.extend_from_slice(entry.name.as_bytes());
        }

        let directory_size = self.buf.len() as u32 - directory_offset;
        put_u32(&mut self.buf, END_OF_CENTRAL_SIG);
        put_u16(&mut self.buf, 0);
        put_u16(&mut self.buf, 0);
        put_u16(&mut self.buf, count);
        put_u16(&mut self.buf, count);
        put_u32(&mut self.buf, directory_size);
        put_u32(&mut self.buf, directory_offset);
        put_u16(&mut self.buf, 0); // comment length
        Ok(self.buf)
    }
}

fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Stored entries of an archive written by [`ZipWriter`], as (name, data).
#[cfg(test)]
pub(crate) fn read_stored(archive: &[u8]) -> Vec<(String, Vec<u8>)> {
    let u16_at = |i: usize| u16::from_le_bytes([archive[i], archive[i + 1]]) as usize;
    let u32_at = |i: usize| {
        u32::from_le_bytes([archive[i], archive[i + 1], archive[i + 2], archive[i + 3]]) as usize
    };

    let end = archive.len() - 22;
    assert_eq!(u32_at(end), END_OF_CENTRAL_SIG as usize);
    let count = u16_at(end + 10);
    let mut pos = u32_at(end + 16);

    let mut files = Vec::new();
    for _ in 0..count {
        assert_eq!(u32_at(pos), CENTRAL_HEADER_SIG as usize);
        let crc = u32_at(pos + 16) as u32;
        let size = u32_at(pos + 24);
        let name_len = u16_at(pos + 28);
        let local = u32_at(pos + 42);
        let name = String::from_utf8(archive[pos + 46..pos + 46 + name_len].to_vec()).unwrap();

        assert_eq!(u32_at(local), LOCAL_HEADER_SIG as usize);
        let data_start = local + 30 + u16_at(local + 26) + u16_at(local + 28);
        let data = archive[data_start..data_start + size].to_vec();
        assert_eq!(crc32(&data), crc);
        files.push((name, data));
        pos += 46 + name_len;
    }
    files
}
