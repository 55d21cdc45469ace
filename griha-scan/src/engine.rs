//! Property engine: owns the open property and hands out scan sessions.
//!
//! The document sits behind `Arc<RwLock<_>>`. Room edits, commits and saves
//! take the write lock; exports take the read lock and therefore always see
//! a consistent snapshot. Sessions only hold a weak reference, so closing
//! the property invalidates them instead of keeping it alive.

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::config::GrihaConfig;
use crate::error::{Error, Result};
use crate::export::{self, ExportFormat, ExportResult};
use crate::property::{IoError, PropertyDocument, RoomEditError, RoomId, RoomKind, RoomOverlap};
use crate::scan::{RoomLocks, ScanMethod, ScanSession, ScanWorker};

/// Open property plus the set of rooms currently being scanned.
struct PropertyHandle {
    document: Arc<RwLock<PropertyDocument>>,
    locks: RoomLocks,
}

impl PropertyHandle {
    fn new(document: PropertyDocument) -> Self {
        Self {
            document: Arc::new(RwLock::new(document)),
            locks: RoomLocks::new(),
        }
    }
}

/// Entry point for creating, scanning and exporting a property.
pub struct PropertyEngine {
    config: GrihaConfig,
    handle: Option<PropertyHandle>,
}

impl PropertyEngine {
    /// Engine with no property open.
    pub fn new(config: GrihaConfig) -> Self {
        Self {
            config,
            handle: None,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &GrihaConfig {
        &self.config
    }

    /// Create a new property file at `path` and open it.
    ///
    /// Fails if the file already exists; callers decide between create and
    /// load.
    pub fn create_property(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let document = PropertyDocument::create(path.as_ref())?;
        self.open(document);
        Ok(())
    }

    /// Load the property file at `path` and open it.
    pub fn load_property(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let document = PropertyDocument::load(path.as_ref())?;
        self.open(document);
        Ok(())
    }

    fn open(&mut self, document: PropertyDocument) {
        if let Some(previous) = self.handle.take() {
            warn!(
                "Closing {} to open {}",
                previous.document.read().path().display(),
                document.path().display()
            );
        }
        self.handle = Some(PropertyHandle::new(document));
    }

    /// Close the open property without saving. Live sessions for it fail
    /// on commit with [`SessionError::DocumentClosed`](crate::scan::SessionError::DocumentClosed).
    pub fn close_property(&mut self) -> Result<()> {
        self.handle.take().map(|_| ()).ok_or(Error::NoProperty)
    }

    /// Shared handle to the open document.
    pub fn property(&self) -> Result<Arc<RwLock<PropertyDocument>>> {
        Ok(Arc::clone(&self.handle()?.document))
    }

    /// Whether a property is open.
    pub fn has_property(&self) -> bool {
        self.handle.is_some()
    }

    fn handle(&self) -> Result<&PropertyHandle> {
        self.handle.as_ref().ok_or(Error::NoProperty)
    }

    /// Add a room to `floor`, creating the floor if needed.
    pub fn add_room(&self, name: &str, floor: &str, kind: RoomKind) -> Result<RoomId> {
        let handle = self.handle()?;
        let id = handle.document.write().add_room(name, floor, kind);
        info!("Added {} '{}' on {} as {}", kind, name, floor, id);
        Ok(id)
    }

    /// Idle session pinning `room`.
    pub fn new_scan_session(&self, room: RoomId) -> Result<ScanSession> {
        let handle = self.handle()?;
        Ok(ScanSession::new(
            &handle.document,
            &handle.locks,
            room,
            self.config.scan.clone(),
        )?)
    }

    /// Session for `room`, already recording with `method`.
    pub fn start_scan(&self, room: RoomId, method: ScanMethod) -> Result<ScanSession> {
        let mut session = self.new_scan_session(room)?;
        session.start(method)?;
        Ok(session)
    }

    /// Recording session for `room` on its own worker thread.
    pub fn spawn_scan_worker(&self, room: RoomId, method: ScanMethod) -> Result<ScanWorker> {
        let session = self.start_scan(room, method)?;
        Ok(ScanWorker::spawn(session, self.config.scan.worker_queue)?)
    }

    /// Put `rooms` into a fresh plan group so they share one diagram.
    ///
    /// Either every room is regrouped or, on an unknown id, none is.
    pub fn group_rooms(&self, rooms: &[RoomId]) -> Result<Uuid> {
        let handle = self.handle()?;
        let mut document = handle.document.write();
        if let Some(missing) = rooms.iter().find(|id| document.room(**id).is_none()) {
            return Err(RoomEditError::UnknownRoom(*missing).into());
        }

        let group = Uuid::new_v4();
        for id in rooms {
            document.room_settings_mut(*id)?.group = Some(group);
        }
        info!("Grouped {} rooms as {}", rooms.len(), group);
        Ok(group)
    }

    /// Atomically write the open property to its path.
    pub fn save(&self) -> Result<()> {
        let handle = self.handle()?;
        let document = handle.document.write();
        document.save()?;
        Ok(())
    }

    /// Encode a consistent snapshot of the open property.
    pub fn export(&self, format: ExportFormat) -> Result<ExportResult> {
        let handle = self.handle()?;
        let document = handle.document.read();
        Ok(export::export(&document, format, &self.config.export))
    }

    /// Export and write the bytes to `output`.
    ///
    /// An export without bytes is an error carrying its message; on success
    /// the returned message holds any warnings.
    pub fn export_to(&self, format: ExportFormat, output: &Path) -> Result<Option<String>> {
        let result = self.export(format)?;
        let Some(bytes) = result.bytes else {
            let message = result
                .message
                .unwrap_or_else(|| format!("{} produced no output", format));
            warn!("Nothing written for {}: {}", format, message);
            return Err(Error::ExportFailed(message));
        };
        std::fs::write(output, &bytes).map_err(|e| IoError::from_io(output, e))?;
        info!("Wrote {} ({} bytes)", output.display(), bytes.len());
        Ok(result.message)
    }

    /// First pair of overlapping rooms on any floor.
    pub fn find_overlapping_rooms(&self) -> Result<Option<RoomOverlap>> {
        Ok(self.handle()?.document.read().find_overlapping_rooms())
    }
}
