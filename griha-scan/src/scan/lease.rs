//! Per-room exclusivity for scan sessions.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::property::RoomId;

/// Set of rooms currently pinned by a scan session.
#[derive(Clone, Debug, Default)]
pub struct RoomLocks {
    held: Arc<Mutex<HashSet<RoomId>>>,
}

impl RoomLocks {
    /// Empty lock set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `room`; `None` if another lease already holds it.
    pub fn acquire(&self, room: RoomId) -> Option<RoomLease> {
        if self.held.lock().insert(room) {
            Some(RoomLease {
                room,
                held: Arc::clone(&self.held),
            })
        } else {
            None
        }
    }

    /// Whether a lease on `room` is alive.
    pub fn is_held(&self, room: RoomId) -> bool {
        self.held.lock().contains(&room)
    }
}

/// Exclusive claim on one room, released on drop.
#[derive(Debug)]
pub struct RoomLease {
    room: RoomId,
    held: Arc<Mutex<HashSet<RoomId>>>,
}

impl RoomLease {
    /// Pinned room.
    pub fn room(&self) -> RoomId {
        self.room
    }
}

impl Drop for RoomLease {
    fn drop(&mut self) {
        self.held.lock().remove(&self.room);
    }
}
