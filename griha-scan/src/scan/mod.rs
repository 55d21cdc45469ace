//! Scan sessions: one capture of one room.
//!
//! - [`ScanSession`]: state machine driving a [`RoomGraphBuilder`](crate::geometry::RoomGraphBuilder)
//! - [`RoomLocks`]: at most one live session per room
//! - [`ScanWorker`]: session on its own thread, driven over channels

mod lease;
mod method;
mod session;
mod worker;

pub use lease::{RoomLease, RoomLocks};
pub use method::ScanMethod;
pub use session::{FeedOutcome, ScanSession, SessionError, SessionState};
pub use worker::{ScanCommand, ScanEvent, ScanWorker};
