//! Scan session state machine.
//!
//! ```text
//!  Idle ──start──► Recording ◄──feed──► ReadyToClose ──commit──► Committed
//!                      │                     │
//!                      └──cancel / fatal─────┴──────────────────► Cancelled
//! ```
//!
//! A session pins its room for its whole lifetime. The room's outline is
//! only written by a successful [`ScanSession::commit`].

use std::sync::{Arc, Weak};

use log::{debug, info, warn};
use parking_lot::RwLock;
use thiserror::Error;

use super::ScanMethod;
use super::lease::{RoomLease, RoomLocks};
use crate::config::ScanSection;
use crate::geometry::{BuilderStatus, GeometryError, RoomBoundary, RoomGraphBuilder, Segment};
use crate::property::{PropertyDocument, RoomId};

/// Lifecycle state of a scan session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
    ReadyToClose,
    Committed,
    Cancelled,
}

impl SessionState {
    /// Committed or cancelled.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Committed | SessionState::Cancelled)
    }
}

/// Scan session failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("outline is not ready to close (session is {state:?})")]
    NotReady { state: SessionState },

    #[error("{0} is already being scanned")]
    RoomBusy(RoomId),

    #[error("cannot {operation} while session is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("{0} is not part of this property")]
    UnknownRoom(RoomId),

    #[error("property document is no longer open")]
    DocumentClosed,

    #[error("scan failed: {0}")]
    Geometry(#[from] GeometryError),

    #[error("scan worker has stopped")]
    WorkerStopped,
}

/// Result of feeding one segment.
#[derive(Clone, Debug, PartialEq)]
pub enum FeedOutcome {
    /// Segment extended the outline
    Accepted(BuilderStatus),
    /// Segment was dropped; the outline is unchanged
    Rejected(GeometryError),
}

impl FeedOutcome {
    /// Outline can be committed after this segment.
    pub fn is_ready_to_close(&self) -> bool {
        matches!(self, FeedOutcome::Accepted(status) if status.is_ready_to_close())
    }
}

/// One scan of one room.
pub struct ScanSession {
    document: Weak<RwLock<PropertyDocument>>,
    room: RoomId,
    config: ScanSection,
    lease: Option<RoomLease>,
    method: Option<ScanMethod>,
    builder: Option<RoomGraphBuilder>,
    state: SessionState,
}

impl ScanSession {
    /// Create a session for `room`, pinning it against concurrent scans.
    pub fn new(
        document: &Arc<RwLock<PropertyDocument>>,
        locks: &RoomLocks,
        room: RoomId,
        config: ScanSection,
    ) -> Result<Self, SessionError> {
        if document.read().room(room).is_none() {
            return Err(SessionError::UnknownRoom(room));
        }
        let lease = locks.acquire(room).ok_or(SessionError::RoomBusy(room))?;
        debug!("Scan session created for {}", room);

        Ok(Self {
            document: Arc::downgrade(document),
            room,
            config,
            lease: Some(lease),
            method: None,
            builder: None,
            state: SessionState::Idle,
        })
    }

    /// Scanned room.
    pub fn room(&self) -> RoomId {
        self.room
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Session still pins its room.
    pub fn holds_room(&self) -> bool {
        self.lease.is_some()
    }

    /// Capture method, once started.
    pub fn method(&self) -> Option<ScanMethod> {
        self.method
    }

    /// Builder progress while recording.
    pub fn status(&self) -> Option<BuilderStatus> {
        self.builder.as_ref().map(RoomGraphBuilder::status)
    }

    /// Accumulated join drift (m) while recording.
    pub fn drift(&self) -> Option<f32> {
        self.builder.as_ref().map(RoomGraphBuilder::drift)
    }

    /// Begin recording with `method`.
    pub fn start(&mut self, method: ScanMethod) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(self.invalid("start"));
        }
        let tolerances = self.config.tolerances_for(method);
        debug!(
            "{}: {} join tolerance {:.3} m",
            self.room, method, tolerances.join
        );
        self.builder = Some(RoomGraphBuilder::new(tolerances));
        self.method = Some(method);
        self.state = SessionState::Recording;
        info!("Scan of {} started ({})", self.room, method);
        Ok(())
    }

    /// Offer the next measured wall.
    ///
    /// Disjoint and degenerate walls are rejected without changing the
    /// session. A non-finite wall cancels the session.
    pub fn feed(&mut self, segment: Segment) -> Result<FeedOutcome, SessionError> {
        if !matches!(
            self.state,
            SessionState::Recording | SessionState::ReadyToClose
        ) {
            return Err(self.invalid("feed"));
        }
        let result = match self.builder.as_mut() {
            Some(builder) => builder.add_segment(segment),
            None => return Err(self.invalid("feed")),
        };

        match result {
            Ok(status) => {
                self.state = if status.is_ready_to_close() {
                    SessionState::ReadyToClose
                } else {
                    SessionState::Recording
                };
                Ok(FeedOutcome::Accepted(status))
            }
            Err(err) if err.is_recoverable() => {
                warn!("{}: segment rejected: {}", self.room, err);
                Ok(FeedOutcome::Rejected(err))
            }
            Err(err) => {
                warn!("{}: scan aborted: {}", self.room, err);
                self.abort();
                Err(SessionError::Geometry(err))
            }
        }
    }

    /// Finalize the outline and write it into the room.
    ///
    /// Only valid in [`SessionState::ReadyToClose`]; otherwise nothing is
    /// touched. A finalize failure cancels the session without writing.
    pub fn commit(&mut self) -> Result<RoomBoundary, SessionError> {
        if self.state != SessionState::ReadyToClose {
            return Err(SessionError::NotReady { state: self.state });
        }
        let (Some(builder), Some(method)) = (self.builder.as_ref(), self.method) else {
            return Err(SessionError::NotReady { state: self.state });
        };
        let finalized = builder.finalize();

        let Some(document) = self.document.upgrade() else {
            self.abort();
            return Err(SessionError::DocumentClosed);
        };

        let boundary = match finalized {
            Ok(boundary) => boundary,
            Err(err) => {
                warn!("{}: outline could not be closed: {}", self.room, err);
                self.abort();
                return Err(SessionError::Geometry(err));
            }
        };

        let written = document
            .write()
            .commit_boundary(self.room, boundary.clone(), method);
        if !written {
            self.abort();
            return Err(SessionError::UnknownRoom(self.room));
        }

        self.builder = None;
        self.lease = None;
        self.state = SessionState::Committed;
        info!(
            "Scan of {} committed: {} walls, {:.2} m²",
            self.room,
            boundary.len(),
            boundary.area()
        );
        Ok(boundary)
    }

    /// Discard the captured outline; the room keeps its previous state.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if self.state.is_terminal() {
            return Err(self.invalid("cancel"));
        }
        self.abort();
        info!("Scan of {} cancelled", self.room);
        Ok(())
    }

    fn abort(&mut self) {
        self.builder = None;
        self.lease = None;
        self.state = SessionState::Cancelled;
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidState {
            operation,
            state: self.state,
        }
    }
}

impl std::fmt::Debug for ScanSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSession")
            .field("room", &self.room)
            .field("method", &self.method)
            .field("state", &self.state)
            .field("segments", &self.builder.as_ref().map(|b| b.segments().len()))
            .finish()
    }
}
