//! Scan session on a dedicated thread.
//!
//! Capture keeps feeding segments while the caller saves or exports on its
//! own thread. Commands go in over a bounded channel; every command produces
//! exactly one [`ScanEvent`]. The thread exits once the session reaches a
//! terminal state or the command sender is dropped.

use std::io;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use log::{debug, error};

use super::ScanMethod;
use super::session::{FeedOutcome, ScanSession, SessionError, SessionState};
use crate::geometry::{RoomBoundary, Segment};
use crate::property::RoomId;

/// Request for the worker's session.
#[derive(Clone, Debug)]
pub enum ScanCommand {
    Start(ScanMethod),
    Feed(Segment),
    Commit,
    Cancel,
}

/// Reply to one [`ScanCommand`].
#[derive(Clone, Debug, PartialEq)]
pub enum ScanEvent {
    Started(ScanMethod),
    Fed(FeedOutcome),
    Committed(RoomBoundary),
    Cancelled,
    Failed(SessionError),
}

/// Handle to a scan worker thread.
pub struct ScanWorker {
    room: RoomId,
    commands: Option<Sender<ScanCommand>>,
    events: Receiver<ScanEvent>,
    handle: Option<JoinHandle<SessionState>>,
}

impl ScanWorker {
    /// Move `session` onto a new thread with a command queue of `capacity`.
    pub fn spawn(session: ScanSession, capacity: usize) -> io::Result<Self> {
        let room = session.room();
        let (command_tx, command_rx) = bounded(capacity.max(1));
        let (event_tx, event_rx) = unbounded();

        let handle = thread::Builder::new()
            .name(format!("scan-{}", room.value()))
            .spawn(move || run_session(session, command_rx, event_tx))?;

        Ok(Self {
            room,
            commands: Some(command_tx),
            events: event_rx,
            handle: Some(handle),
        })
    }

    /// Room being scanned.
    pub fn room(&self) -> RoomId {
        self.room
    }

    /// Queue a command; blocks while the queue is full.
    pub fn send(&self, command: ScanCommand) -> Result<(), SessionError> {
        self.commands
            .as_ref()
            .ok_or(SessionError::WorkerStopped)?
            .send(command)
            .map_err(|_| SessionError::WorkerStopped)
    }

    /// Next event, blocking until one arrives.
    pub fn recv(&self) -> Result<ScanEvent, SessionError> {
        self.events.recv().map_err(|_| SessionError::WorkerStopped)
    }

    /// Event stream for callers that select over several sources.
    pub fn events(&self) -> &Receiver<ScanEvent> {
        &self.events
    }

    /// Send a command and wait for its reply.
    pub fn request(&self, command: ScanCommand) -> Result<ScanEvent, SessionError> {
        self.send(command)?;
        self.recv()
    }

    /// Start recording.
    pub fn start(&self, method: ScanMethod) -> Result<(), SessionError> {
        match self.request(ScanCommand::Start(method))? {
            ScanEvent::Failed(err) => Err(err),
            _ => Ok(()),
        }
    }

    /// Feed one segment and wait for the outcome.
    pub fn feed(&self, segment: Segment) -> Result<FeedOutcome, SessionError> {
        match self.request(ScanCommand::Feed(segment))? {
            ScanEvent::Fed(outcome) => Ok(outcome),
            ScanEvent::Failed(err) => Err(err),
            other => Err(unexpected(other)),
        }
    }

    /// Commit and wait for the written boundary.
    pub fn commit(&self) -> Result<RoomBoundary, SessionError> {
        match self.request(ScanCommand::Commit)? {
            ScanEvent::Committed(boundary) => Ok(boundary),
            ScanEvent::Failed(err) => Err(err),
            other => Err(unexpected(other)),
        }
    }

    /// Cancel the scan.
    pub fn cancel(&self) -> Result<(), SessionError> {
        match self.request(ScanCommand::Cancel)? {
            ScanEvent::Cancelled => Ok(()),
            ScanEvent::Failed(err) => Err(err),
            other => Err(unexpected(other)),
        }
    }

    /// Close the command queue and wait for the thread; returns the final
    /// session state.
    pub fn join(mut self) -> Result<SessionState, SessionError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<SessionState, SessionError> {
        self.commands = None;
        let handle = self.handle.take().ok_or(SessionError::WorkerStopped)?;
        handle.join().map_err(|e| {
            error!("Scan worker for {} panicked: {:?}", self.room, e);
            SessionError::WorkerStopped
        })
    }
}

impl Drop for ScanWorker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.shutdown();
        }
    }
}

fn unexpected(event: ScanEvent) -> SessionError {
    error!("Unexpected scan worker reply: {:?}", event);
    SessionError::WorkerStopped
}

fn run_session(
    mut session: ScanSession,
    commands: Receiver<ScanCommand>,
    events: Sender<ScanEvent>,
) -> SessionState {
    debug!("Scan worker for {} started", session.room());

    for command in commands.iter() {
        let event = match command {
            ScanCommand::Start(method) => match session.start(method) {
                Ok(()) => ScanEvent::Started(method),
                Err(err) => ScanEvent::Failed(err),
            },
            ScanCommand::Feed(segment) => match session.feed(segment) {
                Ok(outcome) => ScanEvent::Fed(outcome),
                Err(err) => ScanEvent::Failed(err),
            },
            ScanCommand::Commit => match session.commit() {
                Ok(boundary) => ScanEvent::Committed(boundary),
                Err(err) => ScanEvent::Failed(err),
            },
            ScanCommand::Cancel => match session.cancel() {
                Ok(()) => ScanEvent::Cancelled,
                Err(err) => ScanEvent::Failed(err),
            },
        };

        if events.send(event).is_err() {
            break;
        }
        if session.state().is_terminal() {
            break;
        }
    }

    let state = session.state();
    debug!("Scan worker for {} finished in {:?}", session.room(), state);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanSection;
    use crate::core::Point2D;
    use crate::property::{PropertyDocument, RoomKind};
    use crate::scan::RoomLocks;
    use parking_lot::RwLock;
    use std::sync::Arc;

    fn wall(x0: f32, y0: f32, x1: f32, y1: f32) -> Segment {
        Segment::between(Point2D::new(x0, y0), Point2D::new(x1, y1))
    }

    #[test]
    fn test_worker_commits_into_document() {
        let mut doc = PropertyDocument::new("unused.rugsfile");
        let room = doc.add_room("Porch", "Ground Floor", RoomKind::Room);
        let doc = Arc::new(RwLock::new(doc));
        let locks = RoomLocks::new();

        let session = ScanSession::new(&doc, &locks, room, ScanSection::default()).unwrap();
        let worker = ScanWorker::spawn(session, 4).unwrap();
        worker.start(ScanMethod::WallTouch).unwrap();
        for segment in [
            wall(0.0, 0.0, 2.0, 0.0),
            wall(2.0, 0.0, 2.0, 1.5),
            wall(2.0, 1.5, 0.0, 1.5),
            wall(0.0, 1.5, 0.0, 0.0),
        ] {
            assert!(matches!(
                worker.feed(segment).unwrap(),
                FeedOutcome::Accepted(_)
            ));
        }

        // Document stays readable while the worker holds the session
        assert!(!doc.read().room(room).unwrap().is_scanned());

        let boundary = worker.commit().unwrap();
        assert!((boundary.area() - 3.0).abs() < 1e-3);
        assert_eq!(worker.join().unwrap(), SessionState::Committed);
        assert!(doc.read().room(room).unwrap().is_scanned());
        assert!(!locks.is_held(room));
    }

    #[test]
    fn test_worker_stops_after_cancel() {
        let mut doc = PropertyDocument::new("unused.rugsfile");
        let room = doc.add_room("Loft", "Top", RoomKind::Room);
        let doc = Arc::new(RwLock::new(doc));
        let locks = RoomLocks::new();

        let session = ScanSession::new(&doc, &locks, room, ScanSection::default()).unwrap();
        let worker = ScanWorker::spawn(session, 1).unwrap();
        worker.start(ScanMethod::RoomPlan).unwrap();
        worker.cancel().unwrap();

        assert_eq!(
            worker.feed(wall(0.0, 0.0, 1.0, 0.0)),
            Err(SessionError::WorkerStopped)
        );
        assert_eq!(worker.join().unwrap(), SessionState::Cancelled);
    }

    #[test]
    fn test_failed_command_reports_error() {
        let mut doc = PropertyDocument::new("unused.rugsfile");
        let room = doc.add_room("Shed", "Garden", RoomKind::Room);
        let doc = Arc::new(RwLock::new(doc));
        let locks = RoomLocks::new();

        let session = ScanSession::new(&doc, &locks, room, ScanSection::default()).unwrap();
        let worker = ScanWorker::spawn(session, 2).unwrap();
        assert!(matches!(
            worker.commit(),
            Err(SessionError::NotReady { .. })
        ));
        drop(worker);
        assert!(!locks.is_held(room));
    }
}
