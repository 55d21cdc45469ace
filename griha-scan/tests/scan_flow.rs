//! End-to-end scanning: sessions, workers and the first export.

mod common;

use approx::assert_relative_eq;
use common::*;

use griha_scan::{
    Error, ExportFormat, FeedOutcome, GeometryError, Point2D, RoomKind, ScanMethod, Segment,
    SegmentLog, SessionError, SessionState,
};

#[test]
fn test_rectangle_scan_exports_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(&dir);
    let room = engine
        .add_room("My Room", "Ground Floor", RoomKind::Room)
        .unwrap();

    let mut session = engine.start_scan(room, ScanMethod::WallTouch).unwrap();
    let mut last = None;
    for segment in walls(&rectangle_corners(0.0, 0.0, 3.0, 4.0)) {
        last = Some(session.feed(segment).unwrap());
    }
    assert!(last.unwrap().is_ready_to_close());
    assert_eq!(session.state(), SessionState::ReadyToClose);

    let boundary = session.commit().unwrap();
    assert_eq!(session.state(), SessionState::Committed);
    assert_relative_eq!(boundary.area(), 12.0, epsilon = 1e-3);
    assert_relative_eq!(boundary.perimeter(), 14.0, epsilon = 1e-3);

    let result = engine.export(ExportFormat::Pdf).unwrap();
    let bytes = result.bytes.expect("pdf bytes");
    assert!(bytes.starts_with(b"%PDF-1.4"));
    assert_eq!(result.message, None);
}

#[test]
fn test_double_start_is_room_busy() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(&dir);
    let room = engine.add_room("Hall", "Ground Floor", RoomKind::Room).unwrap();

    let _first = engine.start_scan(room, ScanMethod::WallTouch).unwrap();
    match engine.start_scan(room, ScanMethod::BrickMode) {
        Err(Error::Session(SessionError::RoomBusy(busy))) => assert_eq!(busy, room),
        other => panic!("expected RoomBusy, got {:?}", other.map(|s| s.state())),
    }

    // Another room is unaffected
    let other = engine.add_room("Study", "Ground Floor", RoomKind::Room).unwrap();
    assert!(engine.start_scan(other, ScanMethod::WallTouch).is_ok());
}

#[test]
fn test_commit_before_ready_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(&dir);
    let room = engine.add_room("Hall", "Ground Floor", RoomKind::Room).unwrap();
    let document = engine.property().unwrap();
    let before = document.read().to_bytes();

    let mut session = engine.new_scan_session(room).unwrap();
    assert_eq!(
        session.commit(),
        Err(SessionError::NotReady {
            state: SessionState::Idle
        })
    );

    session.start(ScanMethod::WallTouch).unwrap();
    for segment in walls(&rectangle_corners(0.0, 0.0, 3.0, 4.0)).into_iter().take(2) {
        session.feed(segment).unwrap();
    }
    assert_eq!(
        session.commit(),
        Err(SessionError::NotReady {
            state: SessionState::Recording
        })
    );
    assert_eq!(session.state(), SessionState::Recording);
    assert_eq!(document.read().to_bytes(), before);
}

#[test]
fn test_cancel_leaves_room_as_before() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(&dir);
    let room = scan_room(
        &engine,
        "Kitchen",
        "Ground Floor",
        RoomKind::Room,
        &rectangle_corners(0.0, 0.0, 3.0, 4.0),
    );
    let document = engine.property().unwrap();
    let before = document.read().room(room).unwrap().clone();

    let mut session = engine.start_scan(room, ScanMethod::RoomPlan).unwrap();
    for segment in walls(&l_shape_corners()) {
        session.feed(segment).unwrap();
    }
    assert_eq!(session.state(), SessionState::ReadyToClose);
    session.cancel().unwrap();

    assert_eq!(session.state(), SessionState::Cancelled);
    assert!(!session.holds_room());
    assert_eq!(document.read().room(room).unwrap(), &before);
    assert_eq!(
        session.cancel(),
        Err(SessionError::InvalidState {
            operation: "cancel",
            state: SessionState::Cancelled
        })
    );
}

#[test]
fn test_disjoint_wall_rejected_then_recovered() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(&dir);
    let room = engine.add_room("Hall", "Ground Floor", RoomKind::Room).unwrap();
    let mut session = engine.start_scan(room, ScanMethod::WallTouch).unwrap();

    let good = walls(&rectangle_corners(0.0, 0.0, 2.0, 2.0));
    session.feed(good[0]).unwrap();
    let stray = Segment::between(Point2D::new(5.0, 5.0), Point2D::new(6.0, 5.0));
    match session.feed(stray).unwrap() {
        FeedOutcome::Rejected(GeometryError::Disjoint { .. }) => {}
        other => panic!("expected disjoint rejection, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Recording);

    for segment in &good[1..] {
        session.feed(*segment).unwrap();
    }
    let boundary = session.commit().unwrap();
    assert_eq!(boundary.len(), 4);
}

#[test]
fn test_noisy_outline_closes_with_exact_angle_sum() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(&dir);

    for (seed, corners) in [
        (7, rectangle_corners(0.0, 0.0, 3.0, 4.0)),
        (11, l_shape_corners()),
        (23, rectangle_corners(-2.0, 1.0, 6.5, 2.5)),
    ] {
        let room = engine
            .add_room(&format!("Room {}", seed), "Ground Floor", RoomKind::Room)
            .unwrap();
        let mut session = engine.start_scan(room, ScanMethod::WallTouch).unwrap();
        for segment in noisy_walls(&corners, 0.02, seed) {
            assert!(matches!(
                session.feed(segment).unwrap(),
                FeedOutcome::Accepted(_)
            ));
        }
        let boundary = session.commit().unwrap();

        let n = boundary.len() as f32;
        assert_eq!(boundary.len(), corners.len());
        assert_relative_eq!(angle_sum_deg(&boundary), (n - 2.0) * 180.0, epsilon = 0.5);
        for angle in boundary.interior_angles() {
            let deg = angle.to_degrees();
            assert!(
                (deg - 90.0).abs() < 0.01 || (deg - 270.0).abs() < 0.01,
                "corner {} was not squared",
                deg
            );
        }
        let exact = polygon_area(&corners);
        assert_relative_eq!(boundary.area(), exact, max_relative = 0.05);
    }
}

#[test]
fn test_worker_scan_while_saving() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(&dir);
    let room = engine.add_room("Lounge", "Ground Floor", RoomKind::Room).unwrap();

    let worker = engine.spawn_scan_worker(room, ScanMethod::BrickMode).unwrap();
    let segments = walls(&rectangle_corners(0.0, 0.0, 4.0, 5.0));
    for segment in &segments[..2] {
        worker.feed(*segment).unwrap();
    }

    // Saving and exporting do not wait for the live capture
    engine.save().unwrap();
    assert!(!engine.export(ExportFormat::Pdf).unwrap().is_success());

    for segment in &segments[2..] {
        worker.feed(*segment).unwrap();
    }
    let boundary = worker.commit().unwrap();
    assert_relative_eq!(boundary.area(), 20.0, epsilon = 1e-3);
    assert_eq!(worker.join().unwrap(), SessionState::Committed);

    let document = engine.property().unwrap();
    let method = document.read().room(room).unwrap().scan_method();
    assert_eq!(method, Some(ScanMethod::BrickMode));
    assert!(engine.start_scan(room, ScanMethod::WallTouch).is_ok());
}

#[test]
fn test_capture_thread_overlaps_save_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(&dir);
    scan_room(
        &engine,
        "Kitchen",
        "Ground Floor",
        RoomKind::Room,
        &rectangle_corners(0.0, 0.0, 3.0, 4.0),
    );
    let room = engine.add_room("Hall", "Ground Floor", RoomKind::Room).unwrap();

    let worker = engine.spawn_scan_worker(room, ScanMethod::WallTouch).unwrap();
    let segments = walls(&rectangle_corners(3.0, 0.0, 2.0, 4.0));
    let (mid_tx, mid_rx) = crossbeam_channel::bounded(1);

    let capture = std::thread::spawn(move || {
        for (i, segment) in segments.into_iter().enumerate() {
            let outcome = worker.feed(segment)?;
            assert!(matches!(outcome, FeedOutcome::Accepted(_)));
            if i == 1 {
                let _ = mid_tx.send(());
            }
        }
        let boundary = worker.commit()?;
        worker.join()?;
        Ok::<_, SessionError>(boundary)
    });

    // Capture is underway; keep saving and exporting until it ends
    mid_rx.recv().unwrap();
    let mut rounds = 0;
    while rounds == 0 || !capture.is_finished() {
        engine.save().unwrap();
        let pdf = engine.export(ExportFormat::Pdf).unwrap();
        assert!(pdf.is_success(), "{:?}", pdf.message);
        rounds += 1;
    }

    let boundary = capture.join().unwrap().unwrap();
    assert_relative_eq!(boundary.area(), 8.0, epsilon = 1e-3);

    engine.save().unwrap();
    let reloaded = griha_scan::PropertyDocument::load(property_path(&dir)).unwrap();
    assert!(reloaded.room(room).unwrap().is_scanned());
    assert_eq!(reloaded.scanned_rooms().count(), 2);
}

#[test]
fn test_segment_log_drives_scan() {
    let yaml = r#"
name: "Box room"
method: room_plan
segments:
  - { start: [0.0, 0.0], end: [2.5, 0.0] }
  - { start: [2.52, 0.01], end: [2.5, 2.0] }
  - { start: [2.5, 2.0], end: [0.0, 2.0] }
  - { start: [3.0, 9.0], end: [3.0, 12.0] }
  - { start: [0.0, 2.0], end: [0.0, 0.03], confidence: 0.8 }
"#;
    let log = SegmentLog::from_yaml(yaml).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(&dir);
    let room = engine.add_room(&log.name, "Ground Floor", RoomKind::Room).unwrap();

    let mut session = engine
        .start_scan(room, log.method.unwrap_or(ScanMethod::WallTouch))
        .unwrap();
    let outcomes: Vec<FeedOutcome> = log
        .to_segments()
        .into_iter()
        .map(|s| session.feed(s).unwrap())
        .collect();
    assert!(matches!(outcomes[3], FeedOutcome::Rejected(_)));
    assert!(outcomes[4].is_ready_to_close());

    let boundary = session.commit().unwrap();
    assert_eq!(boundary.len(), 4);
    assert_relative_eq!(boundary.area(), 5.0, max_relative = 0.02);
}
