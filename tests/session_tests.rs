// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the capture session controller

mod common;

use std::sync::Arc;

use arcam_core::session::CaptureSessionController;
use arcam_core::session::types::{CameraFrame, FacingMode};
use arcam_core::store::ResultStore;

use common::{FakeBackend, init_tracing};

fn controller(backend: Arc<FakeBackend>) -> (CaptureSessionController, ResultStore) {
    let store = ResultStore::new();
    (
        CaptureSessionController::new(backend, store.clone()),
        store,
    )
}

#[tokio::test]
async fn test_start_acquires_requested_facing() {
    init_tracing();
    let backend = Arc::new(FakeBackend::new());
    let (mut session, store) = controller(Arc::clone(&backend));

    session
        .start(FacingMode::Environment)
        .await
        .expect("start should succeed");

    let state = store.snapshot();
    assert!(state.is_camera_ready);
    assert_eq!(state.facing_mode, FacingMode::Environment);
    assert_eq!(
        backend.opened.lock().unwrap().as_slice(),
        &[FacingMode::Environment]
    );
}

#[tokio::test]
async fn test_back_camera_failure_falls_back_to_front_once() {
    init_tracing();
    let backend = Arc::new(FakeBackend::failing_environment());
    let (mut session, store) = controller(Arc::clone(&backend));

    session
        .start(FacingMode::Environment)
        .await
        .expect("fallback should succeed");

    let state = store.snapshot();
    assert!(state.is_camera_ready);
    assert_eq!(
        state.facing_mode,
        FacingMode::User,
        "facing mode should reflect the stream actually acquired"
    );
    assert_eq!(
        backend.opened.lock().unwrap().as_slice(),
        &[FacingMode::Environment, FacingMode::User],
        "exactly one fallback attempt"
    );
}

#[tokio::test]
async fn test_start_fails_when_no_camera_available() {
    init_tracing();
    let backend = Arc::new(FakeBackend {
        fail_environment: true,
        fail_user: true,
        ..FakeBackend::new()
    });
    let (mut session, store) = controller(backend);

    let result = session.start(FacingMode::Environment).await;
    assert!(result.is_err(), "no camera should mean a failed start");
    assert!(!store.snapshot().is_camera_ready);
}

#[tokio::test]
async fn test_restart_releases_previous_stream() {
    init_tracing();
    let backend = Arc::new(FakeBackend::new());
    let (mut session, _store) = controller(Arc::clone(&backend));

    session.start(FacingMode::Environment).await.unwrap();
    session.start(FacingMode::User).await.unwrap();

    assert_eq!(
        backend.stop_count(),
        1,
        "previous stream should be released before reacquiring"
    );
    assert!(session.is_ready());
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    init_tracing();
    let backend = Arc::new(FakeBackend::new());
    let (mut session, store) = controller(Arc::clone(&backend));

    session.start(FacingMode::Environment).await.unwrap();
    session.stop();
    session.stop();

    assert_eq!(backend.stop_count(), 1);
    assert!(!store.snapshot().is_camera_ready);
    assert!(session.frames().is_none());
}

#[tokio::test]
async fn test_front_camera_capture_is_mirrored() {
    init_tracing();
    let backend = Arc::new(FakeBackend::new());
    let (mut session, _store) = controller(Arc::clone(&backend));
    session.start(FacingMode::User).await.unwrap();

    // Left pixel 1, right pixel 2
    let frame = CameraFrame::rgba(2, 1, vec![1, 0, 0, 255, 2, 0, 0, 255]);
    backend.push_frame(frame);

    let still = session.capture_still().expect("frame should be available");
    assert_eq!(
        still.data[0], 2,
        "front camera capture should be mirrored horizontally"
    );

    let detection = session
        .detection_frame()
        .expect("frame should be available");
    assert_eq!(
        detection.data[0], 1,
        "detection frames must keep sensor orientation"
    );
}

#[tokio::test]
async fn test_back_camera_capture_is_not_mirrored() {
    init_tracing();
    let backend = Arc::new(FakeBackend::new());
    let (mut session, _store) = controller(Arc::clone(&backend));
    session.start(FacingMode::Environment).await.unwrap();

    let frame = CameraFrame::rgba(2, 1, vec![1, 0, 0, 255, 2, 0, 0, 255]);
    backend.push_frame(frame);

    let still = session.capture_still().expect("frame should be available");
    assert_eq!(still.data[0], 1, "back camera capture keeps orientation");
}

#[tokio::test]
async fn test_torch_unsupported_is_an_error() {
    init_tracing();
    // Default fake capabilities report no torch
    let backend = Arc::new(FakeBackend::new());
    let (mut session, store) = controller(backend);
    session.start(FacingMode::Environment).await.unwrap();

    assert!(session.set_torch(true).is_err());
    assert!(!store.snapshot().torch_on);
}

#[tokio::test]
async fn test_zoom_without_capabilities_is_a_noop() {
    init_tracing();
    let backend = Arc::new(FakeBackend {
        caps: arcam_core::session::types::StreamCapabilities {
            zoom: None,
            has_torch: false,
        },
        ..FakeBackend::new()
    });
    let (mut session, store) = controller(backend);
    session.start(FacingMode::Environment).await.unwrap();

    session
        .set_zoom(3.0)
        .expect("zoom without a range should be absorbed");
    assert_eq!(store.snapshot().zoom, 1.0, "zoom should stay at default");
}
