// SPDX-License-Identifier: GPL-3.0-only

//! Shared observable result store
//!
//! The store holds everything the view layer renders: current mode, camera
//! readiness, zoom state and the latest detection results. It is an explicit,
//! injectable object rather than process-global state, so several sessions
//! (e.g. in tests) can run independently. Observation goes through a watch
//! channel: `snapshot()` for the current value, `subscribe()` for changes.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

use crate::artifact::{ArSnapshot, PhotoStill, VideoClip};
use crate::constants::defaults;
use crate::services::{LandmarkPoint, ObjectDetails};
use crate::session::types::{FacingMode, ZoomCapabilities};

/// Camera modes
///
/// Exactly one mode is active at a time. Qr, Ar and Smile arm a periodic
/// detection task; Photo, Video and Text do not (text translation runs
/// on demand against a captured still).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Mode {
    #[default]
    Photo,
    Video,
    Qr,
    Ar,
    Text,
    Smile,
}

impl Mode {
    /// All modes, for UI iteration
    pub const ALL: [Mode; 6] = [
        Mode::Photo,
        Mode::Video,
        Mode::Qr,
        Mode::Ar,
        Mode::Text,
        Mode::Smile,
    ];
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Photo => write!(f, "PHOTO"),
            Mode::Video => write!(f, "VIDEO"),
            Mode::Qr => write!(f, "QR"),
            Mode::Ar => write!(f, "AR"),
            Mode::Text => write!(f, "TEXT"),
            Mode::Smile => write!(f, "SMILE"),
        }
    }
}

/// Complete observable state of one camera view
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    /// Active camera mode
    pub mode: Mode,
    /// Which physical camera supplies the stream
    pub facing_mode: FacingMode,
    /// True once a stream is live and delivering frames
    pub is_camera_ready: bool,
    /// Applied zoom level
    pub zoom: f64,
    /// Zoom range reported by the device, if any
    pub zoom_capabilities: Option<ZoomCapabilities>,
    /// Whether the device has a controllable torch
    pub has_torch: bool,
    /// Torch state
    pub torch_on: bool,
    /// Decoded QR content; scanning suspends while set
    pub qr_code: Option<String>,
    /// Latest identified object (AR overlay)
    pub ar_object: Option<ObjectDetails>,
    /// Latest face-mesh landmarks (Smile mode)
    pub face_landmarks: Option<Vec<LandmarkPoint>>,
    /// Captured still awaiting review
    pub captured_image: Option<PhotoStill>,
    /// Captured AR snapshot awaiting review
    pub ar_snapshot: Option<ArSnapshot>,
    /// Whether a video recording is in progress
    pub is_recording: bool,
    /// Finished video clip awaiting review
    pub recorded_video: Option<VideoClip>,
    /// Dismissible user notice from a one-shot operation failure
    pub notice: Option<String>,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            mode: Mode::Photo,
            facing_mode: FacingMode::Environment,
            is_camera_ready: false,
            zoom: defaults::ZOOM,
            zoom_capabilities: None,
            has_torch: false,
            torch_on: false,
            qr_code: None,
            ar_object: None,
            face_landmarks: None,
            captured_image: None,
            ar_snapshot: None,
            is_recording: false,
            recorded_video: None,
            notice: None,
        }
    }
}

/// Shared handle to the observable camera state
///
/// Cheap to clone; all clones write to the same underlying channel. Fields
/// are independently settable - invariants such as zoom bounds are enforced
/// by the session controller, not here.
#[derive(Debug, Clone)]
pub struct ResultStore {
    tx: Arc<watch::Sender<CameraState>>,
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(CameraState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Current state snapshot
    pub fn snapshot(&self) -> CameraState {
        self.tx.borrow().clone()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<CameraState> {
        self.tx.subscribe()
    }

    /// Apply a batched mutation as a single observable change
    pub fn update(&self, f: impl FnOnce(&mut CameraState)) {
        self.tx.send_modify(f);
    }

    /// Restore all fields to documented defaults
    pub fn reset(&self) {
        self.tx.send_modify(|state| *state = CameraState::default());
    }

    pub fn set_mode(&self, mode: Mode) {
        self.update(|s| s.mode = mode);
    }

    pub fn set_facing_mode(&self, facing: FacingMode) {
        self.update(|s| s.facing_mode = facing);
    }

    pub fn set_camera_ready(&self, ready: bool) {
        self.update(|s| s.is_camera_ready = ready);
    }

    pub fn set_zoom(&self, zoom: f64) {
        self.update(|s| s.zoom = zoom);
    }

    pub fn set_zoom_capabilities(&self, capabilities: Option<ZoomCapabilities>) {
        self.update(|s| s.zoom_capabilities = capabilities);
    }

    pub fn set_torch_on(&self, on: bool) {
        self.update(|s| s.torch_on = on);
    }

    pub fn set_qr_code(&self, content: String) {
        self.update(|s| s.qr_code = Some(content));
    }

    pub fn clear_qr_code(&self) {
        self.update(|s| s.qr_code = None);
    }

    pub fn set_ar_object(&self, object: Option<ObjectDetails>) {
        self.update(|s| s.ar_object = object);
    }

    pub fn set_face_landmarks(&self, landmarks: Option<Vec<LandmarkPoint>>) {
        self.update(|s| s.face_landmarks = landmarks);
    }

    pub fn set_captured_image(&self, image: Option<PhotoStill>) {
        self.update(|s| s.captured_image = image);
    }

    pub fn set_ar_snapshot(&self, snapshot: Option<ArSnapshot>) {
        self.update(|s| s.ar_snapshot = snapshot);
    }

    pub fn set_recording(&self, recording: bool) {
        self.update(|s| s.is_recording = recording);
    }

    pub fn set_recorded_video(&self, clip: Option<VideoClip>) {
        self.update(|s| s.recorded_video = clip);
    }

    pub fn set_notice(&self, message: impl Into<String>) {
        self.update(|s| s.notice = Some(message.into()));
    }

    pub fn clear_notice(&self) {
        self.update(|s| s.notice = None);
    }
}
