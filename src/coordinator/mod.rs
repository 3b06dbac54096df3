// SPDX-License-Identifier: GPL-3.0-only

//! Mode coordination state machine
//!
//! The coordinator is the single mutator of mode and task-armed state. It
//! guarantees that at most one detection task is armed at any instant:
//! every transition disarms before it arms, and a generation counter
//! invalidates in-flight polls so a result dispatched under an old mode is
//! never committed after the transition.

pub mod tasks;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::artifact::{ArSnapshot, CapturedArtifact, RecordingState};
use crate::constants::{raster, timing};
use crate::errors::{AppError, CameraError, DetectionError, RecordingError};
use crate::media;
use crate::services::{AudioClip, DetectionServices, MediaRecorder, ObjectDetails, Translation};
use crate::session::CaptureSessionController;
use crate::session::types::{CameraBackend, FacingMode};
use crate::store::{Mode, ResultStore};
use tasks::{TaskContext, TaskKind};

/// A currently armed detection task
struct ArmedTask {
    kind: TaskKind,
    handle: JoinHandle<()>,
}

/// Coordinates the capture session, the active mode and its detection task
///
/// In an event-loop model a single owner drives all transitions; in a
/// multi-threaded embedding, wrap the coordinator in one mutex so that
/// transition handling runs to completion before the next one starts.
pub struct ModeCoordinator {
    session: CaptureSessionController,
    services: Arc<dyn DetectionServices>,
    recorder: Option<Arc<dyn MediaRecorder>>,
    store: ResultStore,
    /// Bumped on every disarm/arm; tasks commit results only while their
    /// recorded generation matches
    active_generation: Arc<AtomicU64>,
    task: Option<ArmedTask>,
    recording: RecordingState,
}

impl ModeCoordinator {
    pub fn new(backend: Arc<dyn CameraBackend>, services: Arc<dyn DetectionServices>) -> Self {
        let store = ResultStore::new();
        let session = CaptureSessionController::new(backend, store.clone());
        Self {
            session,
            services,
            recorder: None,
            store,
            active_generation: Arc::new(AtomicU64::new(0)),
            task: None,
            recording: RecordingState::Idle,
        }
    }

    /// Attach a media recorder for Video mode
    pub fn with_recorder(mut self, recorder: Arc<dyn MediaRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// The observable result store
    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// The capture session controller
    pub fn session(&self) -> &CaptureSessionController {
        &self.session
    }

    /// Kind of the currently armed detection task, if any
    pub fn active_task_kind(&self) -> Option<TaskKind> {
        self.task
            .as_ref()
            .filter(|t| !t.handle.is_finished())
            .map(|t| t.kind)
    }

    /// Acquire the camera with the store's facing mode and arm the task for
    /// the current mode
    pub async fn start(&mut self) -> Result<(), CameraError> {
        let facing = self.store.snapshot().facing_mode;
        self.session.start(facing).await?;
        self.arm_task_for_current_mode();
        Ok(())
    }

    /// Switch the active mode.
    ///
    /// Stops any active detection task and recording, clears transient
    /// results that pin user attention, then arms the new mode's task.
    pub async fn set_mode(&mut self, mode: Mode) {
        let current = self.store.snapshot().mode;
        if current == mode {
            return;
        }
        info!(from = %current, to = %mode, "Switching camera mode");

        if self.recording.is_recording() {
            if let Err(e) = self.stop_recording().await {
                warn!(error = %e, "Failed to stop recording on mode change");
            }
        }
        self.disarm_task();
        self.store.update(|s| {
            s.qr_code = None;
            s.ar_object = None;
            s.face_landmarks = None;
            s.mode = mode;
        });
        self.arm_task_for_current_mode();
    }

    /// Switch to the given facing direction.
    ///
    /// Disarms the task, clears detection results, tears the session down,
    /// re-acquires with the new facing and re-arms. The mode itself is
    /// preserved; results from the other camera are not.
    pub async fn set_facing_mode(&mut self, facing: FacingMode) -> Result<(), CameraError> {
        info!(%facing, "Switching camera facing");
        self.disarm_task();
        self.store.update(|s| {
            s.qr_code = None;
            s.ar_object = None;
            s.face_landmarks = None;
        });
        // start() releases the old stream and resets readiness/zoom/torch
        let result = self.session.start(facing).await;
        if result.is_ok() {
            self.arm_task_for_current_mode();
        }
        result
    }

    /// Toggle between front and back camera
    pub async fn flip_facing_mode(&mut self) -> Result<(), CameraError> {
        let facing = self.store.snapshot().facing_mode.toggled();
        self.set_facing_mode(facing).await
    }

    /// Apply a zoom value. Unsupported constraints are absorbed (log-only).
    pub fn set_zoom(&mut self, value: f64) {
        if let Err(e) = self.session.set_zoom(value) {
            debug!(error = %e, value, "Zoom change not applied");
        }
    }

    /// Switch the torch. Unsupported constraints are absorbed (log-only).
    pub fn set_torch(&mut self, on: bool) {
        if let Err(e) = self.session.set_torch(on) {
            debug!(error = %e, on, "Torch change not applied");
        }
    }

    /// Dismiss a decoded QR result and resume scanning.
    ///
    /// Scanning only ever resumes through this explicit dismissal or a mode
    /// change.
    pub fn dismiss_qr_code(&mut self) {
        self.store.clear_qr_code();
        if self.store.snapshot().mode == Mode::Qr {
            self.disarm_task();
            self.arm_task_for_current_mode();
        }
    }

    /// Dismiss the captured still
    pub fn dismiss_captured_image(&mut self) {
        self.store.set_captured_image(None);
    }

    /// Dismiss the AR snapshot
    pub fn dismiss_ar_snapshot(&mut self) {
        self.store.set_ar_snapshot(None);
    }

    /// Dismiss the recorded clip
    pub fn dismiss_recorded_video(&mut self) {
        self.store.set_recorded_video(None);
    }

    /// Dismiss the failure notice
    pub fn dismiss_notice(&mut self) {
        self.store.clear_notice();
    }

    /// Capture a still for the current mode.
    ///
    /// In AR mode with an identified object this produces an annotated
    /// snapshot; in QR mode capturing has no meaning and errors.
    pub async fn capture(&mut self) -> Result<CapturedArtifact, AppError> {
        let state = self.store.snapshot();
        if state.mode == Mode::Qr {
            return Err(AppError::Other(
                "capture is not available in QR mode".to_string(),
            ));
        }

        let frame = self.session.capture_still()?;
        let still = media::encode_photo(frame, raster::CAPTURE_JPEG_QUALITY).await?;

        if state.mode == Mode::Ar
            && let Some(object) = state.ar_object
        {
            let snapshot = ArSnapshot {
                image: still,
                label: object.label,
                description: object.description,
            };
            self.store.set_ar_snapshot(Some(snapshot.clone()));
            info!(label = %snapshot.label, "Captured AR snapshot");
            return Ok(CapturedArtifact::ArSnapshot(snapshot));
        }

        self.store.set_captured_image(Some(still.clone()));
        info!(width = still.width, height = still.height, "Captured photo");
        Ok(CapturedArtifact::Photo(still))
    }

    /// Translate the text visible in the captured still (one-shot).
    ///
    /// Failures surface as a dismissible notice and in the returned error.
    pub async fn translate_captured(
        &mut self,
        target_language: &str,
    ) -> Result<Translation, AppError> {
        let state = self.store.snapshot();
        let Some(still) = state.captured_image else {
            return Err(AppError::Other("no captured image to translate".to_string()));
        };

        let call = self
            .services
            .translate_image_text(still.to_encoded(), target_language);
        match timeout(timing::DETECTION_TIMEOUT, call).await {
            Ok(Ok(translation)) => Ok(translation),
            Ok(Err(e)) => {
                self.store.set_notice(format!("Translation failed: {e}"));
                Err(e.into())
            }
            Err(_) => {
                let e = DetectionError::Timeout;
                self.store.set_notice(format!("Translation failed: {e}"));
                Err(e.into())
            }
        }
    }

    /// Describe the captured still (one-shot object identification).
    ///
    /// Failures surface as a dismissible notice and in the returned error.
    pub async fn describe_captured(&mut self) -> Result<ObjectDetails, AppError> {
        let state = self.store.snapshot();
        let Some(still) = state.captured_image else {
            return Err(AppError::Other("no captured image to describe".to_string()));
        };

        let call = self.services.identify_object(still.to_encoded());
        match timeout(timing::DETECTION_TIMEOUT, call).await {
            Ok(Ok(details)) => Ok(details),
            Ok(Err(e)) => {
                self.store.set_notice(format!("Description failed: {e}"));
                Err(e.into())
            }
            Err(_) => {
                let e = DetectionError::Timeout;
                self.store.set_notice(format!("Description failed: {e}"));
                Err(e.into())
            }
        }
    }

    /// Synthesize speech for the given text (one-shot)
    pub async fn speak(&mut self, text: &str) -> Result<AudioClip, AppError> {
        let call = self.services.synthesize_speech(text);
        match timeout(timing::DETECTION_TIMEOUT, call).await {
            Ok(Ok(clip)) => Ok(clip),
            Ok(Err(e)) => {
                self.store.set_notice(format!("Speech synthesis failed: {e}"));
                Err(e.into())
            }
            Err(_) => {
                let e = DetectionError::Timeout;
                self.store.set_notice(format!("Speech synthesis failed: {e}"));
                Err(e.into())
            }
        }
    }

    /// Begin a video recording over the live frame stream
    pub async fn start_recording(&mut self) -> Result<(), AppError> {
        if self.recording.is_recording() {
            return Err(RecordingError::AlreadyRecording.into());
        }
        let Some(recorder) = self.recorder.clone() else {
            return Err(
                RecordingError::StartFailed("no media recorder configured".to_string()).into(),
            );
        };
        let frames = self.session.frames().ok_or(CameraError::NotReady)?;

        match recorder.start(frames).await {
            Ok(active) => {
                self.recording = RecordingState::start(active);
                self.store.set_recording(true);
                info!("Recording started");
                Ok(())
            }
            Err(e) => {
                self.store.set_notice(format!("Recording failed: {e}"));
                Err(e.into())
            }
        }
    }

    /// Stop the recording and publish the finished clip
    pub async fn stop_recording(&mut self) -> Result<CapturedArtifact, AppError> {
        let mut previous = self.recording.stop();
        let Some(active) = previous.take_recording() else {
            return Err(RecordingError::NotRecording.into());
        };
        self.store.set_recording(false);

        match active.stop().await {
            Ok(clip) => {
                info!(path = %clip.path.display(), "Recording stopped");
                self.store.set_recorded_video(Some(clip.clone()));
                Ok(CapturedArtifact::Video(clip))
            }
            Err(e) => {
                self.store.set_notice(format!("Recording failed: {e}"));
                Err(e.into())
            }
        }
    }

    /// Tear down everything: detection task, recording, session, store.
    ///
    /// Called when the owning view is destroyed.
    pub async fn shutdown(&mut self) {
        self.disarm_task();
        if self.recording.is_recording() {
            if let Err(e) = self.stop_recording().await {
                warn!(error = %e, "Failed to stop recording on shutdown");
            }
        }
        self.session.stop();
        self.store.reset();
        debug!("Coordinator shut down");
    }

    /// Disarm the active detection task.
    ///
    /// The generation bump invalidates any in-flight poll before the timer
    /// is torn down, so its eventual result is discarded.
    fn disarm_task(&mut self) {
        self.active_generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.handle.abort();
            debug!(task = task.kind.display_name(), "Detection task disarmed");
        }
    }

    /// Arm the detection task for the current mode, if the mode has one and
    /// the camera is ready. Requires that no task is armed.
    fn arm_task_for_current_mode(&mut self) {
        debug_assert!(self.task.is_none(), "disarm before arming");
        let state = self.store.snapshot();
        if !state.is_camera_ready {
            return;
        }
        let Some(kind) = state.mode.task_kind() else {
            return;
        };
        let Some(frames) = self.session.frames() else {
            return;
        };

        let generation = self.active_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let ctx = TaskContext {
            services: Arc::clone(&self.services),
            store: self.store.clone(),
            frames,
            generation,
            active_generation: Arc::clone(&self.active_generation),
        };
        let handle = tasks::spawn(kind, ctx);
        self.task = Some(ArmedTask { kind, handle });
    }
}

impl Drop for ModeCoordinator {
    fn drop(&mut self) {
        // Timers must not outlive the coordinator
        self.disarm_task();
        self.session.stop();
    }
}
