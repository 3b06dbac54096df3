// SPDX-License-Identifier: GPL-3.0-only

//! Capture session lifecycle
//!
//! The controller exclusively owns the camera stream handle: starting a new
//! stream always releases the previous one first, and a failed acquisition
//! leaves nothing held. Detection tasks and the recorder receive frame
//! receivers, never the stream itself.

pub mod types;

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::constants::defaults;
use crate::errors::CameraError;
use crate::media;
use crate::store::ResultStore;
use types::{CameraBackend, CameraFrame, CameraStream, FacingMode, FrameReceiver};

/// Owns the camera stream and publishes readiness/capability state
pub struct CaptureSessionController {
    backend: Arc<dyn CameraBackend>,
    stream: Option<Box<dyn CameraStream>>,
    frames: Option<FrameReceiver>,
    store: ResultStore,
}

impl CaptureSessionController {
    pub fn new(backend: Arc<dyn CameraBackend>, store: ResultStore) -> Self {
        Self {
            backend,
            stream: None,
            frames: None,
            store,
        }
    }

    /// Acquire a stream for the given facing direction.
    ///
    /// Any existing stream is released first. When the back camera fails to
    /// open, the front camera is tried once as a fallback; the store's
    /// facing mode always reflects the stream actually acquired.
    pub async fn start(&mut self, facing: FacingMode) -> Result<(), CameraError> {
        self.stop();
        self.store.update(|s| {
            s.is_camera_ready = false;
            s.facing_mode = facing;
            s.zoom = defaults::ZOOM;
            s.zoom_capabilities = None;
            s.has_torch = false;
            s.torch_on = false;
        });

        match self.open(facing).await {
            Ok(()) => Ok(()),
            Err(e) if facing == FacingMode::Environment => {
                warn!(error = %e, "Back camera unavailable, falling back to front camera");
                self.store.set_facing_mode(FacingMode::User);
                self.open(FacingMode::User).await
            }
            Err(e) => Err(e),
        }
    }

    async fn open(&mut self, facing: FacingMode) -> Result<(), CameraError> {
        let (tx, rx) = watch::channel(None);
        let stream = self.backend.open(facing, tx).await?;
        let caps = stream.capabilities();
        self.stream = Some(stream);
        self.frames = Some(rx);
        self.store.update(|s| {
            s.zoom_capabilities = caps.zoom;
            s.has_torch = caps.has_torch;
            s.is_camera_ready = true;
        });
        info!(
            %facing,
            has_zoom = caps.zoom.is_some(),
            has_torch = caps.has_torch,
            "Camera session started"
        );
        Ok(())
    }

    /// Release all stream resources. Idempotent.
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!("Camera stream released");
        }
        self.frames = None;
        if self.store.snapshot().is_camera_ready {
            self.store.set_camera_ready(false);
        }
    }

    /// Apply a zoom value, clamped to the device capabilities.
    ///
    /// A logged no-op when the device reports no zoom range.
    pub fn set_zoom(&mut self, value: f64) -> Result<(), CameraError> {
        let Some(caps) = self.store.snapshot().zoom_capabilities else {
            debug!(value, "Zoom requested without capabilities, ignoring");
            return Ok(());
        };
        let clamped = caps.clamp(value);
        let stream = self.stream.as_mut().ok_or(CameraError::NotReady)?;
        stream.set_zoom(clamped)?;
        self.store.set_zoom(clamped);
        Ok(())
    }

    /// Switch the torch on or off.
    ///
    /// Errors with `UnsupportedConstraint` when the device has no torch;
    /// callers absorb that (log-only).
    pub fn set_torch(&mut self, on: bool) -> Result<(), CameraError> {
        if !self.store.snapshot().has_torch {
            return Err(CameraError::UnsupportedConstraint("torch".to_string()));
        }
        let stream = self.stream.as_mut().ok_or(CameraError::NotReady)?;
        stream.set_torch(on)?;
        self.store.set_torch_on(on);
        Ok(())
    }

    /// Whether a stream is live and delivering
    pub fn is_ready(&self) -> bool {
        self.store.snapshot().is_camera_ready
    }

    /// A receiver over the live frame stream, for detection tasks and the
    /// recorder
    pub fn frames(&self) -> Option<FrameReceiver> {
        self.frames.clone()
    }

    /// Latest frame for a detection task. Never mirrored.
    pub fn detection_frame(&self) -> Result<CameraFrame, CameraError> {
        self.frames
            .as_ref()
            .and_then(|rx| rx.borrow().clone())
            .ok_or(CameraError::NotReady)
    }

    /// Latest frame for a user-facing still capture.
    ///
    /// Mirrored horizontally when the front camera is active (selfie flip
    /// correction).
    pub fn capture_still(&self) -> Result<CameraFrame, CameraError> {
        let frame = self.detection_frame()?;
        if self.store.snapshot().facing_mode == FacingMode::User {
            Ok(media::mirror_horizontal(&frame))
        } else {
            Ok(frame)
        }
    }
}
