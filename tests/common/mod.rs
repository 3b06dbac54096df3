// SPDX-License-Identifier: GPL-3.0-only

//! Shared fakes for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arcam_core::artifact::VideoClip;
use arcam_core::errors::{CameraError, DetectionError, RecordingError};
use arcam_core::services::{
    ActiveRecording, AudioClip, DetectionServices, EncodedImage, LandmarkPoint, MediaRecorder,
    ObjectDetails, Translation,
};
use arcam_core::session::types::{
    CameraBackend, CameraFrame, CameraStream, FacingMode, FrameReceiver, FrameSender,
    StreamCapabilities, ZoomCapabilities,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A small packed RGBA frame
pub fn test_frame() -> CameraFrame {
    CameraFrame::rgba(4, 4, vec![128u8; 4 * 4 * 4])
}

/// Scripted camera backend
///
/// Delivers one frame immediately on open and keeps the sender reachable so
/// tests can push more.
pub struct FakeBackend {
    pub caps: StreamCapabilities,
    pub fail_environment: bool,
    pub fail_user: bool,
    /// Every facing the backend was asked to open, in order
    pub opened: Mutex<Vec<FacingMode>>,
    /// How many streams have been stopped
    pub stopped: Arc<AtomicUsize>,
    /// Sender of the most recently opened stream
    pub frames: Mutex<Option<Arc<FrameSender>>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            caps: StreamCapabilities {
                zoom: Some(ZoomCapabilities {
                    min: 1.0,
                    max: 5.0,
                    step: 0.1,
                }),
                has_torch: false,
            },
            fail_environment: false,
            fail_user: false,
            opened: Mutex::new(Vec::new()),
            stopped: Arc::new(AtomicUsize::new(0)),
            frames: Mutex::new(None),
        }
    }

    pub fn failing_environment() -> Self {
        Self {
            fail_environment: true,
            ..Self::new()
        }
    }

    /// Push a frame into the live stream
    pub fn push_frame(&self, frame: CameraFrame) {
        if let Some(tx) = self.frames.lock().unwrap().as_ref() {
            let _ = tx.send(Some(frame));
        }
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    pub fn stop_count(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraBackend for FakeBackend {
    async fn open(
        &self,
        facing: FacingMode,
        frames: FrameSender,
    ) -> Result<Box<dyn CameraStream>, CameraError> {
        self.opened.lock().unwrap().push(facing);
        let fails = match facing {
            FacingMode::Environment => self.fail_environment,
            FacingMode::User => self.fail_user,
        };
        if fails {
            return Err(CameraError::DeviceUnavailable(format!(
                "no {facing} camera"
            )));
        }

        let frames = Arc::new(frames);
        let _ = frames.send(Some(test_frame()));
        *self.frames.lock().unwrap() = Some(Arc::clone(&frames));
        Ok(Box::new(FakeStream {
            caps: self.caps,
            frames: Some(frames),
            stopped: Arc::clone(&self.stopped),
        }))
    }
}

pub struct FakeStream {
    caps: StreamCapabilities,
    frames: Option<Arc<FrameSender>>,
    stopped: Arc<AtomicUsize>,
}

impl CameraStream for FakeStream {
    fn capabilities(&self) -> StreamCapabilities {
        self.caps
    }

    fn set_zoom(&mut self, _value: f64) -> Result<(), CameraError> {
        Ok(())
    }

    fn set_torch(&mut self, _on: bool) -> Result<(), CameraError> {
        Ok(())
    }

    fn stop(&mut self) {
        if self.frames.take().is_some() {
            self.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Scripted detection services
pub struct FakeServices {
    /// Payload decode_qr reports, if any
    pub qr_payload: Mutex<Option<String>>,
    /// Object identify_object reports
    pub object: Mutex<Option<ObjectDetails>>,
    /// Landmarks detect_face_landmarks reports
    pub landmarks: Mutex<Vec<LandmarkPoint>>,
    /// When set, all one-shot calls fail
    pub fail_calls: bool,
    /// Simulated latency of identify_object
    pub identify_delay: Duration,
    pub qr_decodes: AtomicUsize,
    pub identify_calls: AtomicUsize,
    pub landmark_calls: AtomicUsize,
}

impl Default for FakeServices {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeServices {
    pub fn new() -> Self {
        Self {
            qr_payload: Mutex::new(None),
            object: Mutex::new(None),
            landmarks: Mutex::new(Vec::new()),
            fail_calls: false,
            identify_delay: Duration::ZERO,
            qr_decodes: AtomicUsize::new(0),
            identify_calls: AtomicUsize::new(0),
            landmark_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_qr_payload(self, payload: &str) -> Self {
        *self.qr_payload.lock().unwrap() = Some(payload.to_string());
        self
    }

    pub fn with_object(self, label: &str, description: &str) -> Self {
        *self.object.lock().unwrap() = Some(ObjectDetails {
            label: label.to_string(),
            description: description.to_string(),
        });
        self
    }

    pub fn with_landmarks(self, points: Vec<LandmarkPoint>) -> Self {
        *self.landmarks.lock().unwrap() = points;
        self
    }

    pub fn failing() -> Self {
        Self {
            fail_calls: true,
            ..Self::new()
        }
    }

    pub fn with_identify_delay(mut self, delay: Duration) -> Self {
        self.identify_delay = delay;
        self
    }
}

#[async_trait]
impl DetectionServices for FakeServices {
    async fn identify_object(
        &self,
        _image: EncodedImage,
    ) -> Result<ObjectDetails, DetectionError> {
        self.identify_calls.fetch_add(1, Ordering::SeqCst);
        if !self.identify_delay.is_zero() {
            tokio::time::sleep(self.identify_delay).await;
        }
        if self.fail_calls {
            return Err(DetectionError::ServiceFailed("scripted failure".to_string()));
        }
        self.object
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| DetectionError::ServiceFailed("nothing scripted".to_string()))
    }

    async fn translate_image_text(
        &self,
        _image: EncodedImage,
        target_language: &str,
    ) -> Result<Translation, DetectionError> {
        if self.fail_calls {
            return Err(DetectionError::ServiceFailed("scripted failure".to_string()));
        }
        Ok(Translation {
            translated_text: format!("[{target_language}] hello"),
        })
    }

    async fn detect_face_landmarks(
        &self,
        _image: EncodedImage,
    ) -> Result<Vec<LandmarkPoint>, DetectionError> {
        self.landmark_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_calls {
            return Err(DetectionError::ServiceFailed("scripted failure".to_string()));
        }
        Ok(self.landmarks.lock().unwrap().clone())
    }

    async fn synthesize_speech(&self, text: &str) -> Result<AudioClip, DetectionError> {
        if self.fail_calls {
            return Err(DetectionError::ServiceFailed("scripted failure".to_string()));
        }
        Ok(AudioClip {
            data: Arc::from(text.as_bytes().to_vec()),
            mime_type: "audio/mpeg".to_string(),
        })
    }

    async fn decode_qr(&self, _frame: CameraFrame) -> Option<String> {
        self.qr_decodes.fetch_add(1, Ordering::SeqCst);
        self.qr_payload.lock().unwrap().clone()
    }
}

/// Recorder producing a scripted one-second clip
pub struct FakeRecorder {
    pub fail_start: bool,
    pub starts: AtomicUsize,
}

impl Default for FakeRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRecorder {
    pub fn new() -> Self {
        Self {
            fail_start: false,
            starts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MediaRecorder for FakeRecorder {
    async fn start(
        &self,
        _frames: FrameReceiver,
    ) -> Result<Box<dyn ActiveRecording>, RecordingError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(RecordingError::StartFailed("scripted failure".to_string()));
        }
        Ok(Box::new(FakeActiveRecording))
    }
}

pub struct FakeActiveRecording;

#[async_trait]
impl ActiveRecording for FakeActiveRecording {
    async fn stop(self: Box<Self>) -> Result<VideoClip, RecordingError> {
        Ok(VideoClip {
            id: uuid::Uuid::new_v4(),
            path: PathBuf::from("/tmp/fake-clip.mp4"),
            duration: Duration::from_secs(1),
        })
    }
}
