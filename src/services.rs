// SPDX-License-Identifier: GPL-3.0-only

//! External service ports
//!
//! The core treats every AI/decoding call as an opaque async port: the
//! implementation (remote model, local library, test fake) is the
//! collaborator's concern. QR decoding ships with a default in-process
//! implementation since no network round trip is needed for it.

use async_trait::async_trait;
use std::sync::Arc;

use crate::artifact::VideoClip;
use crate::coordinator::tasks::qr_detector::QrDetector;
use crate::errors::{DetectionError, RecordingError};
use crate::session::types::{CameraFrame, FrameReceiver};

/// An encoded raster ready to be sent to a remote service
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// Encoded bytes (JPEG)
    pub data: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    /// MIME type of the encoding
    pub mime_type: &'static str,
}

/// Result of object identification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDetails {
    pub label: String,
    pub description: String,
}

/// Result of image-text translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub translated_text: String,
}

/// A single 2D face-mesh landmark, normalized to [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
}

/// Playable audio returned by speech synthesis
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub data: Arc<[u8]>,
    pub mime_type: String,
}

/// Port for the AI-assisted detection services
///
/// Failures are opaque; continuous polling tasks swallow them, one-shot
/// user actions surface them as a notice.
#[async_trait]
pub trait DetectionServices: Send + Sync {
    /// Identify the dominant object in a still frame
    async fn identify_object(&self, image: EncodedImage) -> Result<ObjectDetails, DetectionError>;

    /// Translate visible text in a still frame into the target language
    async fn translate_image_text(
        &self,
        image: EncodedImage,
        target_language: &str,
    ) -> Result<Translation, DetectionError>;

    /// Detect 2D face-mesh landmarks in a still frame
    async fn detect_face_landmarks(
        &self,
        image: EncodedImage,
    ) -> Result<Vec<LandmarkPoint>, DetectionError>;

    /// Synthesize speech for the given text
    async fn synthesize_speech(&self, text: &str) -> Result<AudioClip, DetectionError>;

    /// Decode a QR code from a raw frame.
    ///
    /// Absence of a code is `None`, not an error. The default implementation
    /// decodes in-process; override it to delegate elsewhere.
    async fn decode_qr(&self, frame: CameraFrame) -> Option<String> {
        QrDetector::new().detect(frame).await
    }
}

/// Port for the platform media recorder
#[async_trait]
pub trait MediaRecorder: Send + Sync {
    /// Begin recording the given frame stream.
    ///
    /// Returns a handle that finalizes the clip on stop.
    async fn start(&self, frames: FrameReceiver) -> Result<Box<dyn ActiveRecording>, RecordingError>;
}

/// Handle to an in-progress recording
#[async_trait]
pub trait ActiveRecording: Send {
    /// Finalize the recording and return the finished clip
    async fn stop(self: Box<Self>) -> Result<VideoClip, RecordingError>;
}
