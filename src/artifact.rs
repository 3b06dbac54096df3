// SPDX-License-Identifier: GPL-3.0-only

//! Captured artifacts and the recording state machine
//!
//! Artifacts are finalized, user-visible captures. They are created by an
//! explicit user action, held until dismissed and never mutated afterwards -
//! a new capture replaces the old one.

use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::services::{ActiveRecording, EncodedImage};

/// An encoded still photo
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoStill {
    pub id: Uuid,
    pub width: u32,
    pub height: u32,
    /// Encoded JPEG bytes
    pub data: Arc<[u8]>,
    pub mime_type: &'static str,
    pub taken_at: DateTime<Local>,
}

impl PhotoStill {
    /// View the still as an encoded image for a detection service call
    pub fn to_encoded(&self) -> EncodedImage {
        EncodedImage {
            data: Arc::clone(&self.data),
            width: self.width,
            height: self.height,
            mime_type: self.mime_type,
        }
    }
}

/// A finished video recording
#[derive(Debug, Clone, PartialEq)]
pub struct VideoClip {
    pub id: Uuid,
    /// Location of the finalized clip
    pub path: PathBuf,
    pub duration: Duration,
}

/// An AR still annotated with the identified object
#[derive(Debug, Clone, PartialEq)]
pub struct ArSnapshot {
    pub image: PhotoStill,
    pub label: String,
    pub description: String,
}

/// A finalized, user-visible capture
#[derive(Debug, Clone, PartialEq)]
pub enum CapturedArtifact {
    Photo(PhotoStill),
    Video(VideoClip),
    ArSnapshot(ArSnapshot),
}

/// Recording state machine
///
/// Simple two-state design: either recording or not.
#[derive(Default)]
pub enum RecordingState {
    /// Not recording
    #[default]
    Idle,
    /// Actively recording
    Recording {
        /// When recording started
        start_time: Instant,
        /// Handle that finalizes the clip on stop
        recording: Option<Box<dyn ActiveRecording>>,
    },
}

impl std::fmt::Debug for RecordingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordingState::Idle => write!(f, "Idle"),
            RecordingState::Recording { start_time, .. } => {
                write!(f, "Recording {{ elapsed: {:?} }}", start_time.elapsed())
            }
        }
    }
}

impl RecordingState {
    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingState::Recording { .. })
    }

    /// Get the elapsed recording duration
    pub fn elapsed(&self) -> Duration {
        match self {
            RecordingState::Idle => Duration::ZERO,
            RecordingState::Recording { start_time, .. } => start_time.elapsed(),
        }
    }

    /// Take the active recording handle (consumes it)
    pub fn take_recording(&mut self) -> Option<Box<dyn ActiveRecording>> {
        match self {
            RecordingState::Idle => None,
            RecordingState::Recording { recording, .. } => recording.take(),
        }
    }

    /// Start recording
    pub fn start(recording: Box<dyn ActiveRecording>) -> Self {
        RecordingState::Recording {
            start_time: Instant::now(),
            recording: Some(recording),
        }
    }

    /// Stop recording (returns the previous state, leaves Idle)
    pub fn stop(&mut self) -> Self {
        std::mem::replace(self, RecordingState::Idle)
    }
}
