// SPDX-License-Identifier: GPL-3.0-only

//! arcam-core - Mode coordination engine for an AI camera
//!
//! This library provides the headless core of an AI camera application:
//! the capture session lifecycle, the mode state machine with its armed
//! detection tasks, and the observable result store a UI renders from.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`session`]: Camera acquisition, facing switches, zoom and torch
//! - [`coordinator`]: Mode transitions and detection task arming
//! - [`store`]: Observable camera state snapshot
//! - [`services`]: Detection service and media recorder interfaces
//! - [`media`]: Frame conversion and JPEG encoding
//! - [`artifact`]: Captured photos, clips and AR snapshots
//! - [`config`]: User preferences handling
//! - [`storage`]: Saving captures to disk

pub mod artifact;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod errors;
pub mod media;
pub mod services;
pub mod session;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use artifact::{ArSnapshot, CapturedArtifact, PhotoStill, VideoClip};
pub use config::Preferences;
pub use coordinator::ModeCoordinator;
pub use coordinator::tasks::TaskKind;
pub use errors::{AppError, AppResult, CameraError, DetectionError, RecordingError};
pub use services::{DetectionServices, EncodedImage, MediaRecorder, ObjectDetails};
pub use session::CaptureSessionController;
pub use session::types::{CameraBackend, CameraFrame, CameraStream, FacingMode};
pub use store::{CameraState, Mode, ResultStore};
