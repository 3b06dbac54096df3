// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the capture core

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera-related errors
    Camera(CameraError),
    /// Detection service errors
    Detection(DetectionError),
    /// Recording-related errors
    Recording(RecordingError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Camera-specific errors
#[derive(Debug, Clone)]
pub enum CameraError {
    /// Camera access was denied by the user or platform
    AccessDenied,
    /// No usable camera device for the requested facing direction
    DeviceUnavailable(String),
    /// The device does not support the requested constraint (zoom, torch)
    UnsupportedConstraint(String),
    /// No active stream or no frame delivered yet
    NotReady,
}

/// Opaque failures from external AI/decoding services
#[derive(Debug, Clone)]
pub enum DetectionError {
    /// The service reported a failure
    ServiceFailed(String),
    /// The call exceeded the detection timeout
    Timeout,
}

/// Recording-specific errors
#[derive(Debug, Clone)]
pub enum RecordingError {
    /// Failed to start recording
    StartFailed(String),
    /// Failed to stop recording
    StopFailed(String),
    /// Recording already in progress
    AlreadyRecording,
    /// No recording in progress
    NotRecording,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Detection(e) => write!(f, "Detection error: {}", e),
            AppError::Recording(e) => write!(f, "Recording error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::AccessDenied => write!(f, "Camera access denied"),
            CameraError::DeviceUnavailable(msg) => write!(f, "Camera unavailable: {}", msg),
            CameraError::UnsupportedConstraint(what) => {
                write!(f, "Unsupported constraint: {}", what)
            }
            CameraError::NotReady => write!(f, "Camera is not ready"),
        }
    }
}

impl fmt::Display for DetectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionError::ServiceFailed(msg) => write!(f, "Service failed: {}", msg),
            DetectionError::Timeout => write!(f, "Detection call timed out"),
        }
    }
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingError::StartFailed(msg) => write!(f, "Failed to start recording: {}", msg),
            RecordingError::StopFailed(msg) => write!(f, "Failed to stop recording: {}", msg),
            RecordingError::AlreadyRecording => write!(f, "Recording already in progress"),
            RecordingError::NotRecording => write!(f, "No recording in progress"),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for DetectionError {}
impl std::error::Error for RecordingError {}

// Conversions from sub-errors to AppError
impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<DetectionError> for AppError {
    fn from(err: DetectionError) -> Self {
        AppError::Detection(err)
    }
}

impl From<RecordingError> for AppError {
    fn from(err: RecordingError) -> Self {
        AppError::Recording(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
