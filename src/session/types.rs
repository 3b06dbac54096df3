// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for capture sessions and camera backends

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

use crate::errors::CameraError;

/// Which physical camera supplies the video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FacingMode {
    /// Front/selfie camera
    User,
    /// Back camera
    #[default]
    Environment,
}

impl FacingMode {
    /// The opposite facing direction (front <-> back)
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacingMode::User => write!(f, "user"),
            FacingMode::Environment => write!(f, "environment"),
        }
    }
}

/// Pixel format for camera frames
///
/// RGBA is the canonical format; Gray8 covers monochrome and IR sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    Rgba,
    /// RGB24 - 24-bit RGB (3 bytes per pixel, no alpha)
    Rgb24,
    /// Gray8 - 8-bit grayscale (single channel)
    Gray8,
}

impl PixelFormat {
    /// Bytes per pixel for this format
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba => 4,
            PixelFormat::Rgb24 => 3,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// A single frame from the camera
///
/// Frame data is reference-counted so detection tasks can borrow frames
/// without holding the stream itself.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Raw pixel data, row-major
    pub data: Arc<[u8]>,
    /// Pixel format of the data
    pub format: PixelFormat,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// Timestamp when the frame was captured (for latency diagnostics)
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Create a packed RGBA frame (stride = width * 4)
    pub fn rgba(width: u32, height: u32, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            width,
            height,
            data: data.into(),
            format: PixelFormat::Rgba,
            stride: width * 4,
            captured_at: Instant::now(),
        }
    }
}

/// Zoom range reported by a camera track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomCapabilities {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ZoomCapabilities {
    /// Clamp a requested zoom value into the supported range
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Capability metadata queried from a freshly opened stream
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamCapabilities {
    /// Zoom range, if the track supports zoom
    pub zoom: Option<ZoomCapabilities>,
    /// Whether the track has a controllable torch
    pub has_torch: bool,
}

/// Frame sender held by an open stream; `None` marks end of delivery
pub type FrameSender = watch::Sender<Option<CameraFrame>>;

/// Frame receiver handed to detection tasks and capture operations
pub type FrameReceiver = watch::Receiver<Option<CameraFrame>>;

/// Camera device access port
///
/// A backend produces exclusive stream handles. Opening must either succeed
/// with a live stream or fail leaving no device resources held.
#[async_trait]
pub trait CameraBackend: Send + Sync {
    /// Open a stream for the given facing direction.
    ///
    /// Frames are published through `frames` until the stream is stopped.
    async fn open(
        &self,
        facing: FacingMode,
        frames: FrameSender,
    ) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// An open, exclusively owned camera stream
pub trait CameraStream: Send {
    /// Capability metadata for the underlying track
    fn capabilities(&self) -> StreamCapabilities;

    /// Apply a zoom value. The caller clamps to capabilities first.
    fn set_zoom(&mut self, value: f64) -> Result<(), CameraError>;

    /// Switch the torch on or off
    fn set_torch(&mut self, on: bool) -> Result<(), CameraError>;

    /// Release the underlying device. Idempotent.
    fn stop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_mode_toggle() {
        assert_eq!(FacingMode::User.toggled(), FacingMode::Environment);
        assert_eq!(FacingMode::Environment.toggled(), FacingMode::User);
        assert_eq!(FacingMode::default(), FacingMode::Environment);
    }

    #[test]
    fn test_zoom_clamp() {
        let caps = ZoomCapabilities {
            min: 1.0,
            max: 5.0,
            step: 0.1,
        };
        assert_eq!(caps.clamp(0.5), 1.0);
        assert_eq!(caps.clamp(7.0), 5.0);
        assert_eq!(caps.clamp(2.5), 2.5);
    }

    #[test]
    fn test_packed_rgba_frame() {
        let frame = CameraFrame::rgba(2, 2, vec![0u8; 16]);
        assert_eq!(frame.stride, 8);
        assert_eq!(frame.format.bytes_per_pixel(), 4);
    }
}
