// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection task
//!
//! Decodes QR codes from camera frames with rqrr. Frames are converted to
//! grayscale and downscaled before detection to keep per-poll cost low.

use tracing::{debug, trace, warn};

use crate::constants::raster;
use crate::media;
use crate::session::types::CameraFrame;

/// QR code detector
///
/// Optimized for real-time polling: frames are downscaled to
/// `max_dimension` before the detector runs.
pub struct QrDetector {
    /// Maximum dimension for processing (frames are downscaled to this)
    max_dimension: u32,
}

impl Default for QrDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDetector {
    /// Create a new QR detector with default settings
    pub fn new() -> Self {
        Self {
            // QR codes are typically large enough in the viewfinder to be
            // detected at this resolution
            max_dimension: raster::DETECTION_MAX_DIMENSION,
        }
    }

    /// Create a QR detector with custom max dimension
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    /// Decode the first QR code found in a camera frame
    ///
    /// Runs the CPU-intensive detection in a blocking task. Returns `None`
    /// when no decodable code is present.
    pub async fn detect(&self, frame: CameraFrame) -> Option<String> {
        let max_dim = self.max_dimension;

        tokio::task::spawn_blocking(move || detect_sync(&frame, max_dim))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "QR detection task panicked");
                None
            })
    }
}

/// Synchronous QR detection (runs in a blocking task)
fn detect_sync(frame: &CameraFrame, max_dimension: u32) -> Option<String> {
    let start = std::time::Instant::now();

    let luma = media::to_luma(frame, max_dimension);
    let conversion_time = start.elapsed();
    trace!(
        proc_width = luma.width(),
        proc_height = luma.height(),
        conversion_ms = conversion_time.as_millis(),
        "Prepared grayscale image for QR detection"
    );

    let mut prepared = rqrr::PreparedImage::prepare(luma);
    let grids = prepared.detect_grids();

    for grid in grids {
        match grid.decode() {
            Ok((_meta, content)) => {
                debug!(
                    content_len = content.len(),
                    total_ms = start.elapsed().as_millis(),
                    "Decoded QR code"
                );
                return Some(content);
            }
            Err(e) => {
                debug!(error = %e, "Failed to decode QR grid");
            }
        }
    }

    None
}
