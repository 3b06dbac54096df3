// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Polling cadences for the periodic detection tasks
///
/// Each detection kind re-samples the camera at a fixed interval. The values
/// trade recognition latency against the cost of the underlying call: QR
/// decoding is cheap and local, object identification is a remote model call,
/// face-mesh tracking must feel continuous.
pub mod intervals {
    use std::time::Duration;

    /// QR scan interval
    pub const QR_SCAN: Duration = Duration::from_millis(500);

    /// Object identification interval (remote model call)
    pub const OBJECT_ID: Duration = Duration::from_millis(1500);

    /// Face-mesh landmark interval
    pub const FACE_MESH: Duration = Duration::from_millis(100);
}

/// Timing constants
pub mod timing {
    use std::time::Duration;

    /// Hard timeout on any single external detection call.
    /// No retry on expiry - the failure surfaces and the next poll starts fresh.
    pub const DETECTION_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Raster processing constants
pub mod raster {
    /// Maximum dimension for frames sent to detection services.
    /// Frames larger than this are downscaled before encoding.
    pub const DETECTION_MAX_DIMENSION: u32 = 640;

    /// JPEG quality for frames sent to detection services
    pub const DETECTION_JPEG_QUALITY: u8 = 80;

    /// JPEG quality for user-facing still captures
    pub const CAPTURE_JPEG_QUALITY: u8 = 100;
}

/// Documented defaults for session and store state
pub mod defaults {
    /// Zoom level applied when a session starts or capabilities are absent
    pub const ZOOM: f64 = 1.0;
}
