// SPDX-License-Identifier: GPL-3.0-only

//! Periodic detection tasks
//!
//! Each task is a spawned loop that samples the latest camera frame at its
//! fixed cadence and runs one detection call. The loops uphold two policy
//! invariants from the mode coordinator:
//!
//! - at most one inference call in flight per kind: the loop awaits every
//!   call before the next tick, and missed ticks are skipped;
//! - stale results are never committed: a result is written to the store
//!   only while the task's generation is still the active one.

pub mod qr_detector;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior, timeout};
use tracing::{debug, trace};

use crate::constants::{intervals, timing};
use crate::media;
use crate::services::DetectionServices;
use crate::session::types::{CameraFrame, FrameReceiver};
use crate::store::{Mode, ResultStore};

/// Detection task kinds, one per scanning mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Local QR decoding, stops on first hit
    QrScan,
    /// Remote object identification (AR overlay)
    ObjectId,
    /// Remote face-mesh landmark detection
    FaceMesh,
}

impl TaskKind {
    /// All task kinds
    pub const ALL: [TaskKind; 3] = [TaskKind::QrScan, TaskKind::ObjectId, TaskKind::FaceMesh];

    /// Fixed polling interval for this kind
    pub fn interval(&self) -> Duration {
        match self {
            TaskKind::QrScan => intervals::QR_SCAN,
            TaskKind::ObjectId => intervals::OBJECT_ID,
            TaskKind::FaceMesh => intervals::FACE_MESH,
        }
    }

    /// Short name for logging
    pub fn display_name(&self) -> &'static str {
        match self {
            TaskKind::QrScan => "qr-scan",
            TaskKind::ObjectId => "object-id",
            TaskKind::FaceMesh => "face-mesh",
        }
    }
}

impl Mode {
    /// The periodic detection task this mode arms, if any.
    ///
    /// Photo, Video and Text arm nothing; text translation is an on-demand
    /// call against a captured still.
    pub fn task_kind(&self) -> Option<TaskKind> {
        match self {
            Mode::Qr => Some(TaskKind::QrScan),
            Mode::Ar => Some(TaskKind::ObjectId),
            Mode::Smile => Some(TaskKind::FaceMesh),
            Mode::Photo | Mode::Video | Mode::Text => None,
        }
    }
}

/// Everything a spawned task loop needs
pub(crate) struct TaskContext {
    pub services: Arc<dyn DetectionServices>,
    pub store: ResultStore,
    pub frames: FrameReceiver,
    /// Generation this task was armed with
    pub generation: u64,
    /// Currently active generation, bumped on every disarm/arm
    pub active_generation: Arc<AtomicU64>,
}

impl TaskContext {
    /// Whether this task's generation is still the active one
    fn is_current(&self) -> bool {
        self.active_generation.load(Ordering::SeqCst) == self.generation
    }

    fn latest_frame(&self) -> Option<CameraFrame> {
        self.frames.borrow().clone()
    }
}

/// Spawn the detection loop for `kind`
pub(crate) fn spawn(kind: TaskKind, ctx: TaskContext) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(
            task = kind.display_name(),
            generation = ctx.generation,
            interval_ms = kind.interval().as_millis() as u64,
            "Detection task armed"
        );
        match kind {
            TaskKind::QrScan => run_qr_scan(ctx).await,
            TaskKind::ObjectId => run_object_id(ctx).await,
            TaskKind::FaceMesh => run_face_mesh(ctx).await,
        }
    })
}

/// Build the polling interval for a kind.
///
/// The first tick fires one full period after arming, and ticks that pile
/// up behind a slow call are skipped rather than burst.
fn poll_interval(kind: TaskKind) -> Interval {
    let period = kind.interval();
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// QR scanning loop.
///
/// Terminal on success: once a code is decoded the loop writes it to the
/// store and exits. Dismissing the result re-arms a fresh task.
async fn run_qr_scan(ctx: TaskContext) {
    let mut interval = poll_interval(TaskKind::QrScan);
    loop {
        interval.tick().await;
        if !ctx.is_current() {
            break;
        }
        let Some(frame) = ctx.latest_frame() else {
            continue;
        };

        let decoded = ctx.services.decode_qr(frame).await;
        if !ctx.is_current() {
            break;
        }
        if let Some(content) = decoded {
            debug!(content_len = content.len(), "QR code found; scanning suspended");
            ctx.store.set_qr_code(content);
            break;
        }
    }
}

/// Object identification loop (AR overlay).
///
/// A repeated identical label is not re-committed, so observers only wake
/// when the identified object actually changes.
async fn run_object_id(ctx: TaskContext) {
    let mut interval = poll_interval(TaskKind::ObjectId);
    let mut last_label: Option<String> = None;
    loop {
        interval.tick().await;
        if !ctx.is_current() {
            break;
        }
        let Some(frame) = ctx.latest_frame() else {
            continue;
        };

        let image = match media::encode_detection_image(frame).await {
            Ok(image) => image,
            Err(e) => {
                debug!(error = %e, "Failed to encode frame for identification");
                continue;
            }
        };

        let result = timeout(timing::DETECTION_TIMEOUT, ctx.services.identify_object(image)).await;
        if !ctx.is_current() {
            break;
        }
        match result {
            Ok(Ok(details)) => {
                if last_label.as_deref() == Some(details.label.as_str()) {
                    trace!(label = %details.label, "Unchanged label; skipping update");
                    continue;
                }
                debug!(label = %details.label, "Identified object");
                last_label = Some(details.label.clone());
                ctx.store.set_ar_object(Some(details));
            }
            // Polling failures are swallowed to avoid notice spam
            Ok(Err(e)) => debug!(error = %e, "Object identification failed"),
            Err(_) => debug!("Object identification timed out"),
        }
    }
}

/// Face-mesh landmark loop (Smile mode)
async fn run_face_mesh(ctx: TaskContext) {
    let mut interval = poll_interval(TaskKind::FaceMesh);
    loop {
        interval.tick().await;
        if !ctx.is_current() {
            break;
        }
        let Some(frame) = ctx.latest_frame() else {
            continue;
        };

        let image = match media::encode_detection_image(frame).await {
            Ok(image) => image,
            Err(e) => {
                debug!(error = %e, "Failed to encode frame for face detection");
                continue;
            }
        };

        let result = timeout(
            timing::DETECTION_TIMEOUT,
            ctx.services.detect_face_landmarks(image),
        )
        .await;
        if !ctx.is_current() {
            break;
        }
        match result {
            Ok(Ok(landmarks)) => {
                trace!(count = landmarks.len(), "Face landmarks updated");
                ctx.store.set_face_landmarks(Some(landmarks));
            }
            Ok(Err(e)) => debug!(error = %e, "Face landmark detection failed"),
            Err(_) => debug!("Face landmark detection timed out"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_task_mapping() {
        assert_eq!(Mode::Qr.task_kind(), Some(TaskKind::QrScan));
        assert_eq!(Mode::Ar.task_kind(), Some(TaskKind::ObjectId));
        assert_eq!(Mode::Smile.task_kind(), Some(TaskKind::FaceMesh));
        assert_eq!(Mode::Photo.task_kind(), None);
        assert_eq!(Mode::Video.task_kind(), None);
        assert_eq!(Mode::Text.task_kind(), None);
    }

    #[test]
    fn test_task_intervals() {
        assert_eq!(TaskKind::QrScan.interval(), Duration::from_millis(500));
        assert_eq!(TaskKind::ObjectId.interval(), Duration::from_millis(1500));
        assert_eq!(TaskKind::FaceMesh.interval(), Duration::from_millis(100));
    }
}
