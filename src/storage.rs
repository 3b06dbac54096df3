// SPDX-License-Identifier: GPL-3.0-only

//! Storage utilities for saving captured photos

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::artifact::PhotoStill;
use crate::errors::AppError;

/// Directory where captured photos are saved: `~/Pictures/arcam`
pub fn pictures_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            Path::new(&home).join("Pictures")
        })
        .join("arcam")
}

/// Timestamped photo file name, e.g. `IMG_20260827_143015.jpg`
pub fn photo_file_name(taken_at: DateTime<Local>) -> String {
    format!("IMG_{}.jpg", taken_at.format("%Y%m%d_%H%M%S"))
}

/// Save an encoded photo to the given directory, creating it if needed.
///
/// Returns the path of the written file.
pub async fn save_photo(dir: &Path, photo: &PhotoStill) -> Result<PathBuf, AppError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(photo_file_name(photo.taken_at));
    tokio::fs::write(&path, photo.data.as_ref()).await?;
    info!(path = %path.display(), "Saved photo");
    Ok(path)
}
