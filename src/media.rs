// SPDX-License-Identifier: GPL-3.0-only

//! Raster helpers for capture and detection
//!
//! Frames arrive with arbitrary row stride and one of a few pixel formats.
//! Everything downstream (JPEG encoding, QR preparation, selfie mirroring)
//! goes through the packed conversions here. CPU-heavy work runs under
//! `spawn_blocking` so detection loops never stall the runtime.

use chrono::Local;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{GrayImage, RgbImage};
use std::sync::Arc;
use uuid::Uuid;

use crate::artifact::PhotoStill;
use crate::constants::raster;
use crate::errors::AppError;
use crate::services::EncodedImage;
use crate::session::types::{CameraFrame, PixelFormat};

/// Copy frame data row by row, dropping stride padding
pub fn copy_without_stride(frame: &CameraFrame) -> Vec<u8> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let stride = frame.stride as usize;
    let row_bytes = width * frame.format.bytes_per_pixel();

    let mut result = Vec::with_capacity(row_bytes * height);
    for y in 0..height {
        let row_start = y * stride;
        let row_end = row_start + row_bytes;
        if row_end <= frame.data.len() {
            result.extend_from_slice(&frame.data[row_start..row_end]);
        }
    }
    result
}

/// Mirror a frame horizontally (selfie flip correction)
///
/// Applied to user-facing still captures from the front camera only; frames
/// sent to detection tasks keep sensor orientation.
pub fn mirror_horizontal(frame: &CameraFrame) -> CameraFrame {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let stride = frame.stride as usize;
    let bpp = frame.format.bytes_per_pixel();

    let mut mirrored = vec![0u8; width * height * bpp];
    for y in 0..height {
        let src_row = y * stride;
        let dst_row = y * width * bpp;
        for x in 0..width {
            let src = src_row + x * bpp;
            let dst = dst_row + (width - 1 - x) * bpp;
            if src + bpp <= frame.data.len() {
                mirrored[dst..dst + bpp].copy_from_slice(&frame.data[src..src + bpp]);
            }
        }
    }

    CameraFrame {
        width: frame.width,
        height: frame.height,
        data: Arc::from(mirrored),
        format: frame.format,
        stride: frame.width * bpp as u32,
        captured_at: frame.captured_at,
    }
}

/// Convert a frame to grayscale, downscaling so neither dimension exceeds
/// `max_dimension`
///
/// Uses nearest-neighbor sampling; QR finder patterns survive it and it
/// keeps the per-poll cost low.
pub fn to_luma(frame: &CameraFrame, max_dimension: u32) -> GrayImage {
    let stride = frame.stride as usize;
    let bpp = frame.format.bytes_per_pixel();

    let scale = (frame.width as f32 / max_dimension as f32)
        .max(frame.height as f32 / max_dimension as f32)
        .max(1.0);
    let dst_width = (frame.width as f32 / scale) as u32;
    let dst_height = (frame.height as f32 / scale) as u32;

    let mut pixels = Vec::with_capacity((dst_width * dst_height) as usize);
    for y in 0..dst_height {
        let src_y = (y as f32 * scale) as usize;
        for x in 0..dst_width {
            let src_x = (x as f32 * scale) as usize;
            let offset = src_y * stride + src_x * bpp;
            let luma = match frame.format {
                PixelFormat::Gray8 => frame.data.get(offset).copied().unwrap_or(0),
                PixelFormat::Rgba | PixelFormat::Rgb24 => {
                    let r = frame.data.get(offset).copied().unwrap_or(0) as f32;
                    let g = frame.data.get(offset + 1).copied().unwrap_or(0) as f32;
                    let b = frame.data.get(offset + 2).copied().unwrap_or(0) as f32;
                    (0.299 * r + 0.587 * g + 0.114 * b) as u8
                }
            };
            pixels.push(luma);
        }
    }

    GrayImage::from_raw(dst_width, dst_height, pixels)
        .unwrap_or_else(|| GrayImage::new(dst_width, dst_height))
}

/// Convert a frame to a packed RGB image, dropping alpha and stride
fn to_rgb_image(frame: &CameraFrame) -> Result<RgbImage, AppError> {
    let packed = copy_without_stride(frame);
    let width = frame.width;
    let height = frame.height;

    let rgb: Vec<u8> = match frame.format {
        PixelFormat::Rgb24 => packed,
        PixelFormat::Rgba => packed
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect(),
        PixelFormat::Gray8 => packed.iter().flat_map(|&l| [l, l, l]).collect(),
    };

    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| AppError::Other("frame data does not match its dimensions".to_string()))
}

/// Encode a frame as JPEG, optionally downscaling first.
/// Returns the encoded bytes and the encoded dimensions.
fn encode_jpeg_sync(
    frame: &CameraFrame,
    quality: u8,
    max_dimension: Option<u32>,
) -> Result<(Vec<u8>, u32, u32), AppError> {
    let mut rgb = to_rgb_image(frame)?;

    if let Some(max_dim) = max_dimension
        && (rgb.width() > max_dim || rgb.height() > max_dim)
    {
        let scale = (rgb.width() as f32 / max_dim as f32).max(rgb.height() as f32 / max_dim as f32);
        let new_width = (rgb.width() as f32 / scale) as u32;
        let new_height = (rgb.height() as f32 / scale) as u32;
        rgb = image::imageops::resize(&rgb, new_width, new_height, FilterType::Triangle);
    }

    let (width, height) = (rgb.width(), rgb.height());
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(&rgb)
        .map_err(|e| AppError::Other(format!("JPEG encoding failed: {e}")))?;

    Ok((bytes, width, height))
}

/// Encode a user-facing still capture
pub async fn encode_photo(frame: CameraFrame, quality: u8) -> Result<PhotoStill, AppError> {
    let (data, width, height) =
        tokio::task::spawn_blocking(move || encode_jpeg_sync(&frame, quality, None))
            .await
            .map_err(|e| AppError::Other(format!("photo encoding task panicked: {e}")))??;

    Ok(PhotoStill {
        id: Uuid::new_v4(),
        width,
        height,
        data: Arc::from(data),
        mime_type: "image/jpeg",
        taken_at: Local::now(),
    })
}

/// Encode a frame for a detection service call (downscaled, lower quality)
pub async fn encode_detection_image(frame: CameraFrame) -> Result<EncodedImage, AppError> {
    let (data, width, height) = tokio::task::spawn_blocking(move || {
        encode_jpeg_sync(
            &frame,
            raster::DETECTION_JPEG_QUALITY,
            Some(raster::DETECTION_MAX_DIMENSION),
        )
    })
    .await
    .map_err(|e| AppError::Other(format!("detection encoding task panicked: {e}")))??;

    Ok(EncodedImage {
        data: Arc::from(data),
        width,
        height,
        mime_type: "image/jpeg",
    })
}
