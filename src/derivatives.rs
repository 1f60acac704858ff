//! Derivative generation: full-size copy, budgeted preview, inline thumbnail.
//!
//! Three independent artifacts per photo, all derived from one decode of
//! the live source file:
//!
//! - **Full-size** — color-normalized re-encode at fixed high quality,
//!   written to `<out>/<id>.avif`.
//! - **Preview** — longer edge capped at [`PREVIEW_MAX_EDGE`], then an
//!   iterative quality/size search against [`PREVIEW_BUDGET_BYTES`],
//!   written to `<out>/<id>_preview.avif`.
//! - **Thumbnail** — an 8×8 JPEG embedded in the descriptor as a base64
//!   data URI, meant for instant-paint placeholders, not fidelity.
//!
//! Output filenames derive from the content hash, so regeneration is
//! idempotent and survives album reorganization for free.
//!
//! Failures are isolated twice over: a photo that cannot be decoded loses
//! all three derivatives but never aborts the batch, and a single failed
//! encode leaves the other two artifacts of the same photo intact.
//! Descriptors without a live source (already-persisted photos re-merged
//! without a re-scan) are skipped and keep the references they have.
//!
//! Photos are processed in parallel with rayon; each photo's pipeline is
//! independent and only touches its own descriptor.

use crate::types::PhotoDescriptor;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageEncoder};
use rayon::prelude::*;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Quality for the full-size re-encode.
const FULL_SIZE_QUALITY: u8 = 90;
/// Longer-edge cap for previews, in pixels. Never upscales.
pub const PREVIEW_MAX_EDGE: u32 = 1200;
/// Byte budget the preview search aims for.
pub const PREVIEW_BUDGET_BYTES: usize = 120 * 1024;
/// Descending quality steps tried against the budget.
const PREVIEW_QUALITY_LADDER: &[u8] = &[85, 75, 65, 55, 45];
/// Accepted unconditionally when the whole ladder misses the budget.
const PREVIEW_FLOOR_QUALITY: u8 = 40;
/// Thumbnail edge length — 8×8, squashed, not cropped.
const THUMBNAIL_EDGE: u32 = 8;
const THUMBNAIL_QUALITY: u8 = 50;
/// rav1e effort/speed tradeoff (0 = slowest/best, 10 = fastest).
const AVIF_SPEED: u8 = 6;

#[derive(Error, Debug)]
pub enum DeriveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to decode {0}: {1}")]
    Decode(String, String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Generate all derivatives for every descriptor with a live source.
///
/// Resulting references are written back into the descriptors. Per-photo
/// faults are logged and skipped; only creating the output directory can
/// fail the call.
pub fn generate_derivatives(photos: &mut [PhotoDescriptor], output_dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(output_dir)?;
    photos
        .par_iter_mut()
        .for_each(|photo| process_photo(photo, output_dir));
    Ok(())
}

/// Run the three generation procedures for one photo.
fn process_photo(photo: &mut PhotoDescriptor, output_dir: &Path) {
    let Some(source) = photo.source.clone() else {
        debug!(id = %photo.id, "no live source, keeping existing derivatives");
        return;
    };
    if !source.exists() {
        warn!(id = %photo.id, path = %source.display(), "source file disappeared, skipping derivatives");
        return;
    }

    // One decode feeds all three artifacts. An undecodable source leaves
    // every derivative absent for this photo; the batch continues.
    let img = match load_normalized(&source) {
        Ok(img) => img,
        Err(e) => {
            warn!(path = %source.display(), reason = %e, "skipping derivatives");
            return;
        }
    };

    match generate_full_size(&img, output_dir, &photo.id) {
        Ok(reference) => photo.full_size = Some(reference),
        Err(e) => warn!(path = %source.display(), reason = %e, "full-size generation failed"),
    }
    match generate_preview(&img, output_dir, &photo.id) {
        Ok(reference) => photo.preview = Some(reference),
        Err(e) => warn!(path = %source.display(), reason = %e, "preview generation failed"),
    }
    match generate_thumbnail(&img) {
        Ok(data_uri) => photo.thumbnail = Some(data_uri),
        Err(e) => warn!(path = %source.display(), reason = %e, "thumbnail generation failed"),
    }
}

/// Decode a source image and normalize to a plain RGB color model.
///
/// Palette, alpha, and CMYK-ish variants all collapse to RGB8 so every
/// encoder downstream sees the same pixel layout.
fn load_normalized(path: &Path) -> Result<DynamicImage, DeriveError> {
    let img = image::open(path)
        .map_err(|e| DeriveError::Decode(path.display().to_string(), e.to_string()))?;
    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}

/// Encode to AVIF in memory at the given quality.
fn encode_avif(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, DeriveError> {
    let mut buf = Vec::new();
    let encoder = AvifEncoder::new_with_speed_quality(&mut buf, AVIF_SPEED, quality);
    img.write_with_encoder(encoder)
        .map_err(|e| DeriveError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Full-resolution re-encode at fixed high quality.
fn generate_full_size(
    img: &DynamicImage,
    output_dir: &Path,
    id: &str,
) -> Result<String, DeriveError> {
    let output_path = output_dir.join(format!("{id}.avif"));
    let bytes = encode_avif(img, FULL_SIZE_QUALITY)?;
    std::fs::write(&output_path, &bytes)?;
    info!(path = %output_path.display(), kb = bytes.len() / 1024, "wrote full-size");
    Ok(output_path.display().to_string())
}

/// Dimensions for the preview: longer edge capped, aspect preserved,
/// never upscaled.
pub fn preview_dimensions(width: u32, height: u32) -> (u32, u32) {
    if width >= height {
        let w = width.min(PREVIEW_MAX_EDGE);
        (w, ((w as u64 * height as u64) / width as u64) as u32)
    } else {
        let h = height.min(PREVIEW_MAX_EDGE);
        (((h as u64 * width as u64) / height as u64) as u32, h)
    }
}

/// Iterative quality/size search for the preview encoding.
///
/// Walks the fixed descending quality ladder and accepts the first encode
/// that fits the budget. If none fits, one final encode at
/// [`PREVIEW_FLOOR_QUALITY`] is accepted whatever its size — the search
/// only promises that it tried, not that the budget was met.
///
/// Generic over the encode step so tests can drive it without paying for
/// real encodes.
pub fn search_preview_quality<F>(mut encode: F, budget: usize) -> Result<(u8, Vec<u8>), DeriveError>
where
    F: FnMut(u8) -> Result<Vec<u8>, DeriveError>,
{
    for &quality in PREVIEW_QUALITY_LADDER {
        let bytes = encode(quality)?;
        if bytes.len() <= budget {
            return Ok((quality, bytes));
        }
    }
    let bytes = encode(PREVIEW_FLOOR_QUALITY)?;
    Ok((PREVIEW_FLOOR_QUALITY, bytes))
}

/// Size-bounded preview: resize, search, persist the final encoding.
fn generate_preview(
    img: &DynamicImage,
    output_dir: &Path,
    id: &str,
) -> Result<String, DeriveError> {
    let (w, h) = preview_dimensions(img.width(), img.height());
    let resized = img.resize_exact(w, h, FilterType::Lanczos3);

    let (quality, bytes) =
        search_preview_quality(|q| encode_avif(&resized, q), PREVIEW_BUDGET_BYTES)?;

    let output_path = output_dir.join(format!("{id}_preview.avif"));
    std::fs::write(&output_path, &bytes)?;
    if bytes.len() > PREVIEW_BUDGET_BYTES {
        warn!(
            path = %output_path.display(),
            kb = bytes.len() / 1024,
            quality,
            "preview exceeds budget at floor quality"
        );
    } else {
        info!(path = %output_path.display(), kb = bytes.len() / 1024, quality, "wrote preview");
    }
    Ok(output_path.display().to_string())
}

/// Inline 8×8 placeholder thumbnail as a JPEG data URI.
fn generate_thumbnail(img: &DynamicImage) -> Result<String, DeriveError> {
    let small = img
        .resize_exact(THUMBNAIL_EDGE, THUMBNAIL_EDGE, FilterType::Lanczos3)
        .to_rgb8();

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, THUMBNAIL_QUALITY)
        .write_image(
            small.as_raw(),
            THUMBNAIL_EDGE,
            THUMBNAIL_EDGE,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| DeriveError::Encode(e.to_string()))?;

    Ok(format!("data:image/jpeg;base64,{}", BASE64.encode(&buf)))
}
