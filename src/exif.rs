//! Raw EXIF extraction boundary.
//!
//! Reads the named raw fields the descriptor builder cares about from an
//! image file: camera model, lens, focal length, f-number, exposure time,
//! the two ISO-equivalent fields, GPS DMS triples, and the local capture
//! timestamp. Every field is independently optional — a photo with GPS but
//! no lens tag is normal, not an error.
//!
//! Raw values cross this boundary untouched (rationals as `f64`, the
//! timestamp as the EXIF `YYYY:MM:DD HH:MM:SS` string). Normalization to
//! display form happens in [`describe`](crate::describe).

use exif::{In, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExifError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no EXIF metadata present")]
    Absent,
    #[error("failed to read EXIF data: {0}")]
    Malformed(String),
}

/// Raw extracted fields for one photo, each possibly absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawExif {
    /// Camera body (EXIF `Model`).
    pub camera: Option<String>,
    /// Lens model (EXIF `LensModel`).
    pub lens: Option<String>,
    /// Focal length in millimeters.
    pub focal_length: Option<f64>,
    /// Aperture f-number.
    pub f_number: Option<f64>,
    /// Exposure time in seconds.
    pub exposure_time: Option<f64>,
    /// Primary sensitivity (EXIF `PhotographicSensitivity`). May carry the
    /// 65535 "not representable" sentinel; resolved downstream.
    pub iso: Option<u32>,
    /// Alternate sensitivity (EXIF `RecommendedExposureIndex`).
    pub iso_alternate: Option<u32>,
    /// Latitude as a degrees/minutes/seconds triple.
    pub gps_latitude: Option<(f64, f64, f64)>,
    /// Longitude as a degrees/minutes/seconds triple.
    pub gps_longitude: Option<(f64, f64, f64)>,
    /// Local capture timestamp, `YYYY:MM:DD HH:MM:SS`.
    pub datetime_original: Option<String>,
}

/// Read the raw EXIF fields from an image file.
///
/// Returns [`ExifError::Absent`] when the file carries no EXIF segment at
/// all; partially damaged segments are distilled into whatever fields were
/// readable.
pub fn read_exif(path: &Path) -> Result<RawExif, ExifError> {
    let file = File::open(path)?;
    let mut reader = exif::Reader::new();
    reader.continue_on_error(true);

    let exif = reader
        .read_from_container(&mut BufReader::new(file))
        .or_else(|e| e.distill_partial_result(|_| {}))
        .map_err(|e| match e {
            exif::Error::NotFound(_) => ExifError::Absent,
            other => ExifError::Malformed(other.to_string()),
        })?;

    Ok(RawExif {
        camera: ascii_field(&exif, Tag::Model),
        lens: ascii_field(&exif, Tag::LensModel),
        focal_length: rational_field(&exif, Tag::FocalLength),
        f_number: rational_field(&exif, Tag::FNumber),
        exposure_time: rational_field(&exif, Tag::ExposureTime),
        iso: uint_field(&exif, Tag::PhotographicSensitivity),
        iso_alternate: uint_field(&exif, Tag::RecommendedExposureIndex),
        gps_latitude: dms_field(&exif, Tag::GPSLatitude),
        gps_longitude: dms_field(&exif, Tag::GPSLongitude),
        datetime_original: ascii_field(&exif, Tag::DateTimeOriginal),
    })
}

/// Extract an ASCII string field, trimmed; empty strings become absent.
fn ascii_field(exif: &exif::Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let Value::Ascii(ref chunks) = field.value else {
        return None;
    };
    let raw = chunks.first()?;
    let text = String::from_utf8_lossy(raw);
    let trimmed = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Extract the first rational of a field as `f64`.
fn rational_field(exif: &exif::Exif, tag: Tag) -> Option<f64> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match field.value {
        Value::Rational(ref r) if !r.is_empty() => Some(r[0].to_f64()),
        Value::SRational(ref r) if !r.is_empty() => Some(r[0].to_f64()),
        _ => None,
    }
}

/// Extract an unsigned integer field.
fn uint_field(exif: &exif::Exif, tag: Tag) -> Option<u32> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    field.value.get_uint(0)
}

/// Extract a GPS coordinate stored as \[degrees, minutes, seconds\].
fn dms_field(exif: &exif::Exif, tag: Tag) -> Option<(f64, f64, f64)> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let Value::Rational(ref r) = field.value else {
        return None;
    };
    if r.len() < 3 {
        return None;
    }
    Some((r[0].to_f64(), r[1].to_f64(), r[2].to_f64()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, RgbImage};

    /// A valid JPEG with no EXIF segment at all.
    fn create_bare_jpeg(path: &Path) {
        let img = RgbImage::from_pixel(16, 16, image::Rgb([90, 90, 90]));
        let file = File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new(writer)
            .write_image(img.as_raw(), 16, 16, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    #[test]
    fn jpeg_without_exif_is_absent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("plain.jpg");
        create_bare_jpeg(&path);

        assert!(matches!(read_exif(&path), Err(ExifError::Absent)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = read_exif(Path::new("/nonexistent/photo.jpg"));
        assert!(matches!(result, Err(ExifError::Io(_))));
    }

    #[test]
    fn garbage_file_is_not_fatal_kind() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("noise.jpg");
        std::fs::write(&path, b"definitely not an image").unwrap();

        // Either "no container found" or a malformed report — never Io, and
        // never a panic. The caller treats both the same way.
        match read_exif(&path) {
            Err(ExifError::Absent) | Err(ExifError::Malformed(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn default_raw_exif_is_all_absent() {
        let raw = RawExif::default();
        assert!(raw.camera.is_none());
        assert!(raw.gps_latitude.is_none());
        assert!(raw.datetime_original.is_none());
    }
}
