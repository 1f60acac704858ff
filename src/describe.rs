//! Descriptor construction: content identity plus field normalization.
//!
//! [`describe_photo`] turns one source file into a [`PhotoDescriptor`].
//! The content hash must always succeed (or the file is not describable at
//! all); everything downstream of it is best-effort. Metadata that cannot
//! be read leaves its fields absent and the run continues.
//!
//! Every normalization helper is total: raw absent maps to derived absent,
//! and no input value can make one panic.

use crate::exif::{self, RawExif};
use crate::geocode::{self, PlaceResolver};
use crate::types::PhotoDescriptor;
use chrono::NaiveDateTime;
use sha2::{Digest, Sha256};
use std::io;
use std::path::Path;
use tracing::warn;

/// EXIF sentinel for "sensitivity not representable in this field".
/// Translated to absent at this boundary; it never enters the catalog.
pub const ISO_UNKNOWN: u32 = 65535;

/// Timestamp format of the raw EXIF `DateTimeOriginal` value.
const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
/// Canonical timestamp format persisted in the catalog.
pub const CATALOG_DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// SHA-256 of a file's raw bytes as a hex string — the photo's identity.
pub fn content_hash(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// Render an exposure time in seconds as `"2s"` or `"1/250s"`.
///
/// Sub-second denominators truncate rather than round, matching how
/// cameras label their shutter steps.
pub fn format_shutter_speed(seconds: f64) -> String {
    if seconds >= 1.0 {
        format!("{}s", seconds.round() as u64)
    } else {
        format!("1/{}s", (1.0 / seconds) as u64)
    }
}

/// Render a focal length as `"35mm"` (nearest integer).
pub fn format_focal(millimeters: f64) -> String {
    format!("{}mm", millimeters.round() as i64)
}

/// Render an f-number as `"ƒ/2"` or `"ƒ/2.83"`.
///
/// Rounded to 2 decimals; a whole-number result drops the fraction
/// entirely, and no trailing zeros are padded beyond what rounding left.
pub fn format_aperture(f_number: f64) -> String {
    let rounded = (f_number * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("ƒ/{}", rounded as i64)
    } else {
        format!("ƒ/{}", rounded)
    }
}

/// Degrees/minutes/seconds to decimal degrees.
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}

/// Resolve the ISO value, preferring the primary sensitivity field.
///
/// When the primary carries the [`ISO_UNKNOWN`] sentinel, the recommended
/// exposure index substitutes for it; a sentinel with no alternate
/// resolves to absent.
pub fn resolve_iso(primary: Option<u32>, alternate: Option<u32>) -> Option<u32> {
    match primary {
        Some(ISO_UNKNOWN) => alternate,
        other => other,
    }
}

/// Re-render the raw EXIF local timestamp to the canonical catalog format.
///
/// The EXIF value is already local time; no timezone is attached or
/// reinterpreted. Unparseable input maps to absent.
pub fn format_date_taken(raw: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(raw, EXIF_DATE_FORMAT)
        .ok()
        .map(|dt| dt.format(CATALOG_DATE_FORMAT).to_string())
}

/// Width/height of the original, rounded to 2 decimals.
///
/// Absent when the image cannot be opened — that must not abort the file.
pub fn aspect_ratio(path: &Path) -> Option<f64> {
    let (width, height) = image::image_dimensions(path).ok()?;
    if height == 0 {
        return None;
    }
    let ratio = width as f64 / height as f64;
    Some((ratio * 100.0).round() / 100.0)
}

/// Build the descriptor for one source file.
///
/// The only hard requirement is hashing the bytes; an unreadable or absent
/// EXIF segment is logged and yields a descriptor with only `id` (and
/// `source`) populated.
pub fn describe_photo(
    path: &Path,
    resolver: &dyn PlaceResolver,
) -> io::Result<PhotoDescriptor> {
    let id = content_hash(path)?;
    let mut descriptor = PhotoDescriptor::new(id, path.to_path_buf());

    match exif::read_exif(path) {
        Ok(raw) => apply_exif(&mut descriptor, &raw, path, resolver),
        Err(e) => {
            warn!(path = %path.display(), reason = %e, "skipping metadata extraction");
        }
    }

    Ok(descriptor)
}

/// Populate the derived fields of a descriptor from raw EXIF values.
///
/// Each field derives independently; one absent raw value never blocks the
/// others.
pub fn apply_exif(
    descriptor: &mut PhotoDescriptor,
    raw: &RawExif,
    path: &Path,
    resolver: &dyn PlaceResolver,
) {
    descriptor.aspect_ratio = aspect_ratio(path);

    descriptor.metadata.camera = raw.camera.clone();
    descriptor.metadata.lens = raw.lens.clone();
    descriptor.metadata.focal = raw.focal_length.map(format_focal);
    descriptor.metadata.aperture = raw.f_number.map(format_aperture);
    descriptor.metadata.iso = resolve_iso(raw.iso, raw.iso_alternate);
    descriptor.metadata.shutter_speed = raw
        .exposure_time
        .filter(|&v| v > 0.0)
        .map(format_shutter_speed);

    let lat = raw.gps_latitude.map(|(d, m, s)| dms_to_decimal(d, m, s));
    let lng = raw.gps_longitude.map(|(d, m, s)| dms_to_decimal(d, m, s));
    descriptor.location.lat = lat;
    descriptor.location.lng = lng;
    // Both coordinates must be present to attempt a lookup.
    if let (Some(lat), Some(lng)) = (lat, lng) {
        descriptor.location.name = resolver
            .resolve(lat, lng)
            .map(|place| geocode::format_place_name(&place));
    }

    descriptor.date_taken = raw
        .datetime_original
        .as_deref()
        .and_then(format_date_taken);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::{NullResolver, ResolvedPlace};
    use image::{ImageEncoder, RgbImage};
    use std::fs;
    use tempfile::TempDir;

    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let file = fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    struct FixedResolver(ResolvedPlace);

    impl PlaceResolver for FixedResolver {
        fn resolve(&self, _lat: f64, _lng: f64) -> Option<ResolvedPlace> {
            Some(self.0.clone())
        }
    }

    // =========================================================================
    // Shutter speed
    // =========================================================================

    #[test]
    fn shutter_fraction_of_a_second() {
        assert_eq!(format_shutter_speed(0.004), "1/250s");
        assert_eq!(format_shutter_speed(1.0 / 8000.0), "1/8000s");
        assert_eq!(format_shutter_speed(0.5), "1/2s");
    }

    #[test]
    fn shutter_whole_seconds() {
        assert_eq!(format_shutter_speed(2.0), "2s");
        assert_eq!(format_shutter_speed(30.0), "30s");
        assert_eq!(format_shutter_speed(1.0), "1s");
    }

    // =========================================================================
    // Focal length / aperture
    // =========================================================================

    #[test]
    fn focal_rounds_to_nearest_integer() {
        assert_eq!(format_focal(23.7), "24mm");
        assert_eq!(format_focal(35.0), "35mm");
        assert_eq!(format_focal(16.4), "16mm");
    }

    #[test]
    fn aperture_whole_values_drop_fraction() {
        assert_eq!(format_aperture(2.0), "ƒ/2");
        assert_eq!(format_aperture(8.0), "ƒ/8");
    }

    #[test]
    fn aperture_fractional_values_keep_two_decimals_max() {
        assert_eq!(format_aperture(2.83), "ƒ/2.83");
        assert_eq!(format_aperture(1.8), "ƒ/1.8");
        // Rounding collapses to a whole number
        assert_eq!(format_aperture(3.9999), "ƒ/4");
    }

    // =========================================================================
    // Coordinates / ISO / dates
    // =========================================================================

    #[test]
    fn dms_converts_to_decimal_degrees() {
        let decimal = dms_to_decimal(48.0, 51.0, 30.24);
        assert!((decimal - 48.8584).abs() < 1e-4);
    }

    #[test]
    fn dms_zero_minutes_seconds() {
        assert_eq!(dms_to_decimal(90.0, 0.0, 0.0), 90.0);
    }

    #[test]
    fn iso_sentinel_falls_back_to_alternate() {
        assert_eq!(resolve_iso(Some(65535), Some(400)), Some(400));
    }

    #[test]
    fn iso_sentinel_without_alternate_is_absent() {
        assert_eq!(resolve_iso(Some(65535), None), None);
    }

    #[test]
    fn iso_normal_value_ignores_alternate() {
        assert_eq!(resolve_iso(Some(100), Some(400)), Some(100));
        assert_eq!(resolve_iso(None, Some(400)), None);
    }

    #[test]
    fn date_taken_rerenders_without_timezone() {
        assert_eq!(
            format_date_taken("2023:08:14 17:05:09"),
            Some("2023/08/14 17:05:09".to_string())
        );
    }

    #[test]
    fn date_taken_rejects_malformed_input() {
        assert_eq!(format_date_taken("2023-08-14 17:05:09"), None);
        assert_eq!(format_date_taken("not a date"), None);
        assert_eq!(format_date_taken(""), None);
    }

    // =========================================================================
    // Aspect ratio
    // =========================================================================

    #[test]
    fn aspect_ratio_rounds_to_two_decimals() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("wide.jpg");
        create_test_jpeg(&path, 300, 200);
        assert_eq!(aspect_ratio(&path), Some(1.5));

        let path = tmp.path().join("threes.jpg");
        create_test_jpeg(&path, 400, 300);
        assert_eq!(aspect_ratio(&path), Some(1.33));
    }

    #[test]
    fn aspect_ratio_absent_for_unreadable_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("corrupt.jpg");
        fs::write(&path, b"not an image").unwrap();
        assert_eq!(aspect_ratio(&path), None);
        assert_eq!(aspect_ratio(Path::new("/nonexistent.jpg")), None);
    }

    // =========================================================================
    // Identity
    // =========================================================================

    #[test]
    fn identical_bytes_produce_identical_ids() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("original.jpg");
        let b = tmp.path().join("copy-with-other-name.jpg");
        create_test_jpeg(&a, 64, 48);
        fs::copy(&a, &b).unwrap();

        assert_eq!(content_hash(&a).unwrap(), content_hash(&b).unwrap());
    }

    #[test]
    fn different_bytes_produce_different_ids() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.jpg");
        let b = tmp.path().join("b.jpg");
        create_test_jpeg(&a, 64, 48);
        create_test_jpeg(&b, 48, 64);

        assert_ne!(content_hash(&a).unwrap(), content_hash(&b).unwrap());
    }

    // =========================================================================
    // describe_photo / apply_exif
    // =========================================================================

    #[test]
    fn describe_without_exif_yields_id_only() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bare.jpg");
        create_test_jpeg(&path, 64, 48);

        let d = describe_photo(&path, &NullResolver).unwrap();
        assert_eq!(d.id.len(), 64);
        assert_eq!(d.source.as_deref(), Some(path.as_path()));
        assert!(d.aspect_ratio.is_none());
        assert!(d.metadata.camera.is_none());
        assert!(d.date_taken.is_none());
    }

    #[test]
    fn describe_missing_file_fails() {
        assert!(describe_photo(Path::new("/nonexistent.jpg"), &NullResolver).is_err());
    }

    #[test]
    fn apply_exif_populates_each_field_independently() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo.jpg");
        create_test_jpeg(&path, 300, 200);

        let raw = RawExif {
            camera: Some("ILCE-7M4".into()),
            lens: None,
            focal_length: Some(34.6),
            f_number: Some(2.83),
            exposure_time: Some(0.004),
            iso: Some(65535),
            iso_alternate: Some(400),
            gps_latitude: Some((48.0, 51.0, 30.24)),
            gps_longitude: Some((2.0, 17.0, 40.2)),
            datetime_original: Some("2023:08:14 17:05:09".into()),
        };

        let mut d = PhotoDescriptor::new("x".into(), path.clone());
        apply_exif(&mut d, &raw, &path, &NullResolver);

        assert_eq!(d.aspect_ratio, Some(1.5));
        assert_eq!(d.metadata.camera.as_deref(), Some("ILCE-7M4"));
        assert!(d.metadata.lens.is_none());
        assert_eq!(d.metadata.focal.as_deref(), Some("35mm"));
        assert_eq!(d.metadata.aperture.as_deref(), Some("ƒ/2.83"));
        assert_eq!(d.metadata.iso, Some(400));
        assert_eq!(d.metadata.shutter_speed.as_deref(), Some("1/250s"));
        assert!(d.location.lat.is_some());
        assert!(d.location.lng.is_some());
        assert!(d.location.name.is_none()); // NullResolver
        assert_eq!(d.date_taken.as_deref(), Some("2023/08/14 17:05:09"));
    }

    #[test]
    fn place_lookup_requires_both_coordinates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo.jpg");
        create_test_jpeg(&path, 64, 64);

        let resolver = FixedResolver(ResolvedPlace {
            country_code: "FR".into(),
            admin1: "Île-de-France".into(),
            admin2: "Paris".into(),
            name: "Paris".into(),
        });

        let raw = RawExif {
            gps_latitude: Some((48.0, 51.0, 30.24)),
            gps_longitude: None,
            ..RawExif::default()
        };
        let mut d = PhotoDescriptor::new("x".into(), path.clone());
        apply_exif(&mut d, &raw, &path, &resolver);
        assert!(d.location.lat.is_some());
        assert!(d.location.name.is_none());

        let raw = RawExif {
            gps_latitude: Some((48.0, 51.0, 30.24)),
            gps_longitude: Some((2.0, 17.0, 40.2)),
            ..RawExif::default()
        };
        let mut d = PhotoDescriptor::new("x".into(), path.clone());
        apply_exif(&mut d, &raw, &path, &resolver);
        assert_eq!(d.location.name.as_deref(), Some("FR, Île-de-France, Paris"));
    }
}
