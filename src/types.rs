//! Descriptor types shared across the pipeline.
//!
//! These types define the schema of the persisted catalog file: one JSON
//! array of [`PhotoDescriptor`] objects, field names in camelCase. Absent
//! fields are written as explicit `null` so that someone hand-editing the
//! catalog can see every fillable slot.
//!
//! Deserialization is strict (`deny_unknown_fields`): a catalog element
//! that doesn't satisfy this schema fails the whole load rather than being
//! silently dropped.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identity and metadata for one physical photo.
///
/// The `id` is a SHA-256 digest of the raw file bytes — identical bytes
/// produce identical ids regardless of path or filename, and the id is the
/// sole deduplication key across scans.
///
/// `title`, `caption`, and `tags` are curated by hand in the catalog file;
/// nothing in the pipeline ever writes them, and the merge engine never
/// overwrites a non-absent value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhotoDescriptor {
    /// Content hash of the source file (hex SHA-256).
    pub id: String,
    /// Process-local path to the originating file. Never persisted.
    #[serde(skip)]
    pub source: Option<PathBuf>,
    /// Curated display title.
    pub title: Option<String>,
    /// Curated caption text.
    pub caption: Option<String>,
    /// Inline micro-thumbnail as a `data:image/jpeg;base64,…` URI.
    pub thumbnail: Option<String>,
    /// Path to the size-bounded preview derivative.
    pub preview: Option<String>,
    /// Path to the full-resolution derivative.
    #[serde(rename = "fullSize")]
    pub full_size: Option<String>,
    /// Original width/height, rounded to 2 decimals.
    #[serde(rename = "aspectRatio")]
    pub aspect_ratio: Option<f64>,
    pub location: PhotoLocation,
    pub metadata: PhotoMetadata,
    /// Curated tag list.
    pub tags: Vec<String>,
    /// Local capture time as `YYYY/MM/DD HH:MM:SS`, no timezone.
    #[serde(rename = "dateTaken")]
    pub date_taken: Option<String>,
}

/// Where a photo was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhotoLocation {
    /// Latitude in decimal degrees.
    pub lat: Option<f64>,
    /// Longitude in decimal degrees.
    pub lng: Option<f64>,
    /// Human-readable place string from the resolver.
    pub name: Option<String>,
}

/// Normalized display metadata derived from raw EXIF values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhotoMetadata {
    /// Camera body, e.g. `"ILCE-7M4"`.
    pub camera: Option<String>,
    /// Lens model string.
    pub lens: Option<String>,
    /// Focal length, e.g. `"35mm"`.
    pub focal: Option<String>,
    /// ISO sensitivity. The EXIF 65535 sentinel never appears here.
    pub iso: Option<u32>,
    /// Aperture, e.g. `"ƒ/2.8"`.
    pub aperture: Option<String>,
    /// Exposure time, e.g. `"1/250s"` or `"2s"`.
    #[serde(rename = "shutterSpeed")]
    pub shutter_speed: Option<String>,
}

impl PhotoDescriptor {
    /// A descriptor with only identity populated. Every derived field
    /// starts absent and is filled independently by the builder.
    pub fn new(id: String, source: PathBuf) -> Self {
        Self {
            id,
            source: Some(source),
            title: None,
            caption: None,
            thumbnail: None,
            preview: None,
            full_size: None,
            aspect_ratio: None,
            location: PhotoLocation {
                lat: None,
                lng: None,
                name: None,
            },
            metadata: PhotoMetadata {
                camera: None,
                lens: None,
                focal: None,
                iso: None,
                aperture: None,
                shutter_speed: None,
            },
            tags: Vec::new(),
            date_taken: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_descriptor_has_only_identity() {
        let d = PhotoDescriptor::new("abc123".into(), PathBuf::from("/photos/a.jpg"));
        assert_eq!(d.id, "abc123");
        assert_eq!(d.source, Some(PathBuf::from("/photos/a.jpg")));
        assert!(d.title.is_none());
        assert!(d.thumbnail.is_none());
        assert!(d.metadata.camera.is_none());
        assert!(d.location.lat.is_none());
        assert!(d.tags.is_empty());
    }

    #[test]
    fn serializes_camel_case_wire_names() {
        let d = PhotoDescriptor::new("id1".into(), PathBuf::from("/x.jpg"));
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"fullSize\""));
        assert!(json.contains("\"aspectRatio\""));
        assert!(json.contains("\"dateTaken\""));
        assert!(json.contains("\"shutterSpeed\""));
    }

    #[test]
    fn source_is_never_serialized() {
        let d = PhotoDescriptor::new("id1".into(), PathBuf::from("/secret/path.jpg"));
        let json = serde_json::to_string(&d).unwrap();
        assert!(!json.contains("source"));
        assert!(!json.contains("secret"));
    }

    #[test]
    fn absent_fields_serialize_as_null() {
        let d = PhotoDescriptor::new("id1".into(), PathBuf::from("/x.jpg"));
        let v: serde_json::Value = serde_json::to_value(&d).unwrap();
        assert!(v["title"].is_null());
        assert!(v["location"]["lat"].is_null());
        assert!(v["metadata"]["iso"].is_null());
    }

    #[test]
    fn deserialization_rejects_unknown_fields() {
        let json = r#"{
            "id": "x", "title": null, "caption": null, "thumbnail": null,
            "preview": null, "fullSize": null, "aspectRatio": null,
            "location": {"lat": null, "lng": null, "name": null},
            "metadata": {"camera": null, "lens": null, "focal": null,
                         "iso": null, "aperture": null, "shutterSpeed": null},
            "tags": [], "dateTaken": null,
            "bogus": true
        }"#;
        assert!(serde_json::from_str::<PhotoDescriptor>(json).is_err());
    }

    #[test]
    fn unicode_round_trips_verbatim() {
        let mut d = PhotoDescriptor::new("id1".into(), PathBuf::from("/x.jpg"));
        d.metadata.aperture = Some("ƒ/2.8".into());
        d.caption = Some("夕暮れの海".into());
        let json = serde_json::to_string_pretty(&d).unwrap();
        assert!(json.contains("ƒ/2.8"));
        assert!(json.contains("夕暮れの海"));
        let back: PhotoDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back.metadata.aperture, d.metadata.aperture);
        assert_eq!(back.caption, d.caption);
    }
}
