//! Catalog persistence: strict load, canonical ordering, whole-file save.
//!
//! The catalog is one JSON array of descriptors (see
//! [`types`](crate::types)). A missing file means an empty catalog — a
//! malformed one is a hard error, because silently dropping a corrupt
//! catalog would discard curated captions and tags.
//!
//! ## Ordering
//!
//! The persisted order is canonical: ascending by `dateTaken` (oldest
//! first), descriptors with an absent or unparseable timestamp sorting as
//! earliest, ties broken by `id`. [`Catalog::save`] imposes this order
//! unconditionally, so any transient ordering used mid-run never reaches
//! disk.
//!
//! Durability policy is whole-file overwrite on success: a crash mid-run
//! leaves the previous catalog file untouched.

use crate::describe::CATALOG_DATE_FORMAT;
use crate::types::PhotoDescriptor;
use chrono::NaiveDateTime;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The full set of photo descriptors, unique by `id`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Catalog {
    pub photos: Vec<PhotoDescriptor>,
}

impl Catalog {
    /// Load from disk. A missing file is an empty catalog; any element
    /// failing the descriptor schema fails the whole load.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let photos: Vec<PhotoDescriptor> = serde_json::from_str(&content)?;
        Ok(Self { photos })
    }

    /// Impose the canonical order and overwrite the catalog file.
    ///
    /// Pretty-printed, non-ASCII characters written verbatim, `source`
    /// excluded by the descriptor schema.
    pub fn save(&mut self, path: &Path) -> Result<(), CatalogError> {
        canonical_sort(&mut self.photos);
        let json = serde_json::to_string_pretty(&self.photos)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Sort descriptors ascending by capture time, absent earliest, ties by id.
pub fn canonical_sort(photos: &mut [PhotoDescriptor]) {
    photos.sort_by(|a, b| {
        date_sort_key(a.date_taken.as_deref())
            .cmp(&date_sort_key(b.date_taken.as_deref()))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Timestamp for ordering. Absent or unparseable values sort first.
fn date_sort_key(date_taken: Option<&str>) -> i64 {
    date_taken
        .and_then(|s| NaiveDateTime::parse_from_str(s, CATALOG_DATE_FORMAT).ok())
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(i64::MIN)
}
