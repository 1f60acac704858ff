//! Fill-only-if-absent reconciliation of scans against the catalog.
//!
//! Repeated scans must be able to refresh derived data without ever
//! clobbering curated data. The rule is per-field and explicit: a field is
//! taken from the incoming descriptor only when the catalog's current
//! value is absent. A field that already holds a value keeps it, even when
//! the freshly scanned value differs.
//!
//! The rule table is written out field by field (rather than derived via
//! any generic traversal) so the curated-data-wins guarantee stays
//! auditable: adding a field to the descriptor forces a decision here.
//!
//! Merging the same incoming set twice is a no-op the second time.

use crate::catalog::{self, Catalog};
use crate::types::PhotoDescriptor;
use std::collections::BTreeMap;

/// Reconcile an incoming id-keyed scan against the existing catalog.
///
/// Unknown ids insert verbatim; known ids reconcile field-by-field for the
/// descriptor and its two nested records independently. The result is the
/// union keyed by `id`, in canonical order.
pub fn merge(existing: Catalog, incoming: BTreeMap<String, PhotoDescriptor>) -> Catalog {
    let mut by_id: BTreeMap<String, PhotoDescriptor> = existing
        .photos
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

    for (id, fresh) in incoming {
        match by_id.get_mut(&id) {
            Some(current) => reconcile(current, fresh),
            None => {
                by_id.insert(id, fresh);
            }
        }
    }

    let mut photos: Vec<PhotoDescriptor> = by_id.into_values().collect();
    catalog::canonical_sort(&mut photos);
    Catalog { photos }
}

/// Replace a slot's value only when it is currently absent.
fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

/// Field-by-field reconciliation for one descriptor already in the catalog.
///
/// `source` sits outside the rule table: it is never persisted, but the
/// incoming scan's live path is carried over so the derivative pipeline
/// (which runs after merge) can refresh artifacts for re-scanned photos.
fn reconcile(current: &mut PhotoDescriptor, fresh: PhotoDescriptor) {
    current.source = fresh.source;

    fill(&mut current.title, fresh.title);
    fill(&mut current.caption, fresh.caption);
    fill(&mut current.thumbnail, fresh.thumbnail);
    fill(&mut current.preview, fresh.preview);
    fill(&mut current.full_size, fresh.full_size);
    fill(&mut current.aspect_ratio, fresh.aspect_ratio);
    fill(&mut current.date_taken, fresh.date_taken);
    if current.tags.is_empty() {
        current.tags = fresh.tags;
    }

    fill(&mut current.location.lat, fresh.location.lat);
    fill(&mut current.location.lng, fresh.location.lng);
    fill(&mut current.location.name, fresh.location.name);

    fill(&mut current.metadata.camera, fresh.metadata.camera);
    fill(&mut current.metadata.lens, fresh.metadata.lens);
    fill(&mut current.metadata.focal, fresh.metadata.focal);
    fill(&mut current.metadata.iso, fresh.metadata.iso);
    fill(&mut current.metadata.aperture, fresh.metadata.aperture);
    fill(
        &mut current.metadata.shutter_speed,
        fresh.metadata.shutter_speed,
    );
}
