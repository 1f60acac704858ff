//! Source discovery: walk a directory tree and describe every image file.
//!
//! The walk is recursive and filters on *filename only*, against a
//! caller-supplied regular expression (the CLI anchors it and makes it
//! case-insensitive before it gets here). Directory names never
//! participate in the match.
//!
//! Output is keyed by content hash, so two files with identical bytes
//! collapse to a single incoming descriptor regardless of where in the
//! tree they sit. A file that cannot be read or described is logged and
//! skipped; only a missing scan root fails the whole scan.

use crate::describe;
use crate::geocode::PlaceResolver;
use crate::types::PhotoDescriptor;
use rayon::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("image directory does not exist: {0}")]
    MissingRoot(PathBuf),
}

/// Walk `root` and build descriptors for every file whose name matches
/// `filter`, keyed by content hash.
pub fn scan(
    root: &Path,
    filter: &Regex,
    resolver: &dyn PlaceResolver,
) -> Result<BTreeMap<String, PhotoDescriptor>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }

    let paths = collect_matching_files(root, filter);
    info!(count = paths.len(), root = %root.display(), "scanning image files");

    // Hashing and EXIF parsing are independent per file.
    let described: Vec<PhotoDescriptor> = paths
        .par_iter()
        .filter_map(|path| match describe::describe_photo(path, resolver) {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                warn!(path = %path.display(), reason = %e, "skipping unreadable file");
                None
            }
        })
        .collect();

    let mut incoming: BTreeMap<String, PhotoDescriptor> = BTreeMap::new();
    for descriptor in described {
        if let Some(previous) = incoming.insert(descriptor.id.clone(), descriptor) {
            debug!(
                id = %previous.id,
                path = %previous.source.as_deref().unwrap_or(Path::new("?")).display(),
                "duplicate content, collapsed into one entry"
            );
        }
    }
    Ok(incoming)
}

/// Collect matching file paths in a stable order. Unreadable directory
/// entries are logged and skipped.
fn collect_matching_files(root: &Path, filter: &Regex) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!(reason = %e, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter(|e| filter.is_match(&e.file_name().to_string_lossy()))
        .map(|e| e.into_path())
        .collect();
    paths.sort();
    paths
}
