//! # Photodex
//!
//! A content-addressed photo catalog builder for static galleries. Point
//! it at a directory of photos and it maintains a single JSON catalog —
//! one descriptor per unique photo — plus the web derivatives a gallery
//! front-end needs.
//!
//! # Architecture: Scan → Merge → Derive → Save
//!
//! Every run executes the same four stages against one catalog file:
//!
//! ```text
//! 1. Scan    image_dir/       →  incoming descriptors  (hash + EXIF per file)
//! 2. Merge   catalog ⊎ scan   →  merged catalog        (fill only absent fields)
//! 3. Derive  merged catalog   →  <project>/            (full-size, preview, thumbnail)
//! 4. Save    merged catalog   →  <project>.json        (canonical order, whole file)
//! ```
//!
//! Two properties make re-running unconditionally safe:
//!
//! - **Content addressing**: a photo's identity is the SHA-256 of its
//!   bytes. Renaming, moving, or re-importing a file never creates a
//!   duplicate entry, and derivative filenames (derived from the hash)
//!   stay stable across reorganizations.
//! - **Fill-only-if-absent merge**: the catalog file is meant to be
//!   edited by hand. A re-scan only fills fields that are currently
//!   absent, so curated titles, captions, and tags always survive.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the image directory and describes every matching file |
//! | [`describe`] | Content hashing and EXIF-to-display normalization |
//! | [`exif`] | Raw EXIF field extraction (camera strings, rationals, GPS) |
//! | [`geocode`] | Place-name resolution seam and display formatting |
//! | [`merge`] | Fill-only-if-absent reconciliation of scans against the catalog |
//! | [`derivatives`] | Full-size, budgeted-preview, and inline-thumbnail generation |
//! | [`catalog`] | Catalog persistence: strict load, canonical order, whole-file save |
//! | [`types`] | The persisted descriptor schema |
//!
//! # Design Decisions
//!
//! ## The Catalog Is the Interface
//!
//! There is no edit subcommand and no metadata flags. The workflow is:
//! run, open `<project>.json` in an editor, fill in titles and captions,
//! run again whenever the photo set changes. Everything about the file
//! format serves that loop — pretty-printed JSON, explicit `null` for
//! every fillable slot, non-ASCII text verbatim, stable ascending
//! `dateTaken` order so diffs stay small.
//!
//! ## AVIF Derivatives
//!
//! Generated images are AVIF, encoded in pure Rust via `rav1e`. One
//! modern, universally supported format keeps the output directory to
//! two files per photo, and the absence of system codec dependencies
//! keeps the binary self-contained.
//!
//! ## Previews Are Budgeted, Not Fixed-Quality
//!
//! A gallery grid loads dozens of previews at once, so each one targets
//! a byte budget rather than a quality setting: qualities are tried in
//! descending order until one fits, with a floor so pathological images
//! still produce something.

pub mod catalog;
pub mod derivatives;
pub mod describe;
pub mod exif;
pub mod geocode;
pub mod merge;
pub mod scan;
pub mod types;
