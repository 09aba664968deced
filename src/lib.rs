//! # gallery-gen
//!
//! Builds the JSON manifest and thumbnail cache behind a static photography
//! portfolio. The filesystem is the data source: every subdirectory of the
//! galleries root is a collection, every recognised image file in it is a
//! gallery image.
//!
//! # Architecture: Scan → Generate → Write
//!
//! ```text
//! 1. Scan      galleries/   →  CollectionListing[]   (directory listing only)
//! 2. Generate  listings     →  Collection[]          (thumbnails + metadata)
//! 3. Write     collections  →  galleries.json        (atomic replace)
//! ```
//!
//! Every run recomputes the whole manifest. The only state carried between
//! runs is the per-collection `thumbs/` directory, whose files are reused
//! while they are at least as new as their source.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Lists collections and images, selects covers, skips empty directories |
//! | [`generate`] | Builds each collection, orders them, writes the manifest |
//! | [`imaging`] | Thumbnail and metadata capabilities: traits, pure-Rust backend, EXIF/IPTC parsers |
//! | [`cache`] | Thumbnail freshness by modification time, run statistics |
//! | [`metadata`] | Caption/date resolution and `metadata.json` overrides |
//! | [`naming`] | Natural sort, label derivation, recognised file names |
//! | [`config`] | Optional `config.toml` loading and validation |
//! | [`types`] | Manifest types serialized to `galleries.json` |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Capabilities, Not Feature Flags
//!
//! Thumbnailing and metadata extraction are injected as trait objects
//! ([`imaging::Thumbnailer`], [`imaging::MetadataReader`]). Turning one off
//! means passing [`imaging::NullBackend`] instead; the manifest stays complete,
//! with `thumb == src` or empty captions. The choice is made once, in `main`.
//!
//! ## Natural Ordering
//!
//! Images and collection labels are ordered by [`naming::natural_cmp`], a pure
//! comparator where digit runs compare by value. `img2` sorts before `img10`
//! on every machine, independent of locale.
//!
//! ## Thumbnails That Never Lie
//!
//! A thumbnail is written to a temporary file and renamed into place, then
//! stamped with its source's modification time. A thumbnail on disk is thus
//! always complete, and an untouched source is never re-encoded.

pub mod cache;
pub mod config;
pub mod generate;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
