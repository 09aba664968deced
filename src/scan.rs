//! Filesystem scanning.
//!
//! Stage 1 of the generator. Lists the galleries root to discover collections
//! and their images, without touching image contents.
//!
//! ## Directory Structure
//!
//! ```text
//! galleries/                       # Galleries root
//! ├── config.toml                  # Generator configuration (optional)
//! ├── galleries.json               # Written by the generator
//! ├── summer-weddings_2024/        # Collection, id = directory name
//! │   ├── metadata.json            # Label/caption override (optional)
//! │   ├── cover.jpg                # Cover image (optional)
//! │   ├── img1.jpg
//! │   ├── img2.jpg
//! │   ├── img10.jpg
//! │   └── thumbs/                  # Thumbnail cache, written by the generator
//! │       └── img1.jpg
//! ├── empty-collection/            # No images: skipped
//! └── .drafts/                     # Hidden: ignored
//! ```
//!
//! ## Rules
//!
//! - Every non-hidden immediate subdirectory is a candidate collection.
//!   Files at the root and anything nested deeper are ignored.
//! - Images are files with a recognised extension (case-insensitive):
//!   jpg, jpeg, png, webp, avif, gif. Dot-prefixed image files are kept;
//!   only hidden directories are skipped.
//! - Images are ordered by natural comparison, so `img2` precedes `img10`.
//! - Collections without images are reported as skipped.
//! - The cover is the first image named `cover.(jpg|jpeg|png|webp)`, else
//!   the first image. It stays in the image list.
//! - Entries whose names are not valid UTF-8 are ignored; they cannot be
//!   represented in the JSON manifest.

use crate::naming::{is_cover_name, is_image_name, natural_cmp};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("galleries root not found: {0}")]
    RootNotFound(PathBuf),
    #[error("galleries root is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A collection as found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionListing {
    /// Directory name.
    pub id: String,
    pub dir: PathBuf,
    /// Image file names in natural order. Never empty.
    pub images: Vec<String>,
    /// File name of the cover, one of `images`.
    pub cover: String,
}

/// Why a candidate directory did not become a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoImages,
    Unreadable(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoImages => write!(f, "no images"),
            SkipReason::Unreadable(err) => write!(f, "unreadable: {}", err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCollection {
    pub id: String,
    pub reason: SkipReason,
}

/// Output of [`scan`]. Both lists are in natural order of directory name.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub collections: Vec<CollectionListing>,
    pub skipped: Vec<SkippedCollection>,
}

/// Fail unless `root` exists and is a directory.
pub fn check_root(root: &Path) -> Result<(), ScanError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ScanError::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ScanError::RootNotFound(root.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Scan the galleries root for collections.
pub fn scan(root: &Path) -> Result<ScanResult, ScanError> {
    check_root(root)?;

    let mut result = ScanResult::default();
    for entry in list_dir(root)? {
        if !entry.file_type().is_dir() {
            continue;
        }
        let Some(id) = visible_name(&entry) else {
            continue;
        };
        let id = id.to_string();

        match list_images(entry.path()) {
            Ok(images) => match select_cover(&images) {
                Some(cover) => {
                    let cover = cover.to_string();
                    result.collections.push(CollectionListing {
                        id,
                        dir: entry.path().to_path_buf(),
                        images,
                        cover,
                    });
                }
                None => result.skipped.push(SkippedCollection {
                    id,
                    reason: SkipReason::NoImages,
                }),
            },
            Err(e) => result.skipped.push(SkippedCollection {
                id,
                reason: SkipReason::Unreadable(e.to_string()),
            }),
        }
    }
    Ok(result)
}

/// Image file names directly inside `dir`, in natural order.
pub fn list_images(dir: &Path) -> io::Result<Vec<String>> {
    let mut images = Vec::new();
    for entry in list_dir(dir)? {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str().filter(|n| is_image_name(n)) {
            images.push(name.to_string());
        }
    }
    images.sort_by(|a, b| natural_cmp(a, b));
    Ok(images)
}

/// The cover among `images` (already in natural order).
pub fn select_cover(images: &[String]) -> Option<&str> {
    images
        .iter()
        .find(|name| is_cover_name(name))
        .or_else(|| images.first())
        .map(String::as_str)
}

/// Immediate children of `dir`, naturally ordered, symlinks followed.
///
/// Failing to read `dir` itself is an error; children that cannot be
/// inspected (e.g. dangling symlinks) are left out.
fn list_dir(dir: &Path) -> io::Result<Vec<DirEntry>> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by(|a, b| {
            natural_cmp(
                &a.file_name().to_string_lossy(),
                &b.file_name().to_string_lossy(),
            )
        });

    let mut entries = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => entries.push(entry),
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(_) => {}
        }
    }
    Ok(entries)
}

/// UTF-8 name of a non-hidden directory entry.
fn visible_name(entry: &DirEntry) -> Option<&str> {
    entry.file_name().to_str().filter(|n| !n.starts_with('.'))
}
