//! Manifest generation.
//!
//! Stage 2 of the generator. Takes the scan result, brings every collection's
//! thumbnail cache up to date, extracts captions and dates, and writes the
//! ordered manifest the browser-side gallery loads.
//!
//! ## Per image
//!
//! ```text
//! src     = <prefix>/<collection>/<name>
//! thumb   = <prefix>/<collection>/thumbs/<stem>.jpg   if a thumbnail exists
//!         = src                                        otherwise
//! caption = EXIF description → IPTC title → IPTC caption → keywords → ""
//! date    = first parseable EXIF date as YYYY-MM-DD   or null
//! ```
//!
//! ## Failure tiers
//!
//! Only a missing or non-directory root and a failed manifest write abort
//! the run. Everything per-image or per-collection degrades instead and is
//! reported as a [`GenerateEvent::Warning`]:
//!
//! | Failure | Fallback |
//! |---|---|
//! | thumbnail render fails | `thumb = src` |
//! | two sources share a thumbnail name | later one gets `thumb = src` |
//! | metadata read fails | empty caption, null date |
//! | `metadata.json` unreadable/invalid | derived label, null `metadata` |
//!
//! ## Capabilities
//!
//! Thumbnailing and metadata extraction are reached only through
//! [`Capabilities`]. Passing [`NullBackend`] for either one switches it off;
//! the manifest is still complete, with `thumb == src` and empty
//! captions/dates respectively.
//!
//! ## Writing
//!
//! The manifest is serialized as pretty JSON into `<manifest>.tmp` next to the
//! final file and renamed over it, so readers never see a partial manifest.

use crate::cache::{CacheStats, Freshness};
use crate::config::GeneratorConfig;
use crate::imaging::{
    MetadataReader, NullBackend, ThumbnailOutcome, Thumbnailer, ensure_thumbnail,
};
use crate::metadata::{self, MetadataError};
use crate::naming::{derive_label, natural_cmp, thumbnail_name};
use crate::scan::{self, CollectionListing, ScanError, SkipReason};
use crate::types::{Collection, Image};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The optional capabilities a run may use.
#[derive(Clone, Copy)]
pub struct Capabilities<'a> {
    pub thumbnailer: &'a dyn Thumbnailer,
    pub metadata: &'a dyn MetadataReader,
}

impl<'a> Capabilities<'a> {
    pub fn new(thumbnailer: &'a dyn Thumbnailer, metadata: &'a dyn MetadataReader) -> Self {
        Self {
            thumbnailer,
            metadata,
        }
    }
}

impl Capabilities<'static> {
    /// Neither thumbnails nor metadata.
    pub fn disabled() -> Self {
        Self::new(&NullBackend, &NullBackend)
    }
}

/// How an image's `thumb` was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbStatus {
    /// Existing thumbnail reused.
    Fresh,
    /// Thumbnail written this run.
    Generated,
    /// No thumbnail attempted; `thumb == src`.
    Source,
    /// Thumbnail attempted and failed; `thumb == src`.
    Failed,
}

/// Progress events, sent in processing order.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateEvent {
    CollectionStarted {
        id: String,
        label: String,
        image_count: usize,
    },
    CollectionSkipped {
        id: String,
        reason: SkipReason,
    },
    ImageProcessed {
        /// 1-based position within the collection.
        index: usize,
        name: String,
        thumb: ThumbStatus,
    },
    Warning {
        collection: String,
        /// Image filename, when the problem is about a single image.
        image: Option<String>,
        message: String,
    },
}

#[derive(Debug)]
pub struct GenerateResult {
    /// Collections as written, in manifest order.
    pub collections: Vec<Collection>,
    pub manifest_path: PathBuf,
    pub cache_stats: CacheStats,
}

struct Progress {
    events: Option<Sender<GenerateEvent>>,
}

impl Progress {
    fn emit(&self, event: GenerateEvent) {
        if let Some(tx) = &self.events {
            // A closed receiver only means nobody is listening
            tx.send(event).ok();
        }
    }

    fn warn(&self, collection: &str, image: Option<&str>, message: String) {
        self.emit(GenerateEvent::Warning {
            collection: collection.to_string(),
            image: image.map(String::from),
            message,
        });
    }
}

/// Scan `root`, build every collection and write the manifest.
pub fn generate(
    root: &Path,
    config: &GeneratorConfig,
    caps: Capabilities<'_>,
    events: Option<Sender<GenerateEvent>>,
) -> Result<GenerateResult, GenerateError> {
    let progress = Progress { events };
    let listing = scan::scan(root)?;

    for skipped in listing.skipped {
        progress.emit(GenerateEvent::CollectionSkipped {
            id: skipped.id,
            reason: skipped.reason,
        });
    }

    let mut stats = CacheStats::default();
    let mut collections: Vec<Collection> = listing
        .collections
        .iter()
        .map(|col| build_collection(col, config, caps, &mut stats, &progress))
        .collect();
    sort_collections(&mut collections);

    let manifest_path = root.join(&config.manifest.filename);
    write_manifest(&manifest_path, &collections)?;

    Ok(GenerateResult {
        collections,
        manifest_path,
        cache_stats: stats,
    })
}

/// Build one collection's manifest entry. Never fails: problems become
/// warnings and fallbacks.
fn build_collection(
    listing: &CollectionListing,
    config: &GeneratorConfig,
    caps: Capabilities<'_>,
    stats: &mut CacheStats,
    progress: &Progress,
) -> Collection {
    let id = listing.id.as_str();
    let metadata = match metadata::read_override(&listing.dir) {
        Ok(value) => value,
        Err(err) => {
            progress.warn(id, None, override_warning(&err));
            None
        }
    };
    let label = metadata
        .as_ref()
        .and_then(metadata::override_label)
        .map(String::from)
        .unwrap_or_else(|| derive_label(id));

    progress.emit(GenerateEvent::CollectionStarted {
        id: id.to_string(),
        label: label.clone(),
        image_count: listing.images.len(),
    });

    let base = format!("{}/{}", config.public_prefix(), id);
    // Thumbnail file name -> number of thumbnailable sources mapping to it
    let mut contenders: HashMap<String, usize> = HashMap::new();
    for name in &listing.images {
        if caps.thumbnailer.supports(&listing.dir.join(name)) {
            *contenders.entry(thumbnail_name(name)).or_default() += 1;
        }
    }
    // Thumbnail file name -> the source that claimed it first
    let mut claimed: HashMap<String, &str> = HashMap::new();
    let mut images = Vec::with_capacity(listing.images.len());

    for (i, name) in listing.images.iter().enumerate() {
        let name = name.as_str();
        let source = listing.dir.join(name);
        let src = format!("{}/{}", base, name);

        let (status, thumb) = if !caps.thumbnailer.supports(&source) {
            (ThumbStatus::Source, src.clone())
        } else {
            let thumb_name = thumbnail_name(name);
            if let Some(owner) = claimed.get(&thumb_name) {
                progress.warn(
                    id,
                    Some(name),
                    format!("thumbnail {} already belongs to {}; using source", thumb_name, owner),
                );
                (ThumbStatus::Source, src.clone())
            } else {
                claimed.insert(thumb_name.clone(), name);
                let output = listing.dir.join(&config.thumbnails.dir).join(&thumb_name);
                let freshness = if contenders.get(&thumb_name).copied().unwrap_or(0) > 1 {
                    Freshness::Stamped
                } else {
                    Freshness::NotOlder
                };
                match ensure_thumbnail(
                    caps.thumbnailer,
                    &source,
                    &output,
                    &config.thumbnails,
                    freshness,
                ) {
                    Ok(outcome) => {
                        let status = match outcome {
                            ThumbnailOutcome::Fresh => ThumbStatus::Fresh,
                            ThumbnailOutcome::Generated => ThumbStatus::Generated,
                        };
                        (
                            status,
                            format!("{}/{}/{}", base, config.thumbnails.dir, thumb_name),
                        )
                    }
                    Err(err) => {
                        progress.warn(id, Some(name), format!("thumbnail failed: {}", err));
                        (ThumbStatus::Failed, src.clone())
                    }
                }
            }
        };

        match status {
            ThumbStatus::Fresh => stats.fresh += 1,
            ThumbStatus::Generated => stats.generated += 1,
            ThumbStatus::Source => stats.passthrough += 1,
            ThumbStatus::Failed => stats.failed += 1,
        }

        let (caption, date) = match caps.metadata.read_metadata(&source) {
            Ok(meta) => (metadata::caption(&meta), metadata::capture_date(&meta)),
            Err(err) => {
                progress.warn(id, Some(name), format!("metadata unreadable: {}", err));
                (String::new(), None)
            }
        };

        progress.emit(GenerateEvent::ImageProcessed {
            index: i + 1,
            name: name.to_string(),
            thumb: status,
        });

        images.push(Image {
            name: name.to_string(),
            src,
            thumb,
            caption,
            date,
        });
    }

    let cover = images
        .iter()
        .find(|img| img.name == listing.cover)
        .or_else(|| images.first());
    let (cover, cover_thumb) = cover
        .map(|img| (img.src.clone(), img.thumb.clone()))
        .unwrap_or_default();

    Collection {
        id: id.to_string(),
        label,
        cover,
        cover_thumb,
        images,
        metadata,
    }
}

fn override_warning(err: &MetadataError) -> String {
    format!("ignoring override: {}", err)
}

/// Order collections by label, naturally. The sort is stable, so equal
/// labels keep the directory order they arrive in.
pub fn sort_collections(collections: &mut [Collection]) {
    collections.sort_by(|a, b| natural_cmp(&a.label, &b.label));
}

/// Write `collections` as pretty JSON to `path`, atomically.
pub fn write_manifest(path: &Path, collections: &[Collection]) -> Result<(), GenerateError> {
    let json = serde_json::to_string_pretty(collections)?;

    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let result = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, path));
    if result.is_err() {
        fs::remove_file(&tmp).ok();
    }
    Ok(result?)
}
