//! Thumbnail freshness for incremental runs.
//!
//! Decoding and re-encoding is the expensive part of a run, so a thumbnail
//! is only regenerated when it is missing or its modification time is
//! strictly older than the source image's.
//!
//! # Design
//!
//! The thumbnail file itself is the cache entry: there is no manifest on
//! the side. After a thumbnail is written its access and modification
//! times are copied from the source, so an untouched source compares equal
//! on the next run and the thumbnail is kept.
//!
//! Editing a source bumps its mtime past the thumbnail's and the next run
//! regenerates it. Restoring an *older* version of a source (e.g. from a
//! backup that preserves mtimes) is not detected; delete the thumbnail to
//! force it.
//!
//! If the source's mtime cannot be read but a thumbnail exists, the
//! thumbnail is treated as fresh.
//!
//! When several sources map to the same thumbnail file (`a.jpg` and `a.png`
//! both become `thumbs/a.jpg`), "not older" can't tell whose thumbnail is on
//! disk. Those thumbnails are checked with [`Freshness::Stamped`] instead:
//! only an exact mtime match with the claiming source counts.

use std::fmt;
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::Path;
use std::time::SystemTime;

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Whether `thumb` can be reused for `source`.
pub fn is_fresh(source: &Path, thumb: &Path) -> bool {
    let Some(thumb_mtime) = modified(thumb) else {
        return false;
    };
    match modified(source) {
        Some(source_mtime) => thumb_mtime >= source_mtime,
        None => true,
    }
}

/// Whether `thumb` carries exactly `source`'s modification time, as written
/// by [`copy_timestamps`].
pub fn is_stamped(source: &Path, thumb: &Path) -> bool {
    match (modified(source), modified(thumb)) {
        (Some(source_mtime), Some(thumb_mtime)) => thumb_mtime == source_mtime,
        _ => false,
    }
}

/// The rule an existing thumbnail must pass to be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Not older than the source ([`is_fresh`]).
    #[default]
    NotOlder,
    /// Same modification time as the source ([`is_stamped`]). For thumbnail
    /// files that more than one source maps to.
    Stamped,
}

impl Freshness {
    pub fn holds(self, source: &Path, thumb: &Path) -> bool {
        match self {
            Freshness::NotOlder => is_fresh(source, thumb),
            Freshness::Stamped => is_stamped(source, thumb),
        }
    }
}

/// Copy access and modification times from `source` onto `target`.
pub fn copy_timestamps(source: &Path, target: &Path) -> io::Result<()> {
    let meta = fs::metadata(source)?;
    let times = FileTimes::new()
        .set_accessed(meta.accessed()?)
        .set_modified(meta.modified()?);
    File::options().write(true).open(target)?.set_times(times)
}

/// Thumbnail outcomes across a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Existing thumbnails reused as-is.
    pub fresh: u32,
    /// Thumbnails written this run.
    pub generated: u32,
    /// Images that use the source as their thumbnail (capability off or
    /// format not decodable).
    pub passthrough: u32,
    /// Thumbnail attempts that failed; these also fall back to the source.
    pub failed: u32,
}

impl CacheStats {
    pub fn total(&self) -> u32 {
        self.fresh + self.generated + self.passthrough + self.failed
    }
}

impl fmt::Display for CacheStats {
    /// `"5 fresh, 2 generated (7 total)"`; zero counts other than
    /// `generated` are left out, and the total only appears when more than
    /// one kind is present.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.fresh > 0 {
            parts.push(format!("{} fresh", self.fresh));
        }
        parts.push(format!("{} generated", self.generated));
        if self.passthrough > 0 {
            parts.push(format!("{} without thumbnail", self.passthrough));
        }
        if self.failed > 0 {
            parts.push(format!("{} failed", self.failed));
        }
        if parts.len() > 1 {
            write!(f, "{} ({} total)", parts.join(", "), self.total())
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}
