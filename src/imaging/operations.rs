//! High-level image operations.
//!
//! These functions combine the cache check with backend execution.
//! They take configuration, compute parameters, and call the thumbnailer.

use super::backend::{BackendError, Thumbnailer};
use super::params::{Quality, ThumbnailParams};
use crate::cache::{self, Freshness};
use crate::config::ThumbnailsConfig;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// What [`ensure_thumbnail`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailOutcome {
    /// The existing thumbnail was at least as new as the source.
    Fresh,
    /// A new thumbnail was written.
    Generated,
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(source: &Path, output: &Path, config: &ThumbnailsConfig) -> ThumbnailParams {
    ThumbnailParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        max_width: config.max_width,
        quality: Quality::new(config.quality),
    }
}

/// Make sure `output` holds an up-to-date thumbnail of `source`.
///
/// Reuses the existing file when it passes `freshness`; otherwise creates the
/// parent directory, renders the thumbnail and copies the source's
/// timestamps onto it. Callers check [`Thumbnailer::supports`] first.
pub fn ensure_thumbnail(
    thumbnailer: &dyn Thumbnailer,
    source: &Path,
    output: &Path,
    config: &ThumbnailsConfig,
    freshness: Freshness,
) -> Result<ThumbnailOutcome> {
    if freshness.holds(source, output) {
        return Ok(ThumbnailOutcome::Fresh);
    }

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    thumbnailer.thumbnail(&plan_thumbnail(source, output, config))?;

    // Best effort: a thumbnail without copied times is still valid, it is
    // just newer than the source.
    cache::copy_timestamps(source, output).ok();

    Ok(ThumbnailOutcome::Generated)
}
