//! Manifest types written to `galleries.json`.
//!
//! The browser-side gallery reads this JSON directly, so field names follow
//! its camelCase convention (`coverThumb`) and `date`/`metadata` are always
//! present, as `null` when unknown.

use serde::{Deserialize, Serialize};

/// One collection of images, backed by one subdirectory of the galleries root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Directory name.
    pub id: String,
    /// Display label: metadata override, or the id with separators as spaces.
    pub label: String,
    /// Public path of the cover image.
    pub cover: String,
    /// Public path of the cover's thumbnail (equals `cover` without one).
    pub cover_thumb: String,
    /// Images in natural filename order.
    pub images: Vec<Image>,
    /// The collection's `metadata.json`, verbatim.
    pub metadata: Option<serde_json::Value>,
}

/// A single image entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Original filename.
    pub name: String,
    /// Public path of the untouched source file.
    pub src: String,
    /// Public path of the thumbnail, or `src` when there is none.
    pub thumb: String,
    /// Embedded caption, empty when none was found.
    pub caption: String,
    /// Capture date as `YYYY-MM-DD`.
    pub date: Option<String>,
}
