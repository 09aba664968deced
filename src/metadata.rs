//! Image and collection metadata resolution.
//!
//! ## Embedded metadata (per image)
//!
//! Read by a [`MetadataReader`](crate::imaging::MetadataReader) into an
//! [`ImageMetadata`], then reduced to the two manifest fields:
//!
//! - **Caption**: the first non-empty of
//!   1. EXIF ImageDescription
//!   2. IPTC Object Name (`2:05`), the "Title" field in Lightroom
//!   3. IPTC Caption-Abstract (`2:120`)
//!   4. IPTC Keywords (`2:25`), joined with `", "`
//!
//!   and the empty string when none is set. Captions are never null.
//!
//! - **Date**: the first *parseable* of EXIF DateTimeOriginal, DateTimeDigitized
//!   and DateTime, formatted `YYYY-MM-DD`. A present but malformed value
//!   (e.g. the `0000:00:00 00:00:00` some cameras write) is skipped in favour
//!   of the next one.
//!
//! ## Collection override (per collection)
//!
//! An optional `metadata.json` in the collection directory. It must be a
//! JSON object. The whole object is carried verbatim into the manifest; only
//! a non-empty string `label` is interpreted here, replacing the label
//! derived from the directory name. Per-image `captions` in the file are
//! passed through for the browser and never replace embedded captions.

use crate::imaging::ImageMetadata;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::io;
use std::path::Path;
use thiserror::Error;

pub const OVERRIDE_FILENAME: &str = "metadata.json";

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("cannot read metadata.json: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON in metadata.json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("metadata.json must contain a JSON object")]
    NotAnObject,
}

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value (trimmed).
///
/// ```text
/// caption: resolve(&[description, title, iptc_caption, keywords])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Caption for an image; empty when nothing usable is embedded.
pub fn caption(meta: &ImageMetadata) -> String {
    let keywords: Vec<&str> = meta
        .keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();
    let keywords = (!keywords.is_empty()).then(|| keywords.join(", "));

    resolve(&[
        meta.description.as_deref(),
        meta.title.as_deref(),
        meta.caption.as_deref(),
        keywords.as_deref(),
    ])
    .unwrap_or_default()
}

/// Capture date of an image as `YYYY-MM-DD`.
pub fn capture_date(meta: &ImageMetadata) -> Option<String> {
    [
        &meta.date_time_original,
        &meta.create_date,
        &meta.modify_date,
    ]
    .into_iter()
    .flatten()
    .find_map(|raw| format_capture_date(raw))
}

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y:%m:%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y:%m:%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y:%m:%d", "%Y-%m-%d"];

/// Parse an EXIF-style date/time and format its date as `YYYY-MM-DD`.
///
/// Accepts the EXIF form `2023:12:25 09:30:00` and its ISO-like variants.
/// Sub-second and timezone suffixes are ignored.
///
/// ```
/// # use gallery_gen::metadata::format_capture_date;
/// assert_eq!(format_capture_date("2023:12:25 09:30:00").as_deref(), Some("2023-12-25"));
/// assert_eq!(format_capture_date("0000:00:00 00:00:00"), None);
/// ```
pub fn format_capture_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    // "YYYY:MM:DD HH:MM:SS" is 19 characters; anything after is fractions or zone
    let head = raw.get(..19).unwrap_or(raw);
    let date_only = raw.get(..10).unwrap_or(raw);

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(head, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(date_only, fmt).ok())
        })
        .map(|date| date.format("%Y-%m-%d").to_string())
}

/// Read a collection's `metadata.json`.
///
/// `Ok(None)` when the file does not exist. Anything else that stops the
/// file from being used (unreadable, not JSON, not an object) is an error.
pub fn read_override(collection_dir: &Path) -> Result<Option<Value>, MetadataError> {
    let path = collection_dir.join(OVERRIDE_FILENAME);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let value: Value = serde_json::from_str(&content)?;
    if !value.is_object() {
        return Err(MetadataError::NotAnObject);
    }
    Ok(Some(value))
}

/// The label set by an override, if it is a non-empty string.
pub fn override_label(value: &Value) -> Option<&str> {
    value
        .get("label")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
