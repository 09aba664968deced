//! Capability traits and shared types.
//!
//! Thumbnailing and metadata extraction are optional capabilities. The
//! generator only ever talks to the two traits below; whether a capability is
//! available is decided once, by choosing which implementation to pass in:
//!
//! - [`RustBackend`](super::rust_backend::RustBackend): decodes and reads real files
//! - [`NullBackend`]: the capability is switched off. Thumbnails fall back to
//!   the source image and metadata comes back empty.

use super::params::ThumbnailParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Embedded metadata fields, raw as found in the file.
///
/// Field mapping:
/// - `description`: EXIF ImageDescription (`0x010E`)
/// - `title`: IPTC Object Name (`2:05`)
/// - `caption`: IPTC Caption-Abstract (`2:120`)
/// - `keywords`: IPTC Keywords (`2:25`), one entry per keyword
/// - `date_time_original`: EXIF DateTimeOriginal (`0x9003`)
/// - `create_date`: EXIF DateTimeDigitized (`0x9004`)
/// - `modify_date`: EXIF DateTime (`0x0132`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    pub description: Option<String>,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub keywords: Vec<String>,
    pub date_time_original: Option<String>,
    pub create_date: Option<String>,
    pub modify_date: Option<String>,
}

/// Writes thumbnails.
pub trait Thumbnailer {
    /// Whether this thumbnailer can decode `source` at all. Sources it can't
    /// handle keep `thumb == src` without an attempt.
    fn supports(&self, source: &Path) -> bool;

    /// Decode, orient, resize and encode `params.source` into `params.output`.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;
}

/// Reads embedded EXIF/IPTC metadata.
pub trait MetadataReader {
    fn read_metadata(&self, path: &Path) -> Result<ImageMetadata, BackendError>;
}

/// The disabled capability: supports nothing, finds no metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl Thumbnailer for NullBackend {
    fn supports(&self, _source: &Path) -> bool {
        false
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        Err(BackendError::ProcessingFailed(format!(
            "thumbnails are disabled ({})",
            params.source.display()
        )))
    }
}

impl MetadataReader for NullBackend {
    fn read_metadata(&self, _path: &Path) -> Result<ImageMetadata, BackendError> {
        Ok(ImageMetadata::default())
    }
}
