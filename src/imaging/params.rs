//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! [`operations`](super::operations), which decides whether a thumbnail is
//! needed, and the [`backend`](super::backend), which does the pixel work.
//! A mock backend can then stand in for tests without touching the operation
//! logic.

use std::path::PathBuf;

/// JPEG encoding quality (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(82)
    }
}

/// Parameters for a thumbnail: decode, orient, cap the width, encode JPEG.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Maximum output width. Narrower sources are not enlarged.
    pub max_width: u32,
    pub quality: Quality,
}
