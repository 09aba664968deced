//! Shared test utilities for the gallery-gen test suite.
//!
//! Provides fixture builders for galleries roots, synthetic images, mtime
//! control, and lookup helpers over generated [`Collection`]s.
//!
//! # Usage
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! add_image(tmp.path(), "trip", "2.jpg");
//! add_image(tmp.path(), "trip", "10.jpg");
//!
//! let collections = generate(tmp.path(), &config, caps, None)?.collections;
//! let trip = find_collection(&collections, "trip");
//! assert_eq!(image_names(trip), vec!["2.jpg", "10.jpg"]);
//! ```

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use image::{ImageEncoder, RgbImage};

use crate::types::Collection;

// =========================================================================
// Synthetic images
// =========================================================================

/// Encode a small gradient JPEG in memory.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, jpeg_bytes(width, height)).unwrap();
}

// =========================================================================
// Galleries layout
// =========================================================================

/// Create `<root>/<collection>/<name>` as a 64x48 JPEG and return its path.
///
/// The bytes are always JPEG regardless of the extension; only the real
/// backend cares, and tests using it pick `.jpg` names.
pub fn add_image(root: &Path, collection: &str, name: &str) -> PathBuf {
    let path = root.join(collection).join(name);
    create_test_jpeg(&path, 64, 48);
    path
}

/// Create `<root>/<collection>/<name>` with arbitrary contents.
pub fn add_file(root: &Path, collection: &str, name: &str, contents: &str) -> PathBuf {
    let dir = root.join(collection);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

// =========================================================================
// Modification times
// =========================================================================

pub fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

pub fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

// =========================================================================
// Collection lookups: panic with a clear message on miss
// =========================================================================

/// Find a collection by id. Panics if not found.
pub fn find_collection<'a>(collections: &'a [Collection], id: &str) -> &'a Collection {
    collections.iter().find(|c| c.id == id).unwrap_or_else(|| {
        let ids: Vec<&str> = collections.iter().map(|c| c.id.as_str()).collect();
        panic!("collection '{id}' not found. Available: {ids:?}")
    })
}

/// Collection ids in manifest order.
pub fn ids(collections: &[Collection]) -> Vec<&str> {
    collections.iter().map(|c| c.id.as_str()).collect()
}

/// Collection labels in manifest order.
pub fn labels(collections: &[Collection]) -> Vec<&str> {
    collections.iter().map(|c| c.label.as_str()).collect()
}

/// Image file names of a collection, in order.
pub fn image_names(collection: &Collection) -> Vec<&str> {
    collection.images.iter().map(|i| i.name.as_str()).collect()
}
