//! Image capabilities: thumbnails and embedded metadata, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** (JPEG, PNG, WebP, GIF) | `image` crate decoders |
//! | **Orientation** | `ImageDecoder::orientation` + `DynamicImage::apply_orientation` |
//! | **Thumbnail** | width-capped Lanczos3 resize → `JpegEncoder` |
//! | **EXIF** | custom parser (JPEG APP1, TIFF, PNG `eXIf`, WebP `EXIF`) |
//! | **IPTC** | custom parser (JPEG APP13 + TIFF IFD) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing a thumbnail operation
//! - **Backend**: [`Thumbnailer`] / [`MetadataReader`] traits, [`RustBackend`]
//!   and the no-op [`NullBackend`]
//! - **Operations**: Cache-aware thumbnail creation on top of a backend
//! - **Parsers**: container walkers plus EXIF and IPTC field extraction

pub mod backend;
mod calculations;
pub(crate) mod container;
pub(crate) mod exif_parser;
pub(crate) mod iptc_parser;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageMetadata, MetadataReader, NullBackend, Thumbnailer};
pub use calculations::calculate_capped_dimensions;
pub use operations::{ThumbnailOutcome, ensure_thumbnail, plan_thumbnail};
pub use params::{Quality, ThumbnailParams};
pub use rust_backend::RustBackend;
