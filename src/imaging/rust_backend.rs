//! Pure Rust imaging backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, GIF) | `image` crate (pure Rust decoders) |
//! | Orientation | `ImageDecoder::orientation` → `DynamicImage::apply_orientation` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | EXIF metadata | custom `exif_parser` (JPEG, TIFF, PNG, WebP) |
//! | IPTC metadata | custom `iptc_parser` (JPEG APP13 + TIFF IFD) |
//!
//! AVIF sources are listed in galleries but never decoded here: the `image`
//! crate has no pure Rust AVIF decoder, so they keep the source as thumbnail.

use super::backend::{BackendError, ImageMetadata, MetadataReader, Thumbnailer};
use super::calculations::calculate_capped_dimensions;
use super::exif_parser::read_exif;
use super::iptc_parser::read_iptc;
use super::params::ThumbnailParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Extensions whose decoders may be compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("webp", ImageFormat::WebP),
    ("gif", ImageFormat::Gif),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Extensions the thumbnailer can decode.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

fn processing(path: &Path, err: impl std::fmt::Display) -> BackendError {
    BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), err))
}

/// Decode an image and rotate/flip it upright per its embedded orientation.
fn load_oriented(path: &Path) -> Result<DynamicImage, BackendError> {
    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()
        .map_err(|e| processing(path, e))?;
    // A broken orientation tag is not worth failing the thumbnail over
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder).map_err(|e| processing(path, e))?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Sibling path the encoder writes to before the final rename.
fn partial_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}

fn encode_jpeg(img: &DynamicImage, path: &Path, quality: u8) -> Result<(), BackendError> {
    let mut writer = BufWriter::new(File::create(path)?);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    // JPEG has no alpha channel
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))?;
    writer.flush()?;
    Ok(())
}

/// Encode to a `.part` file and rename it over `path`, so a crash never
/// leaves a truncated thumbnail that later looks fresh.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: u8) -> Result<(), BackendError> {
    let partial = partial_path(path);
    let result = encode_jpeg(img, &partial, quality)
        .and_then(|()| fs::rename(&partial, path).map_err(BackendError::Io));
    if result.is_err() {
        fs::remove_file(&partial).ok();
    }
    result
}

impl Thumbnailer for RustBackend {
    fn supports(&self, source: &Path) -> bool {
        source
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(ext))
            })
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let img = load_oriented(&params.source)?;
        let (width, height) =
            calculate_capped_dimensions((img.width(), img.height()), params.max_width);
        let sized = if (width, height) == (img.width(), img.height()) {
            img
        } else {
            img.resize_exact(width, height, FilterType::Lanczos3)
        };
        save_jpeg(&sized, &params.output, params.quality.value())
    }
}

impl MetadataReader for RustBackend {
    fn read_metadata(&self, path: &Path) -> Result<ImageMetadata, BackendError> {
        let data = fs::read(path)?;
        let exif = read_exif(&data);
        let iptc = read_iptc(&data);
        Ok(ImageMetadata {
            description: exif.image_description,
            title: iptc.object_name,
            caption: iptc.caption,
            keywords: iptc.keywords,
            date_time_original: exif.date_time_original,
            create_date: exif.create_date,
            modify_date: exif.modify_date,
        })
    }
}
