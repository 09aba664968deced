//! EXIF field extraction.
//!
//! Reads four text fields from the TIFF structure inside an EXIF block:
//! - ImageDescription (`0x010E`) and DateTime (`0x0132`) from IFD0
//! - DateTimeOriginal (`0x9003`) and DateTimeDigitized (`0x9004`) from the
//!   EXIF sub-IFD, reached through pointer tag `0x8769`
//!
//! The block is located per container: JPEG APP1, PNG `eXIf`, WebP `EXIF`,
//! the `Exif` item of an AVIF/HEIF file, or the file itself for TIFF.
//! Unknown containers have no EXIF.

use super::container::{
    Container, JPEG_APP1, Tiff, be_u32, heif_item, jpeg_segments, png_chunk, riff_chunk,
};

const TAG_IMAGE_DESCRIPTION: u16 = 0x010E;
const TAG_DATE_TIME: u16 = 0x0132;
const TAG_EXIF_IFD: u16 = 0x8769;
const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
const TAG_DATE_TIME_DIGITIZED: u16 = 0x9004;

const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// EXIF text fields, trimmed. Empty values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifData {
    pub image_description: Option<String>,
    pub date_time_original: Option<String>,
    pub create_date: Option<String>,
    pub modify_date: Option<String>,
}

/// Extract EXIF fields from a whole file's bytes.
pub fn read_exif(data: &[u8]) -> ExifData {
    locate_tiff(data)
        .and_then(Tiff::parse)
        .map(|tiff| parse_tiff(&tiff))
        .unwrap_or_default()
}

fn strip_header(block: &[u8]) -> &[u8] {
    block.strip_prefix(EXIF_HEADER).unwrap_or(block)
}

fn locate_tiff(data: &[u8]) -> Option<&[u8]> {
    match Container::sniff(data) {
        Container::Jpeg => jpeg_segments(data)
            .into_iter()
            .find(|(marker, payload)| *marker == JPEG_APP1 && payload.starts_with(EXIF_HEADER))
            .map(|(_, payload)| strip_header(payload)),
        Container::Tiff => Some(data),
        Container::Png => png_chunk(data, b"eXIf").map(strip_header),
        Container::WebP => riff_chunk(data, b"EXIF").map(strip_header),
        Container::Heif => heif_item(data, b"Exif").and_then(heif_tiff),
        Container::Unknown => None,
    }
}

/// A HEIF `Exif` item starts with the offset of the TIFF header within the
/// rest of the item (usually skipping `Exif\0\0`).
fn heif_tiff(item: &[u8]) -> Option<&[u8]> {
    let skip = be_u32(item, 0)? as usize;
    item.get(4usize.checked_add(skip)?..).map(strip_header)
}

fn parse_tiff(tiff: &Tiff<'_>) -> ExifData {
    let mut exif = ExifData::default();
    let Some(ifd0) = tiff.first_ifd() else {
        return exif;
    };

    let mut sub_ifd = None;
    for entry in tiff.entries(ifd0) {
        match entry.tag {
            TAG_IMAGE_DESCRIPTION => exif.image_description = tiff.text(&entry),
            TAG_DATE_TIME => exif.modify_date = tiff.text(&entry),
            TAG_EXIF_IFD => sub_ifd = tiff.unsigned(&entry).map(|o| o as usize),
            _ => {}
        }
    }

    // A sub-IFD pointing back at IFD0 would only re-read the same entries
    if let Some(offset) = sub_ifd.filter(|&o| o != ifd0) {
        for entry in tiff.entries(offset) {
            match entry.tag {
                TAG_DATE_TIME_ORIGINAL => exif.date_time_original = tiff.text(&entry),
                TAG_DATE_TIME_DIGITIZED => exif.create_date = tiff.text(&entry),
                _ => {}
            }
        }
    }

    exif
}
