//! Byte-level walkers for the file containers that carry embedded metadata.
//!
//! Only enough of each format is understood to locate metadata blocks:
//!
//! - **JPEG**: marker segments up to start-of-scan (APP1 = EXIF, APP13 = IPTC)
//! - **TIFF**: header, IFD entries and value lookup. EXIF blocks are TIFF
//!   structures too, so the same reader serves both.
//! - **PNG**: the `eXIf` chunk
//! - **WebP**: the RIFF `EXIF` chunk
//! - **AVIF/HEIF**: ISOBMFF boxes, down to an item's bytes via `meta`,
//!   `iinf` and `iloc`
//!
//! Every read is bounds-checked and returns `None` on truncated or
//! malformed input; nothing here panics on hostile bytes.

pub const JPEG_APP1: u8 = 0xE1;
pub const JPEG_APP13: u8 = 0xED;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// `ftyp` brands of still-image HEIF files, AVIF included.
const HEIF_BRANDS: [&[u8; 4]; 6] = [b"avif", b"avis", b"heic", b"heix", b"mif1", b"msf1"];

/// Upper bound on IFDs followed in a chain, so cyclic offsets terminate.
const MAX_IFD_CHAIN: usize = 16;

/// File container detected from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Jpeg,
    Tiff,
    Png,
    WebP,
    Heif,
    Unknown,
}

impl Container {
    pub fn sniff(data: &[u8]) -> Self {
        if data.starts_with(&[0xFF, 0xD8]) {
            Container::Jpeg
        } else if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
            Container::Tiff
        } else if data.starts_with(PNG_SIGNATURE) {
            Container::Png
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Container::WebP
        } else if is_heif(data) {
            Container::Heif
        } else {
            Container::Unknown
        }
    }
}

// ---------------------------------------------------------------------------
// JPEG
// ---------------------------------------------------------------------------

/// Header segments of a JPEG file as `(marker, payload)`, in file order.
///
/// Stops at start-of-scan: metadata always precedes the entropy-coded data.
pub fn jpeg_segments(data: &[u8]) -> Vec<(u8, &[u8])> {
    let mut segments = Vec::new();
    if Container::sniff(data) != Container::Jpeg {
        return segments;
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            break;
        }
        let marker = data[pos + 1];
        match marker {
            // Fill byte before a marker
            0xFF => {
                pos += 1;
                continue;
            }
            // SOS / EOI
            0xDA | 0xD9 => break,
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            _ => {}
        }
        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if len < 2 {
            break;
        }
        let end = (pos + 2 + len).min(data.len());
        segments.push((marker, &data[pos + 4..end]));
        pos += 2 + len;
    }
    segments
}

// ---------------------------------------------------------------------------
// TIFF
// ---------------------------------------------------------------------------

/// A TIFF structure (a standalone `.tif` or the body of an EXIF block).
#[derive(Debug, Clone, Copy)]
pub struct Tiff<'a> {
    data: &'a [u8],
    big_endian: bool,
}

/// One 12-byte IFD entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfdEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u32,
    /// Offset of the entry's 4-byte value/offset field.
    value_at: usize,
}

/// Byte size of one value of a TIFF field type.
fn type_size(field_type: u16) -> usize {
    match field_type {
        1 | 2 | 6 | 7 => 1, // BYTE, ASCII, SBYTE, UNDEFINED
        3 | 8 => 2,         // SHORT, SSHORT
        4 | 9 | 11 => 4,    // LONG, SLONG, FLOAT
        5 | 10 | 12 => 8,   // RATIONAL, SRATIONAL, DOUBLE
        _ => 1,
    }
}

impl<'a> Tiff<'a> {
    /// Parse the byte-order mark and magic number (42).
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        let big_endian = match data.get(0..2)? {
            b"MM" => true,
            b"II" => false,
            _ => return None,
        };
        let tiff = Self { data, big_endian };
        (tiff.u16_at(2)? == 42).then_some(tiff)
    }

    pub fn u16_at(&self, offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = self.data.get(offset..offset.checked_add(2)?)?.try_into().ok()?;
        Some(if self.big_endian {
            u16::from_be_bytes(bytes)
        } else {
            u16::from_le_bytes(bytes)
        })
    }

    pub fn u32_at(&self, offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = self.data.get(offset..offset.checked_add(4)?)?.try_into().ok()?;
        Some(if self.big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        })
    }

    /// Offset of IFD0.
    pub fn first_ifd(&self) -> Option<usize> {
        self.u32_at(4).map(|o| o as usize).filter(|&o| o > 0)
    }

    /// Offsets of IFD0 and every IFD linked after it.
    pub fn ifd_chain(&self) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut next = self.first_ifd();
        while let Some(offset) = next {
            if chain.len() >= MAX_IFD_CHAIN || chain.contains(&offset) {
                break;
            }
            chain.push(offset);
            next = self.next_ifd(offset);
        }
        chain
    }

    fn next_ifd(&self, ifd: usize) -> Option<usize> {
        let count = self.u16_at(ifd)? as usize;
        let next = self.u32_at(ifd + 2 + count * 12)? as usize;
        (next != 0).then_some(next)
    }

    /// Entries of the IFD at `ifd`; a truncated table yields the entries
    /// that fit.
    pub fn entries(&self, ifd: usize) -> Vec<IfdEntry> {
        let Some(count) = self.u16_at(ifd) else {
            return Vec::new();
        };
        (0..count as usize)
            .map_while(|i| {
                let at = ifd + 2 + i * 12;
                Some(IfdEntry {
                    tag: self.u16_at(at)?,
                    field_type: self.u16_at(at + 2)?,
                    count: self.u32_at(at + 4)?,
                    value_at: at + 8,
                })
            })
            .collect()
    }

    /// Raw value bytes of an entry. Values of four bytes or less are stored
    /// inline in the entry; larger ones live at the stored offset.
    pub fn value_bytes(&self, entry: &IfdEntry) -> Option<&'a [u8]> {
        let len = (entry.count as usize).checked_mul(type_size(entry.field_type))?;
        let start = if len <= 4 {
            entry.value_at
        } else {
            self.u32_at(entry.value_at)? as usize
        };
        self.data.get(start..start.checked_add(len)?)
    }

    /// An ASCII (or UNDEFINED text) value, NUL-terminated and trimmed.
    /// Empty strings come back as `None`.
    pub fn text(&self, entry: &IfdEntry) -> Option<String> {
        let bytes = self.value_bytes(entry)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let value = String::from_utf8_lossy(&bytes[..end]).trim().to_string();
        (!value.is_empty()).then_some(value)
    }

    /// A single SHORT or LONG value, e.g. a sub-IFD pointer.
    pub fn unsigned(&self, entry: &IfdEntry) -> Option<u32> {
        match entry.field_type {
            3 => self.u16_at(entry.value_at).map(u32::from),
            4 => self.u32_at(entry.value_at),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PNG / WebP
// ---------------------------------------------------------------------------

/// Body of the first PNG chunk of the given type.
pub fn png_chunk<'a>(data: &'a [u8], kind: &[u8; 4]) -> Option<&'a [u8]> {
    if !data.starts_with(PNG_SIGNATURE) {
        return None;
    }
    let mut pos = PNG_SIGNATURE.len();
    while pos + 8 <= data.len() {
        let len = u32::from_be_bytes(data[pos..pos + 4].try_into().ok()?) as usize;
        let chunk_type = &data[pos + 4..pos + 8];
        let body = pos + 8;
        let body_end = body.checked_add(len)?;
        if chunk_type == kind {
            return data.get(body..body_end);
        }
        if chunk_type == b"IEND" {
            break;
        }
        // Skip body and CRC
        pos = body_end.checked_add(4)?;
    }
    None
}

/// Body of the first WebP (RIFF) chunk with the given FourCC.
pub fn riff_chunk<'a>(data: &'a [u8], kind: &[u8; 4]) -> Option<&'a [u8]> {
    if Container::sniff(data) != Container::WebP {
        return None;
    }
    let mut pos = 12;
    while pos + 8 <= data.len() {
        let fourcc = &data[pos..pos + 4];
        let len = u32::from_le_bytes(data[pos + 4..pos + 8].try_into().ok()?) as usize;
        let body = pos + 8;
        let body_end = body.checked_add(len)?;
        if fourcc == kind {
            return data.get(body..body_end);
        }
        // Chunks are padded to an even length
        pos = body_end.checked_add(len % 2)?;
    }
    None
}

// ---------------------------------------------------------------------------
// ISOBMFF (AVIF / HEIF)
// ---------------------------------------------------------------------------

pub fn be_u16(data: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes(data.get(at..at.checked_add(2)?)?.try_into().ok()?))
}

pub fn be_u32(data: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_be_bytes(data.get(at..at.checked_add(4)?)?.try_into().ok()?))
}

fn be_u64(data: &[u8], at: usize) -> Option<u64> {
    Some(u64::from_be_bytes(data.get(at..at.checked_add(8)?)?.try_into().ok()?))
}

/// Big-endian unsigned field of 0, 4 or 8 bytes, as used by `iloc`.
fn be_sized(data: &[u8], at: usize, size: usize) -> Option<u64> {
    match size {
        0 => Some(0),
        4 => be_u32(data, at).map(u64::from),
        8 => be_u64(data, at),
        _ => None,
    }
}

/// The box starting at `pos`: type, body and the offset just past it.
fn next_box(data: &[u8], pos: usize) -> Option<([u8; 4], &[u8], usize)> {
    let size = be_u32(data, pos)?;
    let kind: [u8; 4] = data.get(pos + 4..pos + 8)?.try_into().ok()?;
    let (header, size) = match size {
        0 => (8, (data.len() - pos) as u64),
        1 => (16, be_u64(data, pos + 8)?),
        n => (8, u64::from(n)),
    };
    let end = pos.checked_add(usize::try_from(size).ok()?)?;
    let body = data.get(pos + header..end)?;
    Some((kind, body, end))
}

/// Sibling boxes laid out back to back in `data`. Stops at the first
/// malformed header.
fn bmff_boxes(data: &[u8]) -> Vec<([u8; 4], &[u8])> {
    let mut boxes = Vec::new();
    let mut pos = 0;
    while let Some((kind, body, end)) = next_box(data, pos) {
        boxes.push((kind, body));
        pos = end;
    }
    boxes
}

fn find_box<'a>(boxes: &[([u8; 4], &'a [u8])], kind: &[u8; 4]) -> Option<&'a [u8]> {
    boxes.iter().find(|(k, _)| k == kind).map(|(_, body)| *body)
}

fn is_heif(data: &[u8]) -> bool {
    let Some((kind, body, _)) = next_box(data, 0) else {
        return false;
    };
    if &kind != b"ftyp" {
        return false;
    }
    // Major brand, minor version, then compatible brands
    let major = body.get(0..4);
    let compatible = body.get(8..).unwrap_or_default().chunks_exact(4);
    major
        .into_iter()
        .chain(compatible)
        .any(|brand| HEIF_BRANDS.iter().any(|b| &b[..] == brand))
}

/// Bytes of the first item of type `item_type` (e.g. `Exif`) in a HEIF file.
///
/// Items stored in the file (`iloc` construction method 0) and in the `idat`
/// box (method 1) are supported, as long as they occupy a single extent.
pub fn heif_item<'a>(data: &'a [u8], item_type: &[u8; 4]) -> Option<&'a [u8]> {
    if Container::sniff(data) != Container::Heif {
        return None;
    }
    let top = bmff_boxes(data);
    // meta is a full box: version and flags precede the children
    let meta = bmff_boxes(find_box(&top, b"meta")?.get(4..)?);
    let item_id = find_item_id(find_box(&meta, b"iinf")?, item_type)?;
    let extent = locate_item(find_box(&meta, b"iloc")?, item_id)?;

    let source = match extent.construction_method {
        0 => data,
        1 => find_box(&meta, b"idat")?,
        _ => return None,
    };
    let start = usize::try_from(extent.offset).ok()?;
    let end = match extent.length {
        0 => source.len(),
        n => start.checked_add(usize::try_from(n).ok()?)?,
    };
    source.get(start..end)
}

fn find_item_id(iinf: &[u8], item_type: &[u8; 4]) -> Option<u32> {
    let entries_at = if *iinf.first()? == 0 { 6 } else { 8 };
    bmff_boxes(iinf.get(entries_at..)?)
        .into_iter()
        .filter(|(kind, _)| kind == b"infe")
        .find_map(|(_, infe)| {
            // Item types exist from infe version 2 on
            let (id, type_at) = match *infe.first()? {
                2 => (u32::from(be_u16(infe, 4)?), 8),
                3 => (be_u32(infe, 4)?, 10),
                _ => return None,
            };
            (infe.get(type_at..type_at + 4)? == item_type).then_some(id)
        })
}

struct ItemExtent {
    construction_method: u16,
    offset: u64,
    length: u64,
}

fn locate_item(iloc: &[u8], wanted: u32) -> Option<ItemExtent> {
    let version = *iloc.first()?;
    let sizes = *iloc.get(4)?;
    let (offset_size, length_size) = ((sizes >> 4) as usize, (sizes & 0x0F) as usize);
    let sizes = *iloc.get(5)?;
    let base_offset_size = (sizes >> 4) as usize;
    let index_size = if version == 0 { 0 } else { (sizes & 0x0F) as usize };

    let mut pos = 6;
    let item_count = if version < 2 {
        pos += 2;
        u32::from(be_u16(iloc, 4 + 2)?)
    } else {
        pos += 4;
        be_u32(iloc, 4 + 2)?
    };

    for _ in 0..item_count {
        let id = if version < 2 {
            pos += 2;
            u32::from(be_u16(iloc, pos - 2)?)
        } else {
            pos += 4;
            be_u32(iloc, pos - 4)?
        };
        let construction_method = if version == 0 {
            0
        } else {
            pos += 2;
            be_u16(iloc, pos - 2)? & 0x0F
        };
        // data_reference_index
        pos += 2;
        let base_offset = be_sized(iloc, pos, base_offset_size)?;
        pos += base_offset_size;
        let extent_count = be_u16(iloc, pos)?;
        pos += 2;

        let mut first = None;
        for _ in 0..extent_count {
            pos += index_size;
            let offset = be_sized(iloc, pos, offset_size)?;
            pos += offset_size;
            let length = be_sized(iloc, pos, length_size)?;
            pos += length_size;
            if first.is_none() {
                first = Some((offset, length));
            }
        }

        if id == wanted {
            let (offset, length) = first.filter(|_| extent_count == 1)?;
            return Some(ItemExtent {
                construction_method,
                offset: base_offset.checked_add(offset)?,
                length,
            });
        }
    }
    None
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn sniff_detects_containers() {
        assert_eq!(Container::sniff(&[0xFF, 0xD8, 0xFF]), Container::Jpeg);
        assert_eq!(Container::sniff(b"II*\0rest"), Container::Tiff);
        assert_eq!(Container::sniff(b"MM\0*rest"), Container::Tiff);
        assert_eq!(Container::sniff(b"\x89PNG\r\n\x1a\n...."), Container::Png);
        assert_eq!(Container::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Container::WebP);
        assert_eq!(
            Container::sniff(b"\0\0\0\x14ftypavif\0\0\0\0mif1"),
            Container::Heif
        );
        assert_eq!(
            Container::sniff(b"\0\0\0\x10ftypisom\0\0\0\0"),
            Container::Unknown
        );
        assert_eq!(Container::sniff(b"GIF89a"), Container::Unknown);
        assert_eq!(Container::sniff(&[]), Container::Unknown);
    }

    #[test]
    fn jpeg_segments_in_order() {
        let jpeg = bare_jpeg(&[jpeg_segment(0xE0, b"JFIF\0"), jpeg_segment(0xED, b"abc")]);
        let segments = jpeg_segments(&jpeg);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], (0xE0, &b"JFIF\0"[..]));
        assert_eq!(segments[1], (0xED, &b"abc"[..]));
    }

    #[test]
    fn jpeg_segments_stop_at_scan() {
        let mut jpeg = vec![0xFF, 0xD8];
        jpeg.extend(jpeg_segment(0xE1, b"one"));
        jpeg.extend([0xFF, 0xDA, 0x00, 0x02]);
        jpeg.extend(jpeg_segment(0xED, b"after scan"));
        let segments = jpeg_segments(&jpeg);
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn jpeg_segments_truncated_is_safe() {
        let mut jpeg = vec![0xFF, 0xD8];
        jpeg.extend([0xFF, 0xE1, 0x40, 0x00, b'x']);
        let segments = jpeg_segments(&jpeg);
        assert_eq!(segments, vec![(0xE1, &b"x"[..])]);
        assert!(jpeg_segments(&[0xFF, 0xD8, 0xFF]).is_empty());
        assert!(jpeg_segments(b"not a jpeg").is_empty());
    }

    #[test]
    fn tiff_inline_and_offset_values() {
        let tiff = build_tiff(vec![ascii(0x010E, "Hi"), ascii(0x0132, "2024:01:02 03:04:05")], vec![]);
        let reader = Tiff::parse(&tiff).unwrap();
        let ifd0 = reader.first_ifd().unwrap();
        let entries = reader.entries(ifd0);
        assert_eq!(entries.len(), 2);
        assert_eq!(reader.text(&entries[0]).as_deref(), Some("Hi"));
        assert_eq!(
            reader.text(&entries[1]).as_deref(),
            Some("2024:01:02 03:04:05")
        );
    }

    #[test]
    fn tiff_sub_ifd_pointer() {
        let tiff = build_tiff(vec![], vec![ascii(0x9003, "2020:05:06 07:08:09")]);
        let reader = Tiff::parse(&tiff).unwrap();
        let pointer = reader
            .entries(reader.first_ifd().unwrap())
            .into_iter()
            .find(|e| e.tag == 0x8769)
            .unwrap();
        let sub = reader.unsigned(&pointer).unwrap() as usize;
        let entries = reader.entries(sub);
        assert_eq!(entries[0].tag, 0x9003);
    }

    #[test]
    fn tiff_short_value() {
        let tiff = build_tiff(vec![short(0x0112, 6)], vec![]);
        let reader = Tiff::parse(&tiff).unwrap();
        let entry = reader.entries(reader.first_ifd().unwrap())[0];
        assert_eq!(reader.unsigned(&entry), Some(6));
    }

    #[test]
    fn tiff_rejects_bad_magic() {
        assert!(Tiff::parse(b"II\x2b\0\x08\0\0\0").is_none());
        assert!(Tiff::parse(b"XX*\0").is_none());
        assert!(Tiff::parse(b"I").is_none());
    }

    #[test]
    fn tiff_value_out_of_bounds_is_none() {
        let mut tiff = build_tiff(vec![ascii(0x010E, "A long description")], vec![]);
        tiff.truncate(tiff.len() - 5);
        let reader = Tiff::parse(&tiff).unwrap();
        let entry = reader.entries(reader.first_ifd().unwrap())[0];
        assert_eq!(reader.text(&entry), None);
    }

    #[test]
    fn tiff_cyclic_chain_terminates() {
        // IFD0 at 8 with zero entries whose next pointer is itself
        let mut tiff = b"II".to_vec();
        tiff.extend_from_slice(&42u16.to_le_bytes());
        tiff.extend_from_slice(&8u32.to_le_bytes());
        tiff.extend_from_slice(&0u16.to_le_bytes());
        tiff.extend_from_slice(&8u32.to_le_bytes());
        let reader = Tiff::parse(&tiff).unwrap();
        assert_eq!(reader.ifd_chain(), vec![8]);
    }

    #[test]
    fn png_chunk_found() {
        let mut png = PNG_SIGNATURE.to_vec();
        for (kind, body) in [(b"IHDR", &b"0123456789abc"[..]), (b"eXIf", &b"tiff"[..])] {
            png.extend_from_slice(&(body.len() as u32).to_be_bytes());
            png.extend_from_slice(kind);
            png.extend_from_slice(body);
            png.extend_from_slice(&[0, 0, 0, 0]);
        }
        assert_eq!(png_chunk(&png, b"eXIf"), Some(&b"tiff"[..]));
        assert_eq!(png_chunk(&png, b"tEXt"), None);
    }

    #[test]
    fn riff_chunk_found_after_odd_chunk() {
        let mut webp = b"RIFF\0\0\0\0WEBP".to_vec();
        webp.extend_from_slice(b"VP8X");
        webp.extend_from_slice(&3u32.to_le_bytes());
        webp.extend_from_slice(b"abc\0");
        webp.extend_from_slice(b"EXIF");
        webp.extend_from_slice(&4u32.to_le_bytes());
        webp.extend_from_slice(b"data");
        assert_eq!(riff_chunk(&webp, b"EXIF"), Some(&b"data"[..]));
        assert_eq!(riff_chunk(&webp, b"XMP "), None);
    }

    #[test]
    fn heif_item_from_mdat() {
        let avif = build_avif(b"exif bytes", false);
        assert_eq!(Container::sniff(&avif), Container::Heif);
        assert_eq!(heif_item(&avif, b"Exif"), Some(&b"exif bytes"[..]));
        assert_eq!(heif_item(&avif, b"av01"), Some(&b"av01 payload"[..]));
        assert_eq!(heif_item(&avif, b"mime"), None);
    }

    #[test]
    fn heif_item_from_idat() {
        let avif = build_avif(b"inline exif", true);
        assert_eq!(heif_item(&avif, b"Exif"), Some(&b"inline exif"[..]));
    }

    #[test]
    fn heif_truncated_is_none() {
        let avif = build_avif(b"exif bytes", false);
        for len in [0, 10, 30, 60, avif.len() - 4] {
            assert_eq!(heif_item(&avif[..len], b"Exif"), None, "len {}", len);
        }
    }
}
