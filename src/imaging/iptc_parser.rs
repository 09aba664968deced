//! Minimal IPTC-IIM parser.
//!
//! Extracts three fields from IPTC Record 2:
//! - ObjectName (2:05): title
//! - Caption-Abstract (2:120): caption
//! - Keywords (2:25): repeatable, collected in order
//!
//! For JPEG: reads APP13 (Photoshop 8BIM resource 0x0404).
//! For TIFF: reads IFD tag 33723 (IPTC-NAA, raw IIM bytes), then tag 34377
//! (Photoshop image resources).
//! Other containers carry no IPTC.

use super::container::{Container, JPEG_APP13, Tiff, jpeg_segments};

/// IPTC metadata extracted from an image file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IptcData {
    pub object_name: Option<String>,
    pub caption: Option<String>,
    pub keywords: Vec<String>,
}

impl IptcData {
    fn is_empty(&self) -> bool {
        self.object_name.is_none() && self.caption.is_none() && self.keywords.is_empty()
    }
}

/// Read IPTC metadata from a whole file's bytes.
/// Returns default (empty) metadata on any parse failure.
pub fn read_iptc(data: &[u8]) -> IptcData {
    match Container::sniff(data) {
        Container::Jpeg => read_iptc_from_jpeg(data),
        Container::Tiff => read_iptc_from_tiff(data),
        _ => IptcData::default(),
    }
}

// ---------------------------------------------------------------------------
// IPTC-IIM record parsing
// ---------------------------------------------------------------------------

const TAG_MARKER: u8 = 0x1C;

/// Parse raw IPTC-IIM bytes into structured metadata.
///
/// IIM dataset layout:
///   Byte 0:    0x1C (tag marker)
///   Byte 1:    Record number (we want 0x02)
///   Byte 2:    Dataset number (0x05=ObjectName, 0x19=Keywords, 0x78=Caption)
///   Bytes 3-4: Data length (big-endian u16). High bit set means the next
///              `len & 0x7FFF` bytes hold the real length.
///   Bytes 5+:  Data (UTF-8/ASCII string)
///
/// Stray bytes between datasets are skipped until the next tag marker.
fn parse_iptc_iim(data: &[u8]) -> IptcData {
    let mut result = IptcData::default();
    let mut pos = 0;

    while pos + 5 <= data.len() {
        if data[pos] != TAG_MARKER {
            pos += 1;
            continue;
        }

        let record = data[pos + 1];
        let dataset = data[pos + 2];
        let raw_len = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as usize;
        pos += 5;

        let length = if raw_len & 0x8000 != 0 {
            let size = raw_len & 0x7FFF;
            let Some(bytes) = data.get(pos..pos + size) else {
                break;
            };
            if size > 8 {
                break;
            }
            pos += size;
            bytes.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize)
        } else {
            raw_len
        };

        let Some(value) = pos.checked_add(length).and_then(|end| data.get(pos..end)) else {
            break;
        };

        // Only Record 2 (Application Record)
        if record == 2 {
            let value = String::from_utf8_lossy(value).trim().to_string();
            if !value.is_empty() {
                match dataset {
                    5 => result.object_name = Some(value),
                    25 => result.keywords.push(value),
                    120 => result.caption = Some(value),
                    _ => {}
                }
            }
        }

        pos += length;
    }

    result
}

// ---------------------------------------------------------------------------
// Photoshop 8BIM resources
// ---------------------------------------------------------------------------

const PHOTOSHOP_HEADER: &[u8] = b"Photoshop 3.0\0";
const BIM_MARKER: &[u8] = b"8BIM";
const IPTC_RESOURCE_ID: u16 = 0x0404;

/// Extract IPTC-IIM bytes from a Photoshop 8BIM resource block.
///
/// Input starts with "Photoshop 3.0\0" (JPEG APP13) or directly with
/// "8BIM" entries (TIFF tag 34377).
fn extract_iptc_from_8bim(segment: &[u8]) -> Option<&[u8]> {
    let data = segment.strip_prefix(PHOTOSHOP_HEADER).unwrap_or(segment);

    let mut pos = 0;
    while pos + 12 <= data.len() {
        // "8BIM" (4) + resource id (2) + pascal name + data length (4) + data
        if &data[pos..pos + 4] != BIM_MARKER {
            pos += 1;
            continue;
        }
        pos += 4;

        let resource_id = u16::from_be_bytes([data[pos], data[pos + 1]]);
        pos += 2;

        // Pascal string: length byte + text, padded to an even total
        let name_len = *data.get(pos)? as usize;
        pos += 1 + name_len + ((1 + name_len) % 2);

        let len_bytes: [u8; 4] = data.get(pos..pos + 4)?.try_into().ok()?;
        let res_len = u32::from_be_bytes(len_bytes) as usize;
        pos += 4;

        let body = data.get(pos..pos.checked_add(res_len)?)?;
        if resource_id == IPTC_RESOURCE_ID {
            return Some(body);
        }

        pos += res_len + (res_len % 2);
    }

    None
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

fn read_iptc_from_jpeg(data: &[u8]) -> IptcData {
    jpeg_segments(data)
        .into_iter()
        .filter(|(marker, _)| *marker == JPEG_APP13)
        .filter_map(|(_, payload)| extract_iptc_from_8bim(payload))
        .map(parse_iptc_iim)
        .find(|iptc| !iptc.is_empty())
        .unwrap_or_default()
}

const TAG_IPTC_NAA: u16 = 33723;
const TAG_PHOTOSHOP: u16 = 34377;

fn read_iptc_from_tiff(data: &[u8]) -> IptcData {
    let Some(tiff) = Tiff::parse(data) else {
        return IptcData::default();
    };

    for ifd in tiff.ifd_chain() {
        for entry in tiff.entries(ifd) {
            let Some(bytes) = tiff.value_bytes(&entry) else {
                continue;
            };
            let result = match entry.tag {
                TAG_IPTC_NAA => parse_iptc_iim(bytes),
                TAG_PHOTOSHOP => extract_iptc_from_8bim(bytes)
                    .map(parse_iptc_iim)
                    .unwrap_or_default(),
                _ => continue,
            };
            if !result.is_empty() {
                return result;
            }
        }
    }

    IptcData::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::container::test_support::*;

    fn dataset(number: u8, value: &[u8]) -> Vec<u8> {
        let mut out = vec![TAG_MARKER, 0x02, number];
        out.extend_from_slice(&(value.len() as u16).to_be_bytes());
        out.extend_from_slice(value);
        out
    }

    fn bim_block(resource_id: u16, body: &[u8]) -> Vec<u8> {
        let mut out = BIM_MARKER.to_vec();
        out.extend_from_slice(&resource_id.to_be_bytes());
        // Empty pascal name, padded to two bytes
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(body);
        if body.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    fn app13(iim: &[u8]) -> Vec<u8> {
        let mut payload = PHOTOSHOP_HEADER.to_vec();
        payload.extend(bim_block(0x03ED, b"resolution"));
        payload.extend(bim_block(IPTC_RESOURCE_ID, iim));
        jpeg_segment(JPEG_APP13, &payload)
    }

    #[test]
    fn parse_empty_returns_default() {
        assert_eq!(parse_iptc_iim(&[]), IptcData::default());
    }

    #[test]
    fn parse_single_object_name() {
        let result = parse_iptc_iim(&dataset(5, b"Hello"));
        assert_eq!(result.object_name, Some("Hello".to_string()));
        assert_eq!(result.caption, None);
        assert!(result.keywords.is_empty());
    }

    #[test]
    fn parse_all_fields_together() {
        let mut data = Vec::new();
        data.extend(dataset(5, b"Title"));
        data.extend(dataset(25, b"art"));
        data.extend(dataset(120, b"A caption"));
        data.extend(dataset(25, b"photo"));

        let result = parse_iptc_iim(&data);
        assert_eq!(result.object_name, Some("Title".to_string()));
        assert_eq!(result.caption, Some("A caption".to_string()));
        assert_eq!(result.keywords, vec!["art", "photo"]);
    }

    #[test]
    fn skips_non_record2() {
        let data = [TAG_MARKER, 0x01, 0x05, 0x00, 0x03, b'f', b'o', b'o'];
        assert_eq!(parse_iptc_iim(&data), IptcData::default());
    }

    #[test]
    fn resyncs_after_stray_bytes() {
        let mut data = vec![0x00, 0x00, 0x42];
        data.extend(dataset(25, b"snow"));
        assert_eq!(parse_iptc_iim(&data).keywords, vec!["snow"]);
    }

    #[test]
    fn extended_length_dataset() {
        let mut data = vec![TAG_MARKER, 0x02, 120, 0x80, 0x02, 0x00, 0x03];
        data.extend_from_slice(b"abc");
        assert_eq!(parse_iptc_iim(&data).caption.as_deref(), Some("abc"));
    }

    #[test]
    fn truncated_dataset_stops_cleanly() {
        let mut data = dataset(5, b"Title");
        data.extend_from_slice(&[TAG_MARKER, 0x02, 120, 0x00, 0x40, b'x']);
        let result = parse_iptc_iim(&data);
        assert_eq!(result.object_name.as_deref(), Some("Title"));
        assert_eq!(result.caption, None);
    }

    #[test]
    fn reads_from_jpeg_app13() {
        let mut iim = dataset(5, b"Pier");
        iim.extend(dataset(120, b"Fog over the pier"));
        let jpeg = bare_jpeg(&[app13(&iim)]);

        let result = read_iptc(&jpeg);
        assert_eq!(result.object_name.as_deref(), Some("Pier"));
        assert_eq!(result.caption.as_deref(), Some("Fog over the pier"));
    }

    #[test]
    fn reads_from_tiff_iptc_naa_tag() {
        let iim = dataset(25, b"white");
        let tiff = build_tiff(vec![undefined(TAG_IPTC_NAA, iim)], vec![]);
        assert_eq!(read_iptc(&tiff).keywords, vec!["white"]);
    }

    #[test]
    fn reads_from_tiff_photoshop_tag() {
        let iim = dataset(5, b"This is the title");
        let resources = bim_block(IPTC_RESOURCE_ID, &iim);
        let tiff = build_tiff(vec![undefined(TAG_PHOTOSHOP, resources)], vec![]);
        assert_eq!(
            read_iptc(&tiff).object_name.as_deref(),
            Some("This is the title")
        );
    }

    #[test]
    fn other_containers_have_no_iptc() {
        assert_eq!(read_iptc(b"\x89PNG\r\n\x1a\n"), IptcData::default());
        assert_eq!(read_iptc(&[]), IptcData::default());
    }

    #[test]
    fn jpeg_without_app13_is_default() {
        let jpeg = bare_jpeg(&[jpeg_segment(0xE0, b"JFIF\0")]);
        assert_eq!(read_iptc(&jpeg), IptcData::default());
    }
}
