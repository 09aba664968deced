//! Filename conventions shared by the scanner and the manifest builder.
//!
//! ## Natural ordering
//!
//! Photographers number their exports without zero padding (`img2.jpg`,
//! `img10.jpg`), so plain string ordering puts `img10` before `img2`.
//! [`natural_cmp`] compares embedded digit runs by numeric value instead:
//!
//! ```text
//! ["img2.jpg", "img10.jpg", "img1.jpg"]  →  ["img1.jpg", "img2.jpg", "img10.jpg"]
//! ```
//!
//! The comparison is locale-independent: non-digit characters compare by code
//! point, so the order is identical on every machine.
//!
//! ## Labels
//!
//! Collection directories double as display labels. Dashes and underscores
//! become spaces: `summer-weddings_2024/` → "summer weddings 2024".

use std::cmp::Ordering;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

/// File extensions (lowercase) that count as gallery images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "avif", "gif"];

/// Extensions a `cover.*` file may carry.
const COVER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Compare two strings treating runs of ASCII digits as numbers.
///
/// - `"img2"` < `"img10"` (2 < 10)
/// - `"a"` < `"a1"` (prefix first)
/// - `"img1"` < `"img01"` (equal value: fewer leading zeros first)
///
/// Everything else compares by code point, case-sensitively.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_run = take_digits(&mut left);
                let r_run = take_digits(&mut right);
                let ord = compare_digit_runs(&l_run, &r_run);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                if l != r {
                    return l.cmp(&r);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}

/// Digit runs of any length: compare significant digits first, then padding.
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_value = a.trim_start_matches('0');
    let b_value = b.trim_start_matches('0');
    a_value
        .len()
        .cmp(&b_value.len())
        .then_with(|| a_value.cmp(b_value))
        .then_with(|| a.len().cmp(&b.len()))
}

/// Display label for a collection directory: separators become spaces.
pub fn derive_label(id: &str) -> String {
    id.replace(['-', '_'], " ")
}

fn extension_lowercase(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Whether a filename carries one of the [`IMAGE_EXTENSIONS`] (any case).
pub fn is_image_name(name: &str) -> bool {
    extension_lowercase(name).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether a filename is exactly `cover.(jpg|jpeg|png|webp)`, ignoring case.
pub fn is_cover_name(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) => {
            stem.eq_ignore_ascii_case("cover")
                && COVER_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        }
        None => false,
    }
}

/// Thumbnail filename for a source image: same stem, `.jpg` extension.
///
/// `IMG_0042.PNG` → `IMG_0042.jpg`, `a.b.webp` → `a.b.jpg`.
pub fn thumbnail_name(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    format!("{stem}.jpg")
}
