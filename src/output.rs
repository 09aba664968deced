//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Collections lead with
//! their label and image count; directory names follow as indented `Source:`
//! lines so every entry can be traced back to disk.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Collections
//! 001 summer weddings 2024 (3 images)
//!     Source: summer-weddings_2024/
//!     Cover: cover.jpg
//!     001 cover.jpg
//!     002 img1.jpg
//!     003 img10.jpg
//!
//! Skipped
//!     empty-collection: no images
//! ```
//!
//! ## Generate
//!
//! ```text
//! summer weddings 2024 (3 images)
//!     Source: summer-weddings_2024/
//!     001 cover.jpg: cached
//!     002 img1.jpg: generated
//!     003 clip.avif: source
//! warning: summer-weddings_2024/img1.jpg: metadata unreadable: ...
//!
//! Thumbnails: 1 fresh, 1 generated, 1 without thumbnail (3 total)
//! Wrote 1 collection (3 images) → galleries/galleries.json
//! ```
//!
//! # Architecture
//!
//! Each piece of output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes it. Format functions are
//! pure: no I/O, no side effects. Warnings go to stderr, everything else to
//! stdout.

use crate::generate::{GenerateEvent, GenerateResult, ThumbStatus};
use crate::naming::derive_label;
use crate::scan::ScanResult;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `"1 image"` / `"3 images"`.
fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

/// Header line for a collection.
///
/// ```text
/// 001 summer weddings 2024 (3 images)   // indexed
/// summer weddings 2024 (3 images)       // progress
/// ```
fn collection_header(index: Option<usize>, label: &str, images: usize) -> String {
    match index {
        Some(i) => format!("{} {} ({})", format_index(i), label, count(images, "image")),
        None => format!("{} ({})", label, count(images, "image")),
    }
}

fn thumb_status(status: ThumbStatus) -> &'static str {
    match status {
        ThumbStatus::Fresh => "cached",
        ThumbStatus::Generated => "generated",
        ThumbStatus::Source => "source",
        ThumbStatus::Failed => "failed, using source",
    }
}

// ============================================================================
// Startup
// ============================================================================

/// Notes about switched-off capabilities. Empty when everything is on.
pub fn format_capabilities(thumbnails: bool, metadata: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if !thumbnails {
        lines.push("note: thumbnails disabled, images use their source as thumbnail".to_string());
    }
    if !metadata {
        lines.push("note: metadata disabled, captions and dates left empty".to_string());
    }
    lines
}

pub fn print_capabilities(thumbnails: bool, metadata: bool) {
    for line in format_capabilities(thumbnails, metadata) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format scan output showing discovered collections.
///
/// Labels are derived from directory names; `metadata.json` overrides are
/// only applied by `generate`.
pub fn format_scan_output(result: &ScanResult) -> Vec<String> {
    let mut lines = vec!["Collections".to_string()];

    for (i, col) in result.collections.iter().enumerate() {
        lines.push(collection_header(
            Some(i + 1),
            &derive_label(&col.id),
            col.images.len(),
        ));
        lines.push(format!("{}Source: {}/", indent(1), col.id));
        lines.push(format!("{}Cover: {}", indent(1), col.cover));
        for (j, name) in col.images.iter().enumerate() {
            lines.push(format!("{}{} {}", indent(1), format_index(j + 1), name));
        }
    }

    if !result.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for skipped in &result.skipped {
            lines.push(format!("{}{}: {}", indent(1), skipped.id, skipped.reason));
        }
    }

    lines
}

pub fn print_scan_output(result: &ScanResult) {
    for line in format_scan_output(result) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Format a single generate progress event as display lines.
pub fn format_event(event: &GenerateEvent) -> Vec<String> {
    match event {
        GenerateEvent::CollectionStarted {
            id,
            label,
            image_count,
        } => vec![
            collection_header(None, label, *image_count),
            format!("{}Source: {}/", indent(1), id),
        ],
        GenerateEvent::CollectionSkipped { id, reason } => {
            vec![format!("Skipped {}/ ({})", id, reason)]
        }
        GenerateEvent::ImageProcessed { index, name, thumb } => vec![format!(
            "{}{} {}: {}",
            indent(1),
            format_index(*index),
            name,
            thumb_status(*thumb)
        )],
        GenerateEvent::Warning {
            collection,
            image,
            message,
        } => {
            let subject = match image {
                Some(name) => format!("{}/{}", collection, name),
                None => format!("{}/", collection),
            };
            vec![format!("warning: {}: {}", subject, message)]
        }
    }
}

/// Print an event: warnings to stderr, progress to stdout.
pub fn print_event(event: &GenerateEvent) {
    let is_warning = matches!(event, GenerateEvent::Warning { .. });
    for line in format_event(event) {
        if is_warning {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

/// Closing lines of a generate run.
pub fn format_summary(result: &GenerateResult) -> Vec<String> {
    let images: usize = result.collections.iter().map(|c| c.images.len()).sum();
    vec![
        String::new(),
        format!("Thumbnails: {}", result.cache_stats),
        format!(
            "Wrote {} ({}) \u{2192} {}",
            count(result.collections.len(), "collection"),
            count(images, "image"),
            result.manifest_path.display()
        ),
    ]
}

pub fn print_summary(result: &GenerateResult) {
    for line in format_summary(result) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStats;
    use crate::scan::{CollectionListing, SkipReason, SkippedCollection};
    use crate::types::{Collection, Image};
    use std::path::PathBuf;

    fn listing(id: &str, images: &[&str], cover: &str) -> CollectionListing {
        CollectionListing {
            id: id.to_string(),
            dir: PathBuf::from("galleries").join(id),
            images: images.iter().map(|s| s.to_string()).collect(),
            cover: cover.to_string(),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(1), "    ");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn count_pluralises() {
        assert_eq!(count(0, "image"), "0 images");
        assert_eq!(count(1, "image"), "1 image");
        assert_eq!(count(2, "collection"), "2 collections");
    }

    // =========================================================================
    // Startup
    // =========================================================================

    #[test]
    fn capabilities_all_on_is_silent() {
        assert!(format_capabilities(true, true).is_empty());
    }

    #[test]
    fn capabilities_off_are_noted() {
        let lines = format_capabilities(false, false);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("thumbnails disabled"));
        assert!(lines[1].contains("metadata disabled"));
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn scan_output_lists_collections_and_skips() {
        let result = ScanResult {
            collections: vec![listing(
                "summer-weddings_2024",
                &["cover.jpg", "img1.jpg"],
                "cover.jpg",
            )],
            skipped: vec![SkippedCollection {
                id: "empty".into(),
                reason: SkipReason::NoImages,
            }],
        };
        let lines = format_scan_output(&result);
        assert_eq!(
            lines,
            vec![
                "Collections",
                "001 summer weddings 2024 (2 images)",
                "    Source: summer-weddings_2024/",
                "    Cover: cover.jpg",
                "    001 cover.jpg",
                "    002 img1.jpg",
                "",
                "Skipped",
                "    empty: no images",
            ]
        );
    }

    #[test]
    fn scan_output_without_skips_has_no_section() {
        let result = ScanResult {
            collections: vec![listing("a", &["x.jpg"], "x.jpg")],
            skipped: vec![],
        };
        let lines = format_scan_output(&result);
        assert!(!lines.contains(&"Skipped".to_string()));
        assert_eq!(lines[1], "001 a (1 image)");
    }

    // =========================================================================
    // Generate events
    // =========================================================================

    #[test]
    fn collection_started_lines() {
        let lines = format_event(&GenerateEvent::CollectionStarted {
            id: "trip_2".into(),
            label: "Trip Two".into(),
            image_count: 5,
        });
        assert_eq!(lines, vec!["Trip Two (5 images)", "    Source: trip_2/"]);
    }

    #[test]
    fn image_processed_line() {
        let line = |thumb| {
            format_event(&GenerateEvent::ImageProcessed {
                index: 3,
                name: "img10.jpg".into(),
                thumb,
            })
        };
        assert_eq!(line(ThumbStatus::Fresh), vec!["    003 img10.jpg: cached"]);
        assert_eq!(line(ThumbStatus::Generated), vec!["    003 img10.jpg: generated"]);
        assert_eq!(line(ThumbStatus::Source), vec!["    003 img10.jpg: source"]);
        assert_eq!(
            line(ThumbStatus::Failed),
            vec!["    003 img10.jpg: failed, using source"]
        );
    }

    #[test]
    fn skipped_line() {
        let lines = format_event(&GenerateEvent::CollectionSkipped {
            id: "locked".into(),
            reason: SkipReason::Unreadable("permission denied".into()),
        });
        assert_eq!(lines, vec!["Skipped locked/ (unreadable: permission denied)"]);
    }

    #[test]
    fn warning_names_collection_and_image() {
        let with_image = format_event(&GenerateEvent::Warning {
            collection: "trip".into(),
            image: Some("b.jpg".into()),
            message: "thumbnail failed: bad data".into(),
        });
        assert_eq!(with_image, vec!["warning: trip/b.jpg: thumbnail failed: bad data"]);

        let collection_only = format_event(&GenerateEvent::Warning {
            collection: "trip".into(),
            image: None,
            message: "ignoring override".into(),
        });
        assert_eq!(collection_only, vec!["warning: trip/: ignoring override"]);
    }

    // =========================================================================
    // Summary
    // =========================================================================

    #[test]
    fn summary_counts_collections_and_images() {
        let image = |name: &str| Image {
            name: name.into(),
            src: format!("/galleries/c/{}", name),
            thumb: format!("/galleries/c/{}", name),
            caption: String::new(),
            date: None,
        };
        let result = GenerateResult {
            collections: vec![Collection {
                id: "c".into(),
                label: "c".into(),
                cover: "/galleries/c/a.jpg".into(),
                cover_thumb: "/galleries/c/a.jpg".into(),
                images: vec![image("a.jpg"), image("b.jpg")],
                metadata: None,
            }],
            manifest_path: PathBuf::from("galleries/galleries.json"),
            cache_stats: CacheStats {
                fresh: 1,
                generated: 1,
                ..Default::default()
            },
        };
        let lines = format_summary(&result);
        assert_eq!(lines[1], "Thumbnails: 1 fresh, 1 generated (2 total)");
        assert_eq!(
            lines[2],
            "Wrote 1 collection (2 images) \u{2192} galleries/galleries.json"
        );
    }
}
