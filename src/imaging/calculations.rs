//! Pure calculation functions for image dimensions.

/// Scale `(width, height)` down so the width is at most `max_width`,
/// preserving aspect ratio. Images already narrow enough are returned as-is.
///
/// The height never rounds down to zero.
///
/// # Examples
/// ```
/// # use gallery_gen::imaging::calculate_capped_dimensions;
/// assert_eq!(calculate_capped_dimensions((1200, 800), 600), (600, 400));
/// assert_eq!(calculate_capped_dimensions((300, 200), 600), (300, 200));
/// ```
pub fn calculate_capped_dimensions(source: (u32, u32), max_width: u32) -> (u32, u32) {
    let (width, height) = source;
    if width <= max_width || width == 0 {
        return source;
    }
    let scaled = (height as f64 * max_width as f64 / width as f64).round() as u32;
    (max_width, scaled.max(1))
}
