//! Pure calculation functions for image dimensions and page placement.
//!
//! All functions here are pure and testable without any I/O or images.

/// Shrink an image to fit a bounding box, scaling along a single axis.
///
/// Landscape sources (aspect > 1) are scaled so their width matches the box;
/// portrait and square sources are scaled so their height matches. Sources
/// that already fit are returned unchanged (never upscaled). Results are
/// truncated toward zero.
///
/// Only the constraining axis is checked: a nearly-square portrait source on
/// a narrow page can come out wider than `bounds.0`. Use
/// [`calculate_contain_dimensions`] when both axes must fit.
///
/// # Examples
/// ```
/// # use imgbatch::imaging::calculate_fit_dimensions;
/// // 4000x2000 landscape onto a 595x842 page → width-bound
/// assert_eq!(calculate_fit_dimensions((4000, 2000), (595.0, 842.0)), (595, 297));
///
/// // Already fits → unchanged
/// assert_eq!(calculate_fit_dimensions((300, 200), (595.0, 842.0)), (300, 200));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (f64, f64)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if (src_w as f64 <= max_w && src_h as f64 <= max_h) || src_w == 0 || src_h == 0 {
        return source;
    }

    let aspect = src_w as f64 / src_h as f64;
    if aspect > 1.0 {
        // Landscape: width is the constraint
        (max_w as u32, (max_w / aspect) as u32)
    } else {
        // Portrait or square: height is the constraint
        ((max_h * aspect) as u32, max_h as u32)
    }
}

/// Shrink an image so that both axes fit inside a bounding box.
///
/// Like [`calculate_fit_dimensions`] this never upscales and truncates toward
/// zero, but the scale factor is taken from whichever axis is tighter, so the
/// result always satisfies `w <= bounds.0 && h <= bounds.1`.
pub fn calculate_contain_dimensions(source: (u32, u32), bounds: (f64, f64)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if (src_w as f64 <= max_w && src_h as f64 <= max_h) || src_w == 0 || src_h == 0 {
        return source;
    }

    let (w, h) = (src_w as f64, src_h as f64);
    if w * max_h >= max_w * h {
        // Source is relatively wider than the box: width matches
        (max_w as u32, (max_w * h / w) as u32)
    } else {
        // Source is relatively taller: height matches
        ((max_h * w / h) as u32, max_h as u32)
    }
}

/// Calculate the stretched dimensions that give a source an exact target ratio.
///
/// Never crops. If the source is wider than the target ratio its width is
/// kept and its height grows; otherwise its height is kept and its width
/// grows. The new edge is floored.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `ratio` - Target aspect ratio as (width-units, height-units)
///
/// # Examples
/// ```
/// # use imgbatch::imaging::calculate_preset_dimensions;
/// // 200x100 to 1:1 → too wide, keep width, height becomes 200
/// assert_eq!(calculate_preset_dimensions((200, 100), (1, 1)), (200, 200));
/// ```
pub fn calculate_preset_dimensions(source: (u32, u32), ratio: (u32, u32)) -> (u32, u32) {
    let (w, h) = (source.0 as u64, source.1 as u64);
    let (rw, rh) = (ratio.0 as u64, ratio.1 as u64);

    if rw == 0 || rh == 0 {
        return source;
    }

    if w * rh > h * rw {
        // Too wide: keep width, stretch height
        (source.0, saturate(w * rh / rw))
    } else {
        // Too tall (or exact): keep height, stretch width
        (saturate(h * rw / rh), source.1)
    }
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Offset that centers a placed image on a page.
///
/// Returns `(x, y)` in page units measured from the lower-left corner.
/// Negative offsets mean the image overflows the page on that axis.
pub fn calculate_centered_offset(placed: (u32, u32), page: (f64, f64)) -> (f64, f64) {
    (
        (page.0 - placed.0 as f64) / 2.0,
        (page.1 - placed.1 as f64) / 2.0,
    )
}
