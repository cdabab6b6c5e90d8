//! Pure calculation functions for preview dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! Dimensions are `(width, height)` in raw (pre-rotation) pixel space unless
//! a function says otherwise.

use super::orientation::OrientationClass;

/// Calculate preview dimensions that fit inside a bounding box.
///
/// Scales down preserving aspect ratio so that one edge matches the box
/// exactly and the other fits inside it. Sources that already fit are
/// returned unchanged; this never scales up.
///
/// # Examples
/// ```
/// # use tripart::imaging::calculate_preview_dimensions;
/// // 4:3 landscape into a 512 square → width-bound
/// assert_eq!(calculate_preview_dimensions((4000, 3000), (512, 512)), (512, 384));
///
/// // Already small enough → untouched
/// assert_eq!(calculate_preview_dimensions((300, 200), (512, 512)), (300, 200));
/// ```
pub fn calculate_preview_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w <= max_w && src_h <= max_h {
        return source;
    }

    // Compare aspect ratios without dividing: src_w/src_h vs max_w/max_h
    if src_w as u64 * max_h as u64 >= src_h as u64 * max_w as u64 {
        // Source is relatively wider: width hits the box first
        let h = (src_h as f64 * max_w as f64 / src_w as f64).round() as u32;
        (max_w, h.clamp(1, max_h))
    } else {
        // Source is relatively taller: height hits the box first
        let w = (src_w as f64 * max_h as f64 / src_h as f64).round() as u32;
        (w.clamp(1, max_w), max_h)
    }
}

/// Choose the power-of-two decode sample factor for a preview.
///
/// Halves the source dimensions while *both* still exceed the target, then
/// backs off one step, so the decoded bitmap stays at or above the target on
/// both axes and the final resample is always a downscale.
///
/// ```text
/// 4000x3000 → 512x384
///   2000x1500 (2)  1000x750 (4)  500x375 (8, stop)  → back off → 4
/// ```
pub fn calculate_sample_factor(source: (u32, u32), target: (u32, u32)) -> u32 {
    let (mut w, mut h) = source;
    let (target_w, target_h) = target;
    let mut factor = 1u32;

    while w > target_w && h > target_h {
        w >>= 1;
        h >>= 1;
        factor <<= 1;
    }

    (factor >> 1).max(1)
}

/// Dimensions of the bitmap produced by decoding at `1/factor`.
pub fn sampled_dimensions(source: (u32, u32), factor: u32) -> (u32, u32) {
    let factor = factor.max(1);
    ((source.0 / factor).max(1), (source.1 / factor).max(1))
}

/// Dimensions as a viewer sees them after applying the orientation.
///
/// Quarter turns swap width and height; everything else passes through.
pub fn logical_dimensions(source: (u32, u32), orientation: OrientationClass) -> (u32, u32) {
    if orientation.swaps_axes() {
        (source.1, source.0)
    } else {
        source
    }
}
