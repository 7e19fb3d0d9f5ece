//! Pure dimension math, no I/O.

/// Dimensions of a preview resized to `target_width`, keeping the aspect ratio.
///
/// Images narrower than the target are scaled up, like the browser would when
/// stretching the placeholder. Height never rounds down to zero and saturates
/// at `u32::MAX` for extreme ratios.
pub fn preview_dimensions(original: (u32, u32), target_width: u32) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    if orig_w == 0 || orig_h == 0 {
        return (target_width.max(1), 1);
    }
    let width = target_width.max(1);
    let height = (orig_h as f64 * width as f64 / orig_w as f64).round() as u32;
    (width, height.max(1))
}
