//! Pure calculation functions for the ring layout.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::QuarterTurn;

/// Uniform downscale factor that fits `(width, height)` inside a square of
/// side `max_extent`.
///
/// Never exceeds 1.0: sources that already fit are left at natural size.
/// Returns `None` when either dimension is zero.
///
/// # Examples
/// ```
/// # use rikoten::imaging::scale_factor;
/// assert_eq!(scale_factor((620, 310), 310), Some(0.5));
/// assert_eq!(scale_factor((100, 50), 310), Some(1.0));
/// assert_eq!(scale_factor((0, 50), 310), None);
/// ```
pub fn scale_factor(source: (u32, u32), max_extent: u32) -> Option<f64> {
    let (w, h) = source;
    if w == 0 || h == 0 {
        return None;
    }
    let longest = w.max(h) as f64;
    Some((max_extent as f64 / longest).min(1.0))
}

/// Dimensions after applying [`scale_factor`] to `source`.
///
/// A factor of 1.0 keeps the source unchanged, so nothing is ever upscaled.
/// Below 1.0 the edges are computed with integer arithmetic (truncating) so
/// the longer edge lands exactly on `max_extent`; each edge is at least 1
/// pixel. Returns `None` when either dimension is zero.
pub fn fitted_dimensions(source: (u32, u32), max_extent: u32) -> Option<(u32, u32)> {
    let scale = scale_factor(source, max_extent)?;
    if scale >= 1.0 {
        return Some(source);
    }
    let (w, h) = source;
    let longest = w.max(h);
    let fit = |edge: u32| ((edge as u64 * max_extent as u64) / longest as u64).max(1) as u32;
    Some((fit(w), fit(h)))
}

/// Center point of a placement on the ring.
///
/// `(cx + R·sin θ, cy − R·cos θ)` with θ measured clockwise from the top,
/// rounded to whole pixels so the four quarter-turn centers are exact.
pub fn placement_center(center: (i64, i64), ring_radius: u32, turn: QuarterTurn) -> (i64, i64) {
    let (cx, cy) = center;
    let r = ring_radius as f64;
    let theta = turn.radians();
    (
        cx + (r * theta.sin()).round() as i64,
        cy - (r * theta.cos()).round() as i64,
    )
}

/// Top-left corner that centers an image of `size` on `center`.
pub fn paste_origin(center: (i64, i64), size: (u32, u32)) -> (i64, i64) {
    (center.0 - (size.0 / 2) as i64, center.1 - (size.1 / 2) as i64)
}

/// Inclusive bounds `(x0, y0, x1, y1)` of a square of `side` centered on `center`.
pub fn marker_bounds(center: (i64, i64), side: u32) -> (i64, i64, i64, i64) {
    let half = (side / 2) as i64;
    (
        center.0 - half,
        center.1 - half,
        center.0 + half,
        center.1 + half,
    )
}

/// Whether `(x, y)` falls on a square outline of width `stroke`, drawn
/// inward from the inclusive `bounds`.
pub fn in_marker_stroke(x: i64, y: i64, bounds: (i64, i64, i64, i64), stroke: u32) -> bool {
    let (x0, y0, x1, y1) = bounds;
    if x < x0 || x > x1 || y < y0 || y > y1 {
        return false;
    }
    let s = stroke as i64;
    x < x0 + s || x > x1 - s || y < y0 + s || y > y1 - s
}
