//! Parameter types for the ring composite.
//!
//! These structs describe *what* the composite looks like, not *how* it is
//! drawn. The [`compositor`](super::compositor) reads every constant from
//! [`CompositeParams`]; the pure math in [`calculations`](super::calculations)
//! takes them as plain arguments.
//!
//! ## Types
//!
//! - [`QuarterTurn`] — One of the four placements around the ring (0°, 90°, 180°, 270°).
//! - [`CompositeParams`] — Canvas size, ring geometry, and center marker style.

use image::{DynamicImage, Rgba};

/// A clockwise rotation by a multiple of 90°.
///
/// Each placement around the ring is identified by its angle measured
/// clockwise from the top: 0° sits above the center, 90° to the right,
/// 180° below, 270° to the left. The copy placed there is rotated
/// clockwise by the same angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarterTurn {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl QuarterTurn {
    pub const ALL: [QuarterTurn; 4] = [
        QuarterTurn::Deg0,
        QuarterTurn::Deg90,
        QuarterTurn::Deg180,
        QuarterTurn::Deg270,
    ];

    pub fn degrees(self) -> u32 {
        match self {
            QuarterTurn::Deg0 => 0,
            QuarterTurn::Deg90 => 90,
            QuarterTurn::Deg180 => 180,
            QuarterTurn::Deg270 => 270,
        }
    }

    pub fn radians(self) -> f64 {
        (self.degrees() as f64).to_radians()
    }

    /// Rotate a copy of `image` clockwise by this angle.
    ///
    /// Quarter turns are lossless and the bounding box always expands to
    /// fit (90° and 270° swap width and height), so nothing is clipped.
    pub fn rotate(self, image: &DynamicImage) -> DynamicImage {
        match self {
            QuarterTurn::Deg0 => image.clone(),
            QuarterTurn::Deg90 => image.rotate90(),
            QuarterTurn::Deg180 => image.rotate180(),
            QuarterTurn::Deg270 => image.rotate270(),
        }
    }
}

/// Geometry and styling of the ring composite.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeParams {
    /// Side of the square output canvas in pixels.
    pub canvas_size: u32,
    /// Distance from the canvas center to each placement center.
    pub ring_radius: u32,
    /// Gap subtracted from the ring radius when fitting the source.
    pub margin: u32,
    /// Placements, drawn in this order.
    pub placements: [QuarterTurn; 4],
    /// Marker side length as a fraction of the canvas size.
    pub marker_ratio: f64,
    /// Marker outline width in pixels, drawn inward from the outer edge.
    pub marker_stroke: u32,
    pub marker_color: Rgba<u8>,
    pub background: Rgba<u8>,
}

impl CompositeParams {
    /// Largest extent (width or height) a source may have after fitting.
    pub fn max_extent(&self) -> u32 {
        self.ring_radius.saturating_sub(self.margin)
    }

    /// Canvas center; integer halves of the canvas size.
    pub fn center(&self) -> (i64, i64) {
        let c = (self.canvas_size / 2) as i64;
        (c, c)
    }

    /// Marker side in pixels, rounded.
    pub fn marker_side(&self) -> u32 {
        (self.canvas_size as f64 * self.marker_ratio).round() as u32
    }
}

impl Default for CompositeParams {
    fn default() -> Self {
        Self {
            canvas_size: 1200,
            ring_radius: 330,
            margin: 20,
            placements: QuarterTurn::ALL,
            marker_ratio: 0.05,
            marker_stroke: 6,
            marker_color: Rgba([255, 255, 255, 255]),
            background: Rgba([0, 0, 0, 255]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn default_geometry() {
        let p = CompositeParams::default();
        assert_eq!(p.canvas_size, 1200);
        assert_eq!(p.center(), (600, 600));
        assert_eq!(p.max_extent(), 310);
        assert_eq!(p.marker_side(), 60);
        assert_eq!(p.marker_stroke, 6);
    }

    #[test]
    fn placements_are_clockwise_from_top() {
        let degrees: Vec<u32> = CompositeParams::default()
            .placements
            .iter()
            .map(|t| t.degrees())
            .collect();
        assert_eq!(degrees, vec![0, 90, 180, 270]);
    }

    #[test]
    fn quarter_turns_expand_bounding_box() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(40, 10));
        assert_eq!(QuarterTurn::Deg0.rotate(&img).width(), 40);
        assert_eq!(QuarterTurn::Deg90.rotate(&img).width(), 10);
        assert_eq!(QuarterTurn::Deg90.rotate(&img).height(), 40);
        assert_eq!(QuarterTurn::Deg180.rotate(&img).width(), 40);
        assert_eq!(QuarterTurn::Deg270.rotate(&img).height(), 40);
    }

    #[test]
    fn quarter_turn_rotates_clockwise() {
        // Mark the top-left pixel; a clockwise quarter turn moves it top-right.
        let mut img = RgbaImage::new(4, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let rotated = QuarterTurn::Deg90
            .rotate(&DynamicImage::ImageRgba8(img))
            .to_rgba8();
        assert_eq!(rotated.dimensions(), (2, 4));
        assert_eq!(rotated.get_pixel(1, 0), &Rgba([255, 0, 0, 255]));
    }
}
