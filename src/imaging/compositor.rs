//! The ring composite: four rotated copies of one photo around a centered marker.
//!
//! ```text
//!               0°  (600, 270)
//!                 ┌─────┐
//!                 │  ▲  │
//!                 └─────┘
//!   ┌─────┐        ┌──┐        ┌─────┐
//!   │  ◀  │        └──┘        │  ▶  │
//!   └─────┘     (600, 600)     └─────┘
//!  270° (270, 600)          90° (930, 600)
//!                 ┌─────┐
//!                 │  ▼  │
//!                 └─────┘
//!              180° (600, 930)
//! ```
//!
//! Steps, all on one thread:
//!
//! 1. Decode the source and normalize it to RGBA8.
//! 2. Fit it inside `ring_radius - margin` (Lanczos3, downscale only).
//! 3. For each quarter turn, rotate a copy clockwise and alpha-blend it
//!    centered on its ring position over an opaque black canvas.
//! 4. Draw the white square outline at the canvas center, on top.
//! 5. Encode by destination extension: PNG keeps alpha, JPEG is flattened.
//!
//! Sources that already fit are not resized but are still rotated and placed.

use super::calculations::{
    fitted_dimensions, in_marker_stroke, marker_bounds, paste_origin, placement_center,
    scale_factor,
};
use super::decode::load_image;
use super::error::CompositeError;
use super::params::CompositeParams;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Output encodings the compositor can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Pick the encoding from a destination path's extension.
    pub fn from_path(path: &Path) -> Result<Self, CompositeError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            other => Err(CompositeError::UnsupportedOutput(other.to_string())),
        }
    }

    pub fn supports_alpha(self) -> bool {
        matches!(self, OutputFormat::Png)
    }

    fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Composite `src` with the default geometry and write it to `dst`.
pub fn process_image(src: &Path, dst: &Path) -> Result<(), CompositeError> {
    process_image_with(src, dst, &CompositeParams::default())
}

/// Composite `src` with explicit geometry and write it to `dst`.
///
/// The destination extension selects the encoding. Nothing is written
/// unless decoding, compositing, and encoding all succeed.
#[instrument(skip(params), fields(src = %src.display(), dst = %dst.display()))]
pub fn process_image_with(
    src: &Path,
    dst: &Path,
    params: &CompositeParams,
) -> Result<(), CompositeError> {
    let format = OutputFormat::from_path(dst)?;
    let source = load_image(src)?;
    info!(
        width = source.width(),
        height = source.height(),
        "Source decoded"
    );

    let canvas = compose(&source, params).map_err(|e| match e {
        CompositeError::EmptySource(_) => CompositeError::EmptySource(src.to_path_buf()),
        other => other,
    })?;
    save_canvas(canvas, dst, format)?;
    info!("Composite written");
    Ok(())
}

/// Build the composite canvas in memory.
///
/// The source is scaled by [`scale_factor`], which never exceeds 1.0: large
/// sources shrink to fit the ring, small ones keep their natural size.
pub fn compose(source: &DynamicImage, params: &CompositeParams) -> Result<RgbaImage, CompositeError> {
    let rgba = DynamicImage::ImageRgba8(source.to_rgba8());
    let original = (rgba.width(), rgba.height());

    let scale = scale_factor(original, params.max_extent())
        .ok_or_else(|| CompositeError::EmptySource(PathBuf::new()))?;
    let fitted = if scale >= 1.0 {
        rgba
    } else {
        let (width, height) = fitted_dimensions(original, params.max_extent())
            .ok_or_else(|| CompositeError::EmptySource(PathBuf::new()))?;
        debug!(scale, width, height, "Downscaling source");
        DynamicImage::ImageRgba8(imageops::resize(&rgba, width, height, FilterType::Lanczos3))
    };

    let size = params.canvas_size;
    let mut canvas = RgbaImage::from_pixel(size, size, params.background);
    let center = params.center();

    for turn in params.placements {
        let rotated = turn.rotate(&fitted).to_rgba8();
        let at = placement_center(center, params.ring_radius, turn);
        let (x, y) = paste_origin(at, rotated.dimensions());
        debug!(degrees = turn.degrees(), x, y, "Placing copy");
        imageops::overlay(&mut canvas, &rotated, x, y);
    }

    draw_marker(&mut canvas, params);
    Ok(canvas)
}

/// Stroke the square outline at the canvas center.
fn draw_marker(canvas: &mut RgbaImage, params: &CompositeParams) {
    let bounds = marker_bounds(params.center(), params.marker_side());
    let (x0, y0, x1, y1) = bounds;
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);

    for y in y0.max(0)..=y1.min(h - 1) {
        for x in x0.max(0)..=x1.min(w - 1) {
            if in_marker_stroke(x, y, bounds, params.marker_stroke) {
                canvas.put_pixel(x as u32, y as u32, params.marker_color);
            }
        }
    }
}

/// Encode next to the destination, then rename into place.
fn save_canvas(canvas: RgbaImage, dst: &Path, format: OutputFormat) -> Result<(), CompositeError> {
    let image = if format.supports_alpha() {
        DynamicImage::ImageRgba8(canvas)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
    };

    let tmp = partial_path(dst);
    let encode_err = |e: image::ImageError| CompositeError::Encode {
        path: dst.to_path_buf(),
        reason: e.to_string(),
    };
    if let Err(e) = image.save_with_format(&tmp, format.image_format()) {
        if let Err(cleanup) = std::fs::remove_file(&tmp) {
            debug!(path = %tmp.display(), error = %cleanup, "No partial file to remove");
        }
        return Err(encode_err(e));
    }
    std::fs::rename(&tmp, dst)?;
    Ok(())
}

/// Hidden sibling used while encoding; listings skip dotfiles.
fn partial_path(dst: &Path) -> PathBuf {
    let name = dst
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dst.with_file_name(format!(".{name}.partial"))
}
