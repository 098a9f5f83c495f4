//! Image processing — the ring compositor.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (JPEG, PNG); `libheif-rs` behind the `heif` feature |
//! | **Fit** | `imageops::resize` with `Lanczos3`, downscale only |
//! | **Rotate** | `DynamicImage::rotate90/180/270` (lossless quarter turns) |
//! | **Composite** | `imageops::overlay` (alpha blend) |
//! | **Encode** | `DynamicImage::save_with_format` (PNG keeps alpha, JPEG flattened) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for the ring geometry (unit testable)
//! - **Parameters**: Canvas, ring, and marker constants
//! - **Decode**: Source loading and the [`DecoderSupport`] capability flag
//! - **Compositor**: [`process_image`], combining calculations + pixel work

mod calculations;
pub mod compositor;
pub mod decode;
mod error;
mod params;

pub use calculations::{fitted_dimensions, placement_center, scale_factor};
pub use compositor::{OutputFormat, compose, process_image, process_image_with};
pub use decode::{DecoderSupport, SUPPORTED_EXTENSIONS, is_heif_extension, is_supported_extension};
pub use error::CompositeError;
pub use params::{CompositeParams, QuarterTurn};
