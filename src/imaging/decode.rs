//! Source decoding and decoder capabilities.
//!
//! ## Decoder mapping
//!
//! | Extension | Decoder |
//! |---|---|
//! | jpg, jpeg, png | `image` crate (pure Rust, always compiled in) |
//! | heic, heif | `libheif-rs`, only with the `heif` cargo feature |
//!
//! Whether the HEIF decoder exists is a compile-time fact. [`DecoderSupport`]
//! captures it once at startup so the upload flow can reject HEIC/HEIF before
//! anything is written, instead of failing later inside the compositor.

use super::error::CompositeError;
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// The high-efficiency family; needs the optional decoder.
pub const HEIF_EXTENSIONS: &[&str] = &["heic", "heif"];

/// Every extension the upload flow knows about, in display order.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "heif"];

pub fn is_heif_extension(ext: &str) -> bool {
    HEIF_EXTENSIONS.iter().any(|h| h.eq_ignore_ascii_case(ext))
}

pub fn is_supported_extension(ext: &str) -> bool {
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(ext))
}

/// Which optional decoders are available in this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderSupport {
    heif: bool,
}

impl DecoderSupport {
    /// Resolve capabilities of the running binary.
    pub fn detect() -> Self {
        Self {
            heif: cfg!(feature = "heif"),
        }
    }

    /// Explicit capabilities, for tests and embedding.
    pub fn new(heif: bool) -> Self {
        Self { heif }
    }

    pub fn heif_available(&self) -> bool {
        self.heif
    }

    /// Extensions that can actually be decoded right now.
    pub fn accepted_extensions(&self) -> Vec<&'static str> {
        SUPPORTED_EXTENSIONS
            .iter()
            .copied()
            .filter(|ext| self.heif || !is_heif_extension(ext))
            .collect()
    }
}

impl Default for DecoderSupport {
    fn default() -> Self {
        Self::detect()
    }
}

fn has_heif_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(is_heif_extension)
}

/// Load and decode a source image from disk.
///
/// Raster formats are identified by content first and extension second, so a
/// PNG uploaded as `.jpg` still decodes.
pub fn load_image(path: &Path) -> Result<DynamicImage, CompositeError> {
    if has_heif_extension(path) {
        return decode_heif(path);
    }
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| CompositeError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

#[cfg(not(feature = "heif"))]
fn decode_heif(path: &Path) -> Result<DynamicImage, CompositeError> {
    Err(CompositeError::DecoderUnavailable(path.to_path_buf()))
}

/// Decode the primary image of a HEIC/HEIF container to RGBA8.
#[cfg(feature = "heif")]
fn decode_heif(path: &Path) -> Result<DynamicImage, CompositeError> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let decode_err = |reason: String| CompositeError::Decode {
        path: path.to_path_buf(),
        reason,
    };

    let name = path
        .to_str()
        .ok_or_else(|| decode_err("path is not valid UTF-8".into()))?;
    let lib = LibHeif::new();
    let ctx = HeifContext::read_from_file(name).map_err(|e| decode_err(e.to_string()))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| decode_err(e.to_string()))?;
    let decoded = lib
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgba), None)
        .map_err(|e| decode_err(e.to_string()))?;

    let planes = decoded.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| decode_err("no interleaved RGBA plane".into()))?;
    let (width, height) = (plane.width, plane.height);
    let row_len = width as usize * 4;

    // Rows may be padded; copy only the pixel bytes.
    let mut rgba = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * plane.stride;
        rgba.extend_from_slice(&plane.data[start..start + row_len]);
    }

    image::RgbaImage::from_raw(width, height, rgba)
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| decode_err("decoded buffer does not match dimensions".into()))
}
