//! Shared test utilities for the rikoten test suite.
//!
//! Builds isolated configurations, ages files by rewriting their mtime, and
//! generates small synthetic images with known pixel layouts.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let config = test_config(tmp.path());
//!
//! let raw = config.storage.upload_dir.join("shot.png");
//! write_split_png(&raw, 80, 60);
//! age_file(&raw, config.expire_after() * 2);
//! ```

use crate::config::{AppConfig, StorageConfig};
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs::OpenOptions;
use std::io::Cursor;
use std::path::Path;
use std::time::{Duration, SystemTime};

pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

// =========================================================================
// Configuration
// =========================================================================

/// Default config rooted in `root`, with both storage directories created.
///
/// No passcode is set; gallery tests add their own.
pub fn test_config(root: &Path) -> AppConfig {
    let config = AppConfig {
        storage: StorageConfig {
            upload_dir: root.join("uploads"),
            processed_dir: root.join("uploads/processed"),
        },
        ..AppConfig::default()
    };
    config.ensure_dirs().unwrap();
    config
}

// =========================================================================
// File ages
// =========================================================================

/// Set `path`'s modification time to `at`.
pub fn set_mtime(path: &Path, at: SystemTime) {
    let file = OpenOptions::new().write(true).open(path).unwrap();
    file.set_modified(at).unwrap();
}

/// Set `path`'s modification time to `age` before now.
pub fn age_file(path: &Path, age: Duration) {
    set_mtime(path, SystemTime::now() - age);
}

// =========================================================================
// Synthetic images
// =========================================================================

/// Top half red, bottom half blue, fully opaque.
pub fn split_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |_, y| if y < height / 2 { RED } else { BLUE })
}

pub fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(rgb))
}

pub fn encode_split_png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    split_image(width, height)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

pub fn encode_solid_jpeg(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    solid_image(width, height, rgb)
        .write_to(&mut buf, ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

pub fn write_split_png(path: &Path, width: u32, height: u32) {
    std::fs::write(path, encode_split_png(width, height)).unwrap();
}

pub fn write_solid_jpeg(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
    std::fs::write(path, encode_solid_jpeg(width, height, rgb)).unwrap();
}
