//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Upload
//!
//! ```text
//! Uploaded IMG_0001.jpg
//!     Raw: uploads/20261017_143005_IMG_0001.jpg
//!     Composite: uploads/processed/processed_20261017_143005_IMG_0001.jpg
//! Swept 2 expired files
//! ```
//!
//! ## Gallery
//!
//! ```text
//! Gallery (2 images)
//! 001 processed_20261017_143005_IMG_0001.jpg (expires 15:30:05)
//!     Path: uploads/processed/processed_20261017_143005_IMG_0001.jpg
//! 002 processed_20261017_141210_IMG_0002.png (expires 15:12:10)
//!     Path: uploads/processed/processed_20261017_141210_IMG_0002.png
//! ```
//!
//! ## Sweep
//!
//! ```text
//! Swept 1 expired file
//!     uploads/20261017_120000_old.jpg
//! Kept 4 files
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::gallery::{GalleryEntry, caption};
use crate::retention::SweepReport;
use crate::upload::UploadOutcome;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Sweep
// ============================================================================

/// Sweep summary. Removed paths are listed only when `verbose`.
pub fn format_sweep(report: &SweepReport, verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if report.is_noop() {
        lines.push("Nothing to sweep".to_string());
    } else {
        lines.push(format!(
            "Swept {}",
            plural(report.removed.len(), "expired file")
        ));
        if verbose {
            for path in &report.removed {
                lines.push(format!("{}{}", indent(1), path.display()));
            }
        }
        if report.vanished > 0 {
            lines.push(format!(
                "{}{} already removed elsewhere",
                indent(1),
                plural(report.vanished, "file")
            ));
        }
    }
    if verbose {
        lines.push(format!("Kept {}", plural(report.kept, "file")));
    }
    lines
}

pub fn print_sweep(report: &SweepReport) {
    for line in format_sweep(report, true) {
        println!("{}", line);
    }
}

// ============================================================================
// Upload
// ============================================================================

pub fn format_upload(original_name: &str, outcome: &UploadOutcome) -> Vec<String> {
    let mut lines = vec![
        format!("Uploaded {}", original_name),
        format!("{}Raw: {}", indent(1), outcome.raw_path.display()),
        format!(
            "{}Composite: {}",
            indent(1),
            outcome.processed_path.display()
        ),
    ];
    if !outcome.sweep.is_noop() {
        lines.extend(format_sweep(&outcome.sweep, false));
    }
    lines
}

pub fn print_upload(original_name: &str, outcome: &UploadOutcome) {
    for line in format_upload(original_name, outcome) {
        println!("{}", line);
    }
}

// ============================================================================
// Gallery
// ============================================================================

pub fn format_gallery(entries: &[GalleryEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["No images have been uploaded yet.".to_string()];
    }
    let mut lines = vec![format!("Gallery ({})", plural(entries.len(), "image"))];
    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), caption(entry)));
        lines.push(format!("{}Path: {}", indent(1), entry.path.display()));
    }
    lines
}

pub fn print_gallery(entries: &[GalleryEntry]) {
    for line in format_gallery(entries) {
        println!("{}", line);
    }
}
