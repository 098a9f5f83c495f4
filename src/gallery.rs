//! Gallery flow: passcode check, sweep, list composites newest first.
//!
//! Ordering is explicit. Each composite's capture time is read back from its
//! file name (see [`naming::parse_capture_timestamp`](crate::naming::parse_capture_timestamp));
//! names without one fall back to the file's modification time. Within one
//! second, later modification times come first, then higher collision
//! suffixes (`shot-10` after `shot-9`, see
//! [`naming::collision_index`](crate::naming::collision_index)). The file name
//! only settles entries that tie on all of those.

use crate::config::AppConfig;
use crate::naming::{collision_index, parse_capture_timestamp};
use crate::retention::{RetentionError, SweepReport, sweep_dirs};
use crate::store::{StoreError, StoredFile, list_files};
use chrono::{DateTime, Local};
use maud::{DOCTYPE, Markup, html};
use serde::Serialize;
use std::path::PathBuf;
use std::time::SystemTime;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Incorrect passcode")]
    AuthFailure,
    #[error("No gallery passcode is configured (set admin.passcode or RIKOTEN_ADMIN_PASS)")]
    PasscodeNotConfigured,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Cleanup failed: {0}")]
    Retention(#[from] RetentionError),
}

/// One composite as shown in the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryEntry {
    pub file_name: String,
    pub path: PathBuf,
    /// Capture time from the file name, else modification time.
    pub captured: DateTime<Local>,
    pub modified: DateTime<Local>,
    /// When the sweeper will consider this file expired.
    pub expires_at: DateTime<Local>,
}

/// The result of a gallery view.
#[derive(Debug, Clone)]
pub struct GalleryView {
    pub entries: Vec<GalleryEntry>,
    pub sweep: SweepReport,
}

/// Exact string comparison against the configured passcode.
pub fn authenticate(input: &str, config: &AppConfig) -> Result<(), GalleryError> {
    match config.admin.passcode.as_deref() {
        None => Err(GalleryError::PasscodeNotConfigured),
        Some(expected) if expected == input => Ok(()),
        Some(_) => Err(GalleryError::AuthFailure),
    }
}

/// Authenticate, sweep, and list the gallery.
pub fn view(passcode: &str, config: &AppConfig) -> Result<GalleryView, GalleryError> {
    view_at(passcode, config, SystemTime::now())
}

/// [`view`] with the sweep evaluated at `now`.
///
/// Nothing is read from the processed directory unless the passcode matches.
#[instrument(skip_all)]
pub fn view_at(
    passcode: &str,
    config: &AppConfig,
    now: SystemTime,
) -> Result<GalleryView, GalleryError> {
    authenticate(passcode, config)?;
    let sweep = sweep_dirs(&config.swept_dirs(), config.expire_after(), now)?;
    let entries = list_entries(config)?;
    info!(count = entries.len(), "Gallery listed");
    Ok(GalleryView { entries, sweep })
}

/// List the processed directory as gallery entries, newest first.
pub fn list_entries(config: &AppConfig) -> Result<Vec<GalleryEntry>, GalleryError> {
    let expire = chrono::Duration::from_std(config.expire_after())
        .unwrap_or(chrono::Duration::MAX);

    let mut entries: Vec<GalleryEntry> = list_files(&config.storage.processed_dir)?
        .into_iter()
        .filter(|f| !f.is_hidden())
        .map(|f| to_entry(f, expire))
        .collect();

    entries.sort_by(|a, b| {
        b.captured
            .cmp(&a.captured)
            .then_with(|| b.modified.cmp(&a.modified))
            .then_with(|| collision_index(&b.file_name).cmp(&collision_index(&a.file_name)))
            .then_with(|| b.file_name.cmp(&a.file_name))
    });
    Ok(entries)
}

fn to_entry(file: StoredFile, expire: chrono::Duration) -> GalleryEntry {
    let modified: DateTime<Local> = file.modified.into();
    let captured = parse_capture_timestamp(&file.file_name).unwrap_or(modified);
    let expires_at = modified
        .checked_add_signed(expire)
        .unwrap_or(modified);
    GalleryEntry {
        file_name: file.file_name,
        path: file.path,
        captured,
        modified,
        expires_at,
    }
}

/// Caption shown under each image.
pub fn caption(entry: &GalleryEntry) -> String {
    format!(
        "{} (expires {})",
        entry.file_name,
        entry.expires_at.format("%H:%M:%S")
    )
}

/// Render the gallery as a standalone HTML page.
///
/// Image sources are absolute paths so the page can be written anywhere.
pub fn render_html(entries: &[GalleryEntry]) -> Markup {
    html! {
        (DOCTYPE)
        html lang="ja" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Gallery" }
            }
            body {
                h1 { "Gallery" }
                @if entries.is_empty() {
                    p.empty { "No images have been uploaded yet." }
                } @else {
                    p.count { "Images: " (entries.len()) }
                    @for entry in entries {
                        figure {
                            img src=(image_src(entry)) alt=(entry.file_name) loading="lazy";
                            figcaption { (caption(entry)) }
                        }
                    }
                }
            }
        }
    }
}

fn image_src(entry: &GalleryEntry) -> String {
    let path = std::path::absolute(&entry.path).unwrap_or_else(|_| entry.path.clone());
    format!("file://{}", path.display())
}
