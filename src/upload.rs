//! Upload flow: accept a photo, composite it, sweep old files.
//!
//! ```text
//! validate extension ──► reserve names ──► write raw ──► composite ──► sweep
//!        │                                                  │
//!        └─ rejected: nothing written                       └─ failed: raw removed, sweep still runs
//! ```
//!
//! Extension checks happen before anything touches the disk, so a rejected
//! upload leaves both directories untouched. The raw file name is reserved
//! with `create_new`, which makes the same-second collision check atomic
//! across concurrent uploads.

use crate::config::AppConfig;
use crate::imaging::{CompositeError, DecoderSupport, is_heif_extension, is_supported_extension, process_image};
use crate::naming::{UploadNames, extension_of};
use crate::retention::{RetentionError, SweepReport, cleanup_old_files};
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Highest collision suffix tried before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Unsupported file type '{ext}'. Supported: {supported}")]
    UnsupportedFormat { ext: String, supported: String },
    #[error("HEIC/HEIF uploads need the optional HEIF decoder, which this build does not include")]
    HeifUnavailable,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Could not find a free file name for {0}")]
    NameExhausted(String),
    #[error("Image processing failed: {0}")]
    Composite(#[from] CompositeError),
    #[error("Cleanup failed: {0}")]
    Retention(#[from] RetentionError),
}

/// An incoming upload: the client's file name and the raw bytes.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Where an accepted upload ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub raw_path: PathBuf,
    pub processed_path: PathBuf,
    pub sweep: SweepReport,
}

/// Check the client's file name against what this build can decode.
pub fn validate_extension(file_name: &str, decoders: &DecoderSupport) -> Result<String, UploadError> {
    let ext = extension_of(file_name);
    if !is_supported_extension(&ext) {
        let supported = decoders
            .accepted_extensions()
            .iter()
            .map(|e| e.to_uppercase())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(UploadError::UnsupportedFormat { ext, supported });
    }
    if is_heif_extension(&ext) && !decoders.heif_available() {
        return Err(UploadError::HeifUnavailable);
    }
    Ok(ext)
}

/// Accept an upload captured now.
pub fn upload(
    request: &UploadRequest,
    config: &AppConfig,
    decoders: &DecoderSupport,
) -> Result<UploadOutcome, UploadError> {
    upload_at(request, config, decoders, Local::now())
}

/// Accept an upload captured at `now`.
#[instrument(skip(request, config, decoders), fields(file_name = %request.file_name, bytes = request.bytes.len()))]
pub fn upload_at(
    request: &UploadRequest,
    config: &AppConfig,
    decoders: &DecoderSupport,
    now: DateTime<Local>,
) -> Result<UploadOutcome, UploadError> {
    validate_extension(&request.file_name, decoders)?;
    config.ensure_dirs()?;

    let names = UploadNames::for_upload(&request.file_name, &now);
    let (names, mut file) = reserve(&names, config)?;
    let raw_path = config.storage.upload_dir.join(&names.raw_filename);
    let processed_path = config.storage.processed_dir.join(&names.processed_filename);

    file.write_all(&request.bytes)?;
    file.sync_all()?;
    drop(file);
    info!(path = %raw_path.display(), "Upload stored");

    if let Err(err) = process_image(&raw_path, &processed_path) {
        warn!(error = %err, "Composite failed, discarding raw upload");
        discard(&raw_path);
        if let Err(sweep_err) = cleanup_old_files(config) {
            warn!(error = %sweep_err, "Cleanup after failed composite also failed");
        }
        return Err(err.into());
    }

    let sweep = cleanup_old_files(config)?;
    Ok(UploadOutcome {
        raw_path,
        processed_path,
        sweep,
    })
}

/// Claim the first free name variant by creating the raw file exclusively.
fn reserve(names: &UploadNames, config: &AppConfig) -> Result<(UploadNames, File), UploadError> {
    for n in 1..=MAX_NAME_ATTEMPTS {
        let candidate = names.with_suffix(n);
        if config
            .storage
            .processed_dir
            .join(&candidate.processed_filename)
            .exists()
        {
            continue;
        }
        let raw = config.storage.upload_dir.join(&candidate.raw_filename);
        match create_exclusive(&raw) {
            Ok(file) => return Ok((candidate, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Err(UploadError::NameExhausted(names.raw_filename.clone()))
}

/// Remove a raw upload that never got a composite.
fn discard(raw_path: &Path) {
    match std::fs::remove_file(raw_path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!(path = %raw_path.display(), error = %err, "Could not remove raw upload"),
    }
}

fn create_exclusive(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}
