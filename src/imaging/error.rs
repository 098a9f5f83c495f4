use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompositeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("Source image {0} has zero width or height")]
    EmptySource(PathBuf),
    #[error("No decoder available for {0} (HEIC/HEIF support is not compiled in)")]
    DecoderUnavailable(PathBuf),
    #[error("Unsupported output format: {0}")]
    UnsupportedOutput(String),
    #[error("Failed to encode {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
}
