//! Routes a request to the upload or gallery flow.
//!
//! This is the hosting layer's single entry point. It owns the one limit the
//! flows themselves don't enforce: the upload size cap.

use crate::config::AppConfig;
use crate::gallery::{self, GalleryError, GalleryView};
use crate::imaging::DecoderSupport;
use crate::upload::{self, UploadError, UploadOutcome, UploadRequest};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Upload is {size} bytes, larger than the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Gallery(#[from] GalleryError),
}

/// Which page a request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Upload,
    Gallery,
}

#[derive(Debug, Clone)]
pub enum Request {
    Upload(UploadRequest),
    Gallery { passcode: String },
}

impl Request {
    pub fn mode(&self) -> Mode {
        match self {
            Request::Upload(_) => Mode::Upload,
            Request::Gallery { .. } => Mode::Gallery,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Response {
    Upload(UploadOutcome),
    Gallery(GalleryView),
}

/// Everything resolved once at startup and shared by every request.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: AppConfig,
    pub decoders: DecoderSupport,
}

impl Context {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            decoders: DecoderSupport::detect(),
        }
    }
}

pub fn dispatch(request: &Request, ctx: &Context) -> Result<Response, DispatchError> {
    debug!(mode = ?request.mode(), "Dispatching");
    match request {
        Request::Upload(upload) => {
            check_size(upload, &ctx.config)?;
            let outcome = upload::upload(upload, &ctx.config, &ctx.decoders)?;
            Ok(Response::Upload(outcome))
        }
        Request::Gallery { passcode } => {
            let view = gallery::view(passcode, &ctx.config)?;
            Ok(Response::Gallery(view))
        }
    }
}

fn check_size(request: &UploadRequest, config: &AppConfig) -> Result<(), DispatchError> {
    let size = request.bytes.len() as u64;
    let limit = config.max_upload_bytes();
    if size > limit {
        warn!(size, limit, "Upload rejected: too large");
        return Err(DispatchError::TooLarge { size, limit });
    }
    Ok(())
}
