//! # Rikoten
//!
//! An event photo booth. Visitors upload a photo, which is turned into a
//! four-fold ring collage; an operator browses the collages in a
//! passcode-protected gallery. Everything is deleted after a fixed window.
//!
//! # Architecture: Two Flows Over Two Directories
//!
//! ```text
//! upload   photo  →  uploads/             (raw, as received)
//!                 →  uploads/processed/   (1200×1200 ring composite)
//! gallery  passcode  →  sweep  →  list uploads/processed/ newest first
//! ```
//!
//! Both flows run the retention sweep, so there is no background timer and
//! no database: the filesystem is the only state, and file modification
//! times are the only clock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | The compositor: decode, fit, rotate, place, draw the marker, encode |
//! | [`upload`] | Upload flow: validate, name, store, composite, sweep |
//! | [`gallery`] | Gallery flow: authenticate, sweep, list, render HTML |
//! | [`dispatch`] | Routes requests to a flow; enforces the upload size limit |
//! | [`retention`] | Age-based sweeper over both storage directories |
//! | [`store`] | Directory listing that tolerates concurrent deletion |
//! | [`naming`] | Timestamped, collision-free file names |
//! | [`config`] | `rikoten.toml` loading, defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Fixed Geometry
//!
//! Every composite is a 1200×1200 canvas with four copies on a ring of
//! radius 330, rotated 0°, 90°, 180° and 270° clockwise. The constants live in
//! [`imaging::CompositeParams`] so tests can shrink them, but the booth
//! always uses the defaults.
//!
//! ## Explicit Capture-Time Ordering
//!
//! The gallery orders by the capture timestamp embedded in each file name,
//! not by directory order or raw string comparison. See
//! [`naming::parse_capture_timestamp`].
//!
//! ## Optional HEIC
//!
//! HEIC/HEIF decoding needs the system `libheif` and is behind the `heif`
//! cargo feature. Builds without it reject those uploads up front, before
//! anything is written.

pub mod config;
pub mod dispatch;
pub mod gallery;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod retention;
pub mod store;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;
