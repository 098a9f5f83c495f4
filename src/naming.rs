//! File naming for uploads and composites.
//!
//! Every upload produces two files sharing one timestamp and stem:
//!
//! ```text
//! uploads/20261017_143005_My_Photo.heic
//! uploads/processed/processed_20261017_143005_My_Photo.png
//! ```
//!
//! - The timestamp (`YYYYMMDD_HHMMSS`, local time) is the capture time and
//!   the gallery's sort key; [`parse_capture_timestamp`] reads it back.
//! - The stem is the uploaded file's name with path components dropped and
//!   whitespace and filesystem-reserved characters replaced by `_`.
//! - The processed extension matches the source, except HEIC/HEIF which
//!   becomes `png`.
//!
//! Two uploads of the same name in the same second get a `-2`, `-3`, …
//! suffix on the stem (see [`UploadNames::with_suffix`]); the upload flow
//! picks the suffix by atomically creating the raw file.

use crate::imaging::is_heif_extension;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Prefix of every composite file name.
pub const PROCESSED_PREFIX: &str = "processed_";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TIMESTAMP_LEN: usize = 15;

/// Format a capture timestamp as `YYYYMMDD_HHMMSS`.
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Final path component of an uploaded file name, whichever separator the
/// client used.
fn base_name(original: &str) -> &str {
    original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
}

/// Lowercase extension of an uploaded file name, without the dot.
///
/// Dotfiles without a further dot (`.png`) have no extension.
pub fn extension_of(original: &str) -> String {
    let name = base_name(original);
    match name.rfind('.') {
        Some(0) | None => String::new(),
        Some(dot) => name[dot + 1..].to_lowercase(),
    }
}

/// Safe file stem for an uploaded file name.
///
/// - `"My Photo.JPG"` → `"My_Photo"`
/// - `"../../etc/passwd.png"` → `"passwd"`
/// - `"C:\\Users\\me\\旅行 写真.heic"` → `"旅行_写真"`
/// - `".png"` or `""` → `"image"`
pub fn sanitize_stem(original: &str) -> String {
    let name = base_name(original);
    let stem = match name.rfind('.') {
        // ".png": the whole name is an extension
        Some(0) => "",
        None => name,
        Some(dot) => &name[..dot],
    };

    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_whitespace() || c.is_control() || matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|')
            {
                '_'
            } else {
                c
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

/// The pair of file names produced by one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadNames {
    pub timestamp: String,
    pub stem: String,
    /// Lowercase source extension.
    pub ext: String,
    pub raw_filename: String,
    pub processed_filename: String,
}

impl UploadNames {
    pub fn new(timestamp: &str, stem: &str, ext: &str) -> Self {
        let ext = ext.to_lowercase();
        let processed_ext = processed_extension(&ext);
        Self {
            raw_filename: format!("{timestamp}_{stem}.{ext}"),
            processed_filename: format!("{PROCESSED_PREFIX}{timestamp}_{stem}.{processed_ext}"),
            timestamp: timestamp.to_string(),
            stem: stem.to_string(),
            ext,
        }
    }

    /// Names for an upload captured `at`, from the client's file name.
    pub fn for_upload<Tz: TimeZone>(original: &str, at: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self::new(
            &format_timestamp(at),
            &sanitize_stem(original),
            &extension_of(original),
        )
    }

    /// The `n`th collision variant: `n = 1` is the plain name, `n >= 2`
    /// appends `-n` to the stem of both files.
    pub fn with_suffix(&self, n: u32) -> Self {
        if n <= 1 {
            return self.clone();
        }
        Self::new(&self.timestamp, &format!("{}-{n}", self.stem), &self.ext)
    }
}

/// Composite extension for a source extension: HEIC/HEIF become `png`.
pub fn processed_extension(ext: &str) -> String {
    if is_heif_extension(ext) {
        "png".to_string()
    } else {
        ext.to_lowercase()
    }
}

/// Recover the capture timestamp from a raw or processed file name.
///
/// Returns `None` for names that don't follow the naming scheme.
pub fn parse_capture_timestamp(file_name: &str) -> Option<DateTime<Local>> {
    let rest = file_name.strip_prefix(PROCESSED_PREFIX).unwrap_or(file_name);
    let stamp = rest.get(..TIMESTAMP_LEN)?;
    if rest.len() > TIMESTAMP_LEN && !rest[TIMESTAMP_LEN..].starts_with('_') {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
    Local.from_local_datetime(&naive).earliest()
}

/// Collision index of a file name: `n` for a `-n` stem suffix, 1 otherwise.
///
/// Orders same-second uploads that share a stem; see [`UploadNames::with_suffix`].
pub fn collision_index(file_name: &str) -> u32 {
    let stem = match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    };
    stem.rsplit_once('-')
        .and_then(|(_, n)| {
            if n.is_empty() || !n.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            n.parse::<u32>().ok()
        })
        .filter(|&n| n >= 2)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Local> {
        let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        Local.from_local_datetime(&naive).earliest().unwrap()
    }

    // =========================================================================
    // sanitize_stem / extension_of
    // =========================================================================

    #[test]
    fn stem_spaces_become_underscores() {
        assert_eq!(sanitize_stem("My Photo.JPG"), "My_Photo");
    }

    #[test]
    fn stem_drops_directories() {
        assert_eq!(sanitize_stem("../../etc/passwd.png"), "passwd");
        assert_eq!(sanitize_stem("C:\\Users\\me\\shot.jpg"), "shot");
    }

    #[test]
    fn stem_keeps_unicode() {
        assert_eq!(sanitize_stem("旅行 写真.heic"), "旅行_写真");
    }

    #[test]
    fn stem_replaces_reserved_characters() {
        assert_eq!(sanitize_stem("a:b*c?d\"e<f>g|h.png"), "a_b_c_d_e_f_g_h");
    }

    #[test]
    fn stem_keeps_inner_dots() {
        assert_eq!(sanitize_stem("IMG.0001.final.jpeg"), "IMG.0001.final");
    }

    #[test]
    fn stem_fallback_for_empty_names() {
        assert_eq!(sanitize_stem(".png"), "image");
        assert_eq!(sanitize_stem(""), "image");
        assert_eq!(sanitize_stem("uploads/"), "image");
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(extension_of("a.JPG"), "jpg");
        assert_eq!(extension_of("dir.v2/IMG_1.HeIc"), "heic");
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of(".png"), "");
    }

    // =========================================================================
    // UploadNames
    // =========================================================================

    #[test]
    fn names_share_timestamp_and_stem() {
        let names = UploadNames::for_upload("My Photo.JPG", &at("2026-10-17 14:30:05"));
        assert_eq!(names.timestamp, "20261017_143005");
        assert_eq!(names.raw_filename, "20261017_143005_My_Photo.jpg");
        assert_eq!(
            names.processed_filename,
            "processed_20261017_143005_My_Photo.jpg"
        );
    }

    #[test]
    fn heif_composites_become_png() {
        let names = UploadNames::new("20261017_143005", "shot", "HEIC");
        assert_eq!(names.raw_filename, "20261017_143005_shot.heic");
        assert_eq!(names.processed_filename, "processed_20261017_143005_shot.png");
        assert_eq!(processed_extension("heif"), "png");
        assert_eq!(processed_extension("jpeg"), "jpeg");
    }

    #[test]
    fn suffix_disambiguates_both_names() {
        let names = UploadNames::new("20261017_143005", "shot", "png");
        assert_eq!(names.with_suffix(1), names);
        let second = names.with_suffix(2);
        assert_eq!(second.raw_filename, "20261017_143005_shot-2.png");
        assert_eq!(second.processed_filename, "processed_20261017_143005_shot-2.png");
    }

    // =========================================================================
    // parse_capture_timestamp
    // =========================================================================

    #[test]
    fn timestamp_round_trips_through_names() {
        let when = at("2026-10-17 09:05:59");
        let names = UploadNames::for_upload("a.png", &when);
        assert_eq!(parse_capture_timestamp(&names.raw_filename), Some(when));
        assert_eq!(parse_capture_timestamp(&names.processed_filename), Some(when));
    }

    #[test]
    fn collision_index_reads_numeric_suffix() {
        assert_eq!(collision_index("processed_20261017_143005_shot.png"), 1);
        assert_eq!(collision_index("processed_20261017_143005_shot-2.png"), 2);
        assert_eq!(collision_index("processed_20261017_143005_shot-10.png"), 10);
        assert_eq!(collision_index("20261017_143005_my-photo.jpg"), 1);
        assert_eq!(collision_index("shot-.png"), 1);
        assert_eq!(collision_index("shot-1.png"), 1);
        assert_eq!(collision_index("noext-3"), 3);
    }

    #[test]
    fn collision_index_follows_with_suffix() {
        let names = UploadNames::new("20261017_143005", "shot", "png");
        for n in 1..=12 {
            assert_eq!(collision_index(&names.with_suffix(n).processed_filename), n);
        }
    }

    #[test]
    fn timestamp_missing_or_malformed() {
        assert_eq!(parse_capture_timestamp("holiday.png"), None);
        assert_eq!(parse_capture_timestamp("processed_.png"), None);
        assert_eq!(parse_capture_timestamp("20261317_143005_a.png"), None);
        assert_eq!(parse_capture_timestamp("20261017_1430059_a.png"), None);
    }
}
