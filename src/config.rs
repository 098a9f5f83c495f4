//! Application configuration.
//!
//! Loaded once at startup from a TOML file (default `rikoten.toml` in the
//! working directory), never mutated afterwards, and passed by reference into
//! every flow. Tests build alternate configurations directly.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [storage]
//! upload_dir = "uploads"                # Raw originals
//! processed_dir = "uploads/processed"   # Composites shown in the gallery
//!
//! [retention]
//! expire_seconds = 3600     # Files older than this are swept
//!
//! [upload]
//! max_upload_mb = 30        # Largest accepted upload
//!
//! [admin]
//! passcode = "..."          # Gallery passcode; no default
//! ```
//!
//! ## The Passcode
//!
//! There is deliberately no built-in passcode. Set it in the config file or
//! in the `RIKOTEN_ADMIN_PASS` environment variable (which wins). Without
//! one the gallery refuses every request.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable that overrides `admin.passcode`.
pub const PASSCODE_ENV: &str = "RIKOTEN_ADMIN_PASS";

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "rikoten.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `rikoten.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Where raw uploads and composites live.
    pub storage: StorageConfig,
    /// How long files survive.
    pub retention: RetentionConfig,
    /// Upload limits enforced by the hosting layer.
    pub upload: UploadConfig,
    /// Gallery access.
    pub admin: AdminConfig,
}

/// Directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub processed_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            processed_dir: PathBuf::from("uploads/processed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetentionConfig {
    /// Age in seconds after which a stored file is deleted.
    pub expire_seconds: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            expire_seconds: 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    pub max_upload_mb: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { max_upload_mb: 30 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdminConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passcode: Option<String>,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retention.expire_seconds == 0 {
            return Err(ConfigError::Validation(
                "retention.expire_seconds must be greater than 0".into(),
            ));
        }
        if self.upload.max_upload_mb == 0 {
            return Err(ConfigError::Validation(
                "upload.max_upload_mb must be greater than 0".into(),
            ));
        }
        if self.admin.passcode.as_deref() == Some("") {
            return Err(ConfigError::Validation(
                "admin.passcode must not be empty".into(),
            ));
        }
        if self.storage.upload_dir.as_os_str().is_empty()
            || self.storage.processed_dir.as_os_str().is_empty()
        {
            return Err(ConfigError::Validation(
                "storage directories must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn expire_after(&self) -> Duration {
        Duration::from_secs(self.retention.expire_seconds)
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.upload.max_upload_mb.saturating_mul(1024 * 1024)
    }

    /// The two swept directories: raw uploads first, then composites.
    pub fn swept_dirs(&self) -> [&Path; 2] {
        [
            self.storage.upload_dir.as_path(),
            self.storage.processed_dir.as_path(),
        ]
    }

    /// Create both storage directories if absent.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.storage.upload_dir)?;
        fs::create_dir_all(&self.storage.processed_dir)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay and a passcode override onto the defaults, then
/// deserialize and validate.
pub fn resolve_config(
    overlay: Option<toml::Value>,
    passcode_override: Option<String>,
) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let mut config: AppConfig = merged.try_into()?;
    if let Some(passcode) = passcode_override {
        config.admin.passcode = Some(passcode);
    }
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`, falling back to stock defaults when it is
/// missing, and apply the `RIKOTEN_ADMIN_PASS` override.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    resolve_config(overlay, std::env::var(PASSCODE_ENV).ok())
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Rikoten Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
[storage]
# Raw uploads, exactly as received.
upload_dir = "uploads"
# Ring composites shown in the gallery.
processed_dir = "uploads/processed"

# ---------------------------------------------------------------------------
# Retention
# ---------------------------------------------------------------------------
[retention]
# Files older than this many seconds are deleted whenever an upload or a
# gallery view runs. There is no background timer.
expire_seconds = 3600

# ---------------------------------------------------------------------------
# Upload
# ---------------------------------------------------------------------------
[upload]
# Largest accepted upload, in megabytes.
max_upload_mb = 30

# ---------------------------------------------------------------------------
# Admin
# ---------------------------------------------------------------------------
[admin]
# Passcode for the gallery. There is no default; prefer setting it through
# the RIKOTEN_ADMIN_PASS environment variable so it stays out of the file.
# passcode = "change-me"
"##
}
