//! Retention sweeper: deletes stored files older than the expiry window.
//!
//! There is no background timer. The sweep runs opportunistically at the
//! start of every gallery view and after every upload, so a file outlives its
//! window only until the next request. The sweeper is the only code that
//! deletes from the storage directories.
//!
//! # Concurrency
//!
//! Several requests may sweep the same directories at the same moment. A file
//! that is already gone when we try to remove it was deleted by someone else;
//! it is counted as `vanished` and the sweep carries on. Any other I/O
//! failure (permissions, a read-only disk) stops the sweep and is returned,
//! so the request that triggered it fails visibly.

use crate::config::AppConfig;
use crate::store::{StoreError, list_files};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Error, Debug)]
pub enum RetentionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What a sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Files deleted by this sweep.
    pub removed: Vec<PathBuf>,
    /// Files still inside their window.
    pub kept: usize,
    /// Expired files that were already gone when we tried to delete them.
    pub vanished: usize,
}

impl SweepReport {
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.vanished == 0
    }
}

/// Age of a file at `now`; modification times in the future count as zero.
pub fn file_age(modified: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(modified).unwrap_or(Duration::ZERO)
}

/// Whether a file modified at `modified` is past its window at `now`.
///
/// Strictly greater: a file exactly `expire` old survives.
pub fn is_expired(modified: SystemTime, now: SystemTime, expire: Duration) -> bool {
    file_age(modified, now) > expire
}

/// Sweep the configured upload and processed directories.
pub fn cleanup_old_files(config: &AppConfig) -> Result<SweepReport, RetentionError> {
    sweep_dirs(
        &config.swept_dirs(),
        config.expire_after(),
        SystemTime::now(),
    )
}

/// Delete every regular file in `dirs` older than `expire` at `now`.
#[instrument(skip(dirs), fields(expire_secs = expire.as_secs()))]
pub fn sweep_dirs(
    dirs: &[&Path],
    expire: Duration,
    now: SystemTime,
) -> Result<SweepReport, RetentionError> {
    let mut report = SweepReport::default();

    for dir in dirs {
        for file in list_files(dir)? {
            if !is_expired(file.modified, now, expire) {
                report.kept += 1;
                continue;
            }
            match std::fs::remove_file(&file.path) {
                Ok(()) => {
                    info!(path = %file.path.display(), "Removed expired file");
                    report.removed.push(file.path);
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %file.path.display(), "Expired file already gone");
                    report.vanished += 1;
                }
                Err(source) => {
                    return Err(RetentionError::Delete {
                        path: file.path,
                        source,
                    });
                }
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{age_file, test_config};
    use std::fs;
    use tempfile::TempDir;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn age_and_expiry_boundaries() {
        let now = SystemTime::now();
        assert_eq!(file_age(now, now), Duration::ZERO);
        assert_eq!(file_age(now + HOUR, now), Duration::ZERO);
        assert!(!is_expired(now - HOUR, now, HOUR));
        assert!(is_expired(now - HOUR - Duration::from_secs(1), now, HOUR));
        assert!(!is_expired(now + HOUR * 5, now, HOUR));
    }

    #[test]
    fn young_files_are_kept() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        fs::write(config.storage.upload_dir.join("a.jpg"), b"a").unwrap();
        fs::write(config.storage.processed_dir.join("b.jpg"), b"b").unwrap();

        let report = cleanup_old_files(&config).unwrap();
        assert!(report.is_noop());
        assert_eq!(report.kept, 2);
        assert!(config.storage.upload_dir.join("a.jpg").exists());
        assert!(config.storage.processed_dir.join("b.jpg").exists());
    }

    #[test]
    fn old_files_are_removed_from_both_dirs() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        let raw = config.storage.upload_dir.join("a.jpg");
        let processed = config.storage.processed_dir.join("processed_a.jpg");
        fs::write(&raw, b"a").unwrap();
        fs::write(&processed, b"b").unwrap();
        age_file(&raw, config.expire_after() + Duration::from_secs(5));
        age_file(&processed, config.expire_after() + Duration::from_secs(5));

        let report = cleanup_old_files(&config).unwrap();
        assert_eq!(report.removed.len(), 2);
        assert!(!raw.exists());
        assert!(!processed.exists());
        // The processed subdirectory itself is never touched
        assert!(config.storage.processed_dir.is_dir());
    }

    #[test]
    fn only_expired_files_go() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        let old = config.storage.upload_dir.join("old.png");
        let new = config.storage.upload_dir.join("new.png");
        fs::write(&old, b"o").unwrap();
        fs::write(&new, b"n").unwrap();
        age_file(&old, config.expire_after() * 2);

        let report = cleanup_old_files(&config).unwrap();
        assert_eq!(report.removed, vec![old.clone()]);
        assert_eq!(report.kept, 1);
        assert!(new.exists());
    }

    #[test]
    fn sweep_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        let old = config.storage.upload_dir.join("old.png");
        fs::write(&old, b"o").unwrap();
        age_file(&old, config.expire_after() * 2);

        assert_eq!(cleanup_old_files(&config).unwrap().removed.len(), 1);
        let second = cleanup_old_files(&config).unwrap();
        assert!(second.is_noop());
        assert_eq!(second.kept, 0);
    }

    #[test]
    fn empty_and_missing_dirs_are_fine() {
        let tmp = TempDir::new().unwrap();
        let empty = tmp.path().join("empty");
        fs::create_dir(&empty).unwrap();
        let missing = tmp.path().join("missing");

        let report = sweep_dirs(&[empty.as_path(), missing.as_path()], HOUR, SystemTime::now()).unwrap();
        assert_eq!(report, SweepReport::default());
    }

    #[test]
    fn injected_clock_decides_expiry() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.png");
        fs::write(&path, b"a").unwrap();

        let later = SystemTime::now() + HOUR * 2;
        let report = sweep_dirs(&[tmp.path()], HOUR, later).unwrap();
        assert_eq!(report.removed, vec![path.clone()]);
        assert!(!path.exists());
    }

    #[test]
    fn concurrent_sweeps_do_not_fail() {
        let tmp = TempDir::new().unwrap();
        for i in 0..50 {
            fs::write(tmp.path().join(format!("{i:03}.png")), b"x").unwrap();
        }
        let later = SystemTime::now() + HOUR * 2;
        let dir = tmp.path().to_path_buf();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let dir = dir.clone();
                std::thread::spawn(move || sweep_dirs(&[dir.as_path()], HOUR, later))
            })
            .collect();
        let reports: Vec<SweepReport> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();

        let removed: usize = reports.iter().map(|r| r.removed.len()).sum();
        assert_eq!(removed, 50);
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }
}
