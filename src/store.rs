//! Stored files: listing the upload and processed directories.
//!
//! Both directories are shared between concurrent uploads, gallery views, and
//! sweeps, with no locking. Any entry may disappear between the directory
//! read and the `stat`, so a vanished entry is skipped, never an error.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error listing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A regular file in one of the storage directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: PathBuf,
    pub file_name: String,
    pub modified: SystemTime,
}

impl StoredFile {
    /// Dotfiles are in-progress writes, never shown.
    pub fn is_hidden(&self) -> bool {
        self.file_name.starts_with('.')
    }
}

fn is_not_found(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}

/// Stat a listed entry. `None` when the file is already gone.
fn stored_file(entry: &walkdir::DirEntry) -> Result<Option<StoredFile>, StoreError> {
    let modified = match entry.metadata().map(|m| m.modified()) {
        Ok(Ok(modified)) => modified,
        Ok(Err(err)) => {
            return Err(StoreError::Io {
                path: entry.path().to_path_buf(),
                source: err,
            });
        }
        Err(err) if is_not_found(&err) => {
            debug!(path = %entry.path().display(), "File vanished before stat");
            return Ok(None);
        }
        Err(err) => {
            return Err(StoreError::Io {
                path: entry.path().to_path_buf(),
                source: err.into(),
            });
        }
    };

    Ok(Some(StoredFile {
        path: entry.path().to_path_buf(),
        file_name: entry.file_name().to_string_lossy().into_owned(),
        modified,
    }))
}

/// List regular files directly inside `dir`, in no particular order.
///
/// Subdirectories and symlinks are skipped. A missing directory lists as
/// empty. Entries removed mid-listing are skipped silently.
pub fn list_files(dir: &Path) -> Result<Vec<StoredFile>, StoreError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if is_not_found(&err) => {
                debug!(dir = %dir.display(), "Entry vanished during listing");
                continue;
            }
            Err(err) => {
                let path = err.path().unwrap_or(dir).to_path_buf();
                return Err(StoreError::Io {
                    path,
                    source: err.into(),
                });
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(file) = stored_file(&entry)? {
            files.push(file);
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(files: &[StoredFile]) -> Vec<&str> {
        let mut names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        names.sort();
        names
    }

    #[test]
    fn lists_regular_files_only() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.png"), b"a").unwrap();
        fs::write(tmp.path().join("b.jpg"), b"b").unwrap();
        fs::create_dir(tmp.path().join("processed")).unwrap();
        fs::write(tmp.path().join("processed/c.png"), b"c").unwrap();

        let files = list_files(tmp.path()).unwrap();
        assert_eq!(names(&files), vec!["a.png", "b.jpg"]);
    }

    #[test]
    fn includes_hidden_files_but_flags_them() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".x.png.partial"), b"x").unwrap();

        let files = list_files(tmp.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].is_hidden());
    }

    #[test]
    fn empty_directory_lists_nothing() {
        let tmp = TempDir::new().unwrap();
        assert!(list_files(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_lists_nothing() {
        let tmp = TempDir::new().unwrap();
        assert!(list_files(&tmp.path().join("gone")).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn file_removed_between_listing_and_stat_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.png");
        fs::write(&path, b"a").unwrap();
        let entry = WalkDir::new(tmp.path())
            .min_depth(1)
            .into_iter()
            .next()
            .unwrap()
            .unwrap();

        fs::remove_file(&path).unwrap();
        assert_eq!(stored_file(&entry).unwrap(), None);
    }

    #[test]
    fn records_modification_time() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.png");
        fs::write(&path, b"a").unwrap();
        let expected = fs::metadata(&path).unwrap().modified().unwrap();

        let files = list_files(tmp.path()).unwrap();
        assert_eq!(files[0].modified, expected);
        assert_eq!(files[0].path, path);
    }
}
