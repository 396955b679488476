//! Directory scanning.
//!
//! Every batch starts by listing the image files directly inside one folder.
//! Subdirectories are never entered, and only files whose extension (compared
//! case-insensitively) belongs to the operation's image set are returned:
//!
//! | Set | Extensions | Used by |
//! |---|---|---|
//! | [`ImageSet::Document`] | png, jpg, jpeg, bmp, gif | PDF, resize |
//! | [`ImageSet::Conversion`] | png, jpg, jpeg | grayscale, black-and-white |
//!
//! ## Ordering
//!
//! Results come back in filesystem listing order, which is *not* guaranteed
//! to be alphabetical. PDF page order follows it. Pass `sort_by_name` (the
//! `scan.sort_by_name` config key) for a reproducible order.

use crate::naming::has_extension;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub const DOCUMENT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];
pub const CONVERSION_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("The specified directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which extension filter a scan applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSet {
    Document,
    Conversion,
}

impl ImageSet {
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageSet::Document => DOCUMENT_EXTENSIONS,
            ImageSet::Conversion => CONVERSION_EXTENSIONS,
        }
    }
}

/// Check that `dir` exists and is a directory.
pub fn validate_directory(dir: &Path) -> Result<(), ScanError> {
    if !dir.exists() {
        return Err(ScanError::DirectoryNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }
    Ok(())
}

/// List image files directly inside `dir`.
///
/// Entries that cannot be read (e.g. dangling symlinks) are logged and
/// skipped rather than failing the scan.
pub fn scan_images(dir: &Path, set: ImageSet, sort_by_name: bool) -> Result<Vec<PathBuf>, ScanError> {
    validate_directory(dir)?;

    let walker = WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true);
    let walker = if sort_by_name {
        walker.sort_by_file_name()
    } else {
        walker
    };

    let mut images = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(ScanError::Io(e.into())),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        if entry.file_type().is_file() && has_extension(entry.path(), set.extensions()) {
            images.push(entry.into_path());
        }
    }

    tracing::debug!(dir = %dir.display(), count = images.len(), "Scanned directory");
    Ok(images)
}
