//! Path classification
//!
//! Decides what a scan path is before any network activity happens.
//! Catalog predicates are consulted in order (known game, known library,
//! excluded) and only then is the directory listed.

use crate::catalog::Catalog;
use crate::error::{ScanError, ScanResult};
use crate::models::PathClassification;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Immediate contents of a directory, as relevant for classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    /// Child directories sorted by file name (symlinks resolved)
    pub subdirectories: Vec<PathBuf>,
    /// At least one regular file sits directly inside
    pub has_regular_files: bool,
}

impl DirectoryListing {
    /// Sub-directories only, no regular files
    pub fn is_library_shaped(&self) -> bool {
        !self.subdirectories.is_empty() && !self.has_regular_files
    }
}

/// List the immediate children of `path`
///
/// Symlinks count as whatever they point to; dangling links are ignored.
/// A path that is not a directory lists as empty.
pub fn list_directory(path: &Path) -> io::Result<DirectoryListing> {
    let mut listing = DirectoryListing::default();

    let walker = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        let file_type = entry.file_type();

        let (is_dir, is_file) = if file_type.is_symlink() {
            match std::fs::metadata(entry.path()) {
                Ok(target) => (target.is_dir(), target.is_file()),
                Err(e) => {
                    tracing::debug!(path = %entry.path().display(), error = %e, "Ignoring dangling symlink");
                    continue;
                }
            }
        } else {
            (file_type.is_dir(), file_type.is_file())
        };

        if is_dir {
            listing.subdirectories.push(entry.into_path());
        } else if is_file {
            listing.has_regular_files = true;
        }
    }

    Ok(listing)
}

/// Classify one scan path; first matching rule wins
pub async fn classify_path(path: &Path, catalog: &dyn Catalog) -> ScanResult<PathClassification> {
    if catalog.is_known_game(path).await? {
        return Ok(PathClassification::AlreadyGame);
    }
    if catalog.is_known_library(path).await? {
        return Ok(PathClassification::AlreadyLibrary);
    }
    if catalog.is_excluded(path).await? {
        return Ok(PathClassification::Excluded);
    }

    let owned = path.to_path_buf();
    let listing = tokio::task::spawn_blocking(move || list_directory(&owned))
        .await
        .map_err(|e| ScanError::Filesystem {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::Other, e),
        })?
        .map_err(|source| ScanError::Filesystem {
            path: path.to_path_buf(),
            source,
        })?;

    if listing.is_library_shaped() {
        Ok(PathClassification::LibraryCandidate {
            children: listing.subdirectories,
        })
    } else {
        Ok(PathClassification::GameCandidate)
    }
}
