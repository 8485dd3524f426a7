//! Directory listing collaborator shared by plugin discovery and navigation.

use std::fs;
use std::io;
use std::path::Path;

/// Source of directory entries.
///
/// Implementations return the names of regular files directly inside `dir`,
/// in no particular order. Callers do their own filtering and sorting.
pub trait DirectoryListing {
    /// List regular file names in `dir`.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>>;
}

impl<T: DirectoryListing + ?Sized> DirectoryListing for &T {
    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>> {
        (**self).list_files(dir)
    }
}

/// Listing backed by the real filesystem.
///
/// Symlinks are followed; entries whose names are not valid UTF-8 are
/// skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsListing;

impl DirectoryListing for FsListing {
    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let is_file = fs::metadata(entry.path())
                .map(|m| m.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => {
                    tracing::debug!(name = ?name, "skipping non UTF-8 file name");
                }
            }
        }
        Ok(names)
    }
}

/// Whether `name` ends in `.ext`, comparing the extension without case.
pub(crate) fn has_extension(name: &str, ext: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, found)) => !stem.is_empty() && found.eq_ignore_ascii_case(ext),
        None => false,
    }
}
