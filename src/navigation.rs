//! Directory-ordered navigation between sibling images.
//!
//! The listing is recomputed on every call: files may appear, vanish or be
//! renamed between two navigation requests and nothing is cached.

use crate::error::Result;
use crate::format::ImageFormat;
use crate::listing::{DirectoryListing, FsListing, has_extension};
use std::path::{Path, PathBuf};

/// Result of asking for a neighboring image.
///
/// Only `Path` moves the session; the other variants are boundary signals
/// surfaced to the user as notices, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Neighbor {
    /// The neighboring file.
    Path(PathBuf),
    /// The current file is the first one.
    AtStart,
    /// The current file is the last one.
    AtEnd,
    /// The current file is no longer in its directory.
    NotFound,
}

/// Boundary reached while navigating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// No earlier image.
    AtStart,
    /// No later image.
    AtEnd,
    /// The current image vanished from the listing.
    NotFound,
}

impl Boundary {
    /// Short machine-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::AtStart => "at_start",
            Self::AtEnd => "at_end",
            Self::NotFound => "not_found",
        }
    }
}

impl std::fmt::Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let notice = match self {
            Self::AtStart => "Current image is the first one.",
            Self::AtEnd => "Current image is the last one.",
            Self::NotFound => "Current image is no longer in its directory.",
        };
        f.write_str(notice)
    }
}

impl Neighbor {
    /// Split into a path or a boundary.
    pub fn into_result(self) -> std::result::Result<PathBuf, Boundary> {
        match self {
            Self::Path(path) => Ok(path),
            Self::AtStart => Err(Boundary::AtStart),
            Self::AtEnd => Err(Boundary::AtEnd),
            Self::NotFound => Err(Boundary::NotFound),
        }
    }
}

/// Computes sibling listings and neighbors of an image file.
#[derive(Debug, Clone, Default)]
pub struct NavigationIndex<L = FsListing> {
    listing: L,
}

impl NavigationIndex<FsListing> {
    /// Index over the real filesystem.
    pub fn new() -> Self {
        Self { listing: FsListing }
    }
}

impl<L: DirectoryListing> NavigationIndex<L> {
    /// Index over a custom directory listing.
    pub fn with_listing(listing: L) -> Self {
        Self { listing }
    }

    /// Image files next to `path`, including itself if it still exists.
    ///
    /// Only names ending in png, bmp or jpg (any case) are kept. The result
    /// is sorted by case-sensitive byte-wise comparison of file names.
    pub fn list_siblings(&self, path: &Path) -> Result<Vec<String>> {
        let dir = parent_dir(path);
        let mut names = self.listing.list_files(dir)?;
        names.retain(|name| {
            ImageFormat::ALL
                .iter()
                .any(|format| has_extension(name, format.extension()))
        });
        names.sort();
        Ok(names)
    }

    /// The image before `path` in directory order.
    pub fn predecessor(&self, path: &Path) -> Result<Neighbor> {
        self.neighbor(path, Direction::Previous)
    }

    /// The image after `path` in directory order.
    pub fn successor(&self, path: &Path) -> Result<Neighbor> {
        self.neighbor(path, Direction::Next)
    }

    fn neighbor(&self, path: &Path, direction: Direction) -> Result<Neighbor> {
        let Some(current) = path.file_name().and_then(|name| name.to_str()) else {
            return Ok(Neighbor::NotFound);
        };
        let names = self.list_siblings(path)?;
        let Some(index) = names.iter().position(|name| name == current) else {
            return Ok(Neighbor::NotFound);
        };

        let target = match direction {
            Direction::Previous if index == 0 => return Ok(Neighbor::AtStart),
            Direction::Previous => index - 1,
            Direction::Next if index + 1 == names.len() => return Ok(Neighbor::AtEnd),
            Direction::Next => index + 1,
        };
        Ok(Neighbor::Path(parent_dir(path).join(&names[target])))
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Previous,
    Next,
}

/// Directory containing `path`; a bare file name lives in `.`.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
