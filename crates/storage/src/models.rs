//! Storage models.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// Snapshot of one regular file found directly inside the source folder.
///
/// Taken once per run by [`SourceFolder::list`](crate::SourceFolder::list)
/// and never refreshed while the run is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// File name, lossily converted for display and log lines
    pub name: String,
    /// Absolute path in the source folder
    pub path: PathBuf,
    /// Final suffix only, lower-cased, without the leading dot
    pub extension: Option<String>,
    /// File size in bytes at scan time
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
}
impl FileRecord {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: OffsetDateTime) -> Self {
        let path = path.into();
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let extension = extension_of(&path);
        Self {
            name,
            path,
            extension,
            size,
            modified,
        }
    }

    /// The exact (possibly non-UTF8) file name, for building target paths.
    pub fn file_name(&self) -> &OsStr {
        self.path.file_name().unwrap_or_else(|| self.path.as_os_str())
    }
}

/// Lower-cased final suffix of a path. Dotfiles such as `.bashrc` have no
/// extension, and `archive.tar.gz` yields `gz`.
pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension().and_then(|ext| ext.to_str()).filter(|ext| !ext.is_empty()).map(str::to_lowercase)
}
