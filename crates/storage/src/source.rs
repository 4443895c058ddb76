//! The folder being backed up and swept.
//!
//! Only regular files directly inside the folder are ever considered.
//! Subdirectories are neither listed nor removed.

use crate::error::{ErrorKind, Result};
use crate::models::FileRecord;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::instrument;

/// A source folder that is known to exist at the time it was opened.
#[derive(Debug, Clone)]
pub struct SourceFolder {
    root: PathBuf,
}
impl SourceFolder {
    /// Opens the folder, failing with [`ErrorKind::NotFound`] when it is
    /// missing and [`ErrorKind::NotADirectory`] when it is something else.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let metadata = fs::metadata(&root).map_err(|e| ErrorKind::from_io(e, &root))?;
        if !metadata.is_dir() {
            exn::bail!(ErrorKind::NotADirectory(root));
        }
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Lists regular files directly inside the folder, in directory-listing
    /// order. Symlinks are followed when deciding whether an entry is a file.
    ///
    /// Entries that vanish or cannot be inspected between `read_dir` and
    /// `stat` are skipped with a warning rather than failing the listing.
    #[instrument(skip_all, fields(root = %self.root.display()))]
    pub fn list(&self) -> Result<Vec<FileRecord>> {
        let entries = fs::read_dir(&self.root).map_err(|e| ErrorKind::from_io(e, &self.root))?;
        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ErrorKind::from_io(e, &self.root))?;
            let path = entry.path();
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping entry that could not be inspected");
                    continue;
                },
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().map(OffsetDateTime::from).unwrap_or(OffsetDateTime::UNIX_EPOCH);
            records.push(FileRecord::new(path, metadata.len(), modified));
        }
        tracing::debug!(files = records.len(), "Source folder listed");
        Ok(records)
    }

    /// Removes one file from the folder and returns its size in bytes. The
    /// size is read immediately before removal.
    pub fn remove(&self, path: &Path) -> Result<u64> {
        if path.parent() != Some(self.root.as_path()) {
            exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
        }
        let size = fs::metadata(path).map_err(|e| ErrorKind::from_io(e, path))?.len();
        fs::remove_file(path).map_err(|e| ErrorKind::from_io(e, path))?;
        Ok(size)
    }
}
