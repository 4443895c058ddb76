//! Local filesystem destination backend.
//!
//! Files are stored below a configured root directory, which is created
//! lazily on the first write so that an unreachable destination surfaces as a
//! per-file copy failure instead of preventing the run from starting.

use crate::error::{ErrorKind, Result};
use crate::{StorageBackend, path::validate as validate_path};
use std::fs::{self, File, FileTimes, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Local filesystem destination backend.
///
/// # Examples
///
/// ```no_run
/// use sweep_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("Primary", "/mnt/backups/2025/2025-03-14_Backup_Descargas")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        Ok(Self { name: name.into(), root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the absolute path for a relative storage path.
    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    /// Byte copy into a freshly created file, then carry the source's
    /// permission bits and timestamps across.
    fn copy_contents(source: &Path, target: &Path) -> Result<u64> {
        let mut reader = File::open(source).map_err(|e| ErrorKind::from_io(e, source))?;
        let metadata = reader.metadata().map_err(|e| ErrorKind::from_io(e, source))?;
        let mut writer = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(target)
            .map_err(|e| ErrorKind::from_io(e, target))?;
        let bytes = io::copy(&mut reader, &mut writer).map_err(|e| ErrorKind::from_io(e, target))?;

        let mut times = FileTimes::new();
        if let Ok(accessed) = metadata.accessed() {
            times = times.set_accessed(accessed);
        }
        if let Ok(modified) = metadata.modified() {
            times = times.set_modified(modified);
        }
        writer.set_times(times).map_err(|e| ErrorKind::from_io(e, target))?;
        writer.set_permissions(metadata.permissions()).map_err(|e| ErrorKind::from_io(e, target))?;
        Ok(bytes)
    }
}

impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn locate(&self, path: &Path) -> Result<PathBuf> {
        self.absolute_path(path)
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        let abs_path = self.absolute_path(path)?;
        Ok(abs_path.try_exists().map_err(|e| ErrorKind::from_io(e, &abs_path))?)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::create_dir_all(&abs_path).map_err(|e| ErrorKind::from_io(e, &abs_path))?)
    }

    fn copy_from(&self, source: &Path, target: &Path) -> Result<u64> {
        let abs_target = self.absolute_path(target)?;
        let bytes = Self::copy_contents(source, &abs_target)?;
        tracing::trace!(backend = %self.name, source = %source.display(), target = %abs_target.display(), bytes, "File copied");
        Ok(bytes)
    }
}
