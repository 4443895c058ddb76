//! Destination backend trait and implementations.
//!
//! A destination is a named root under which relative `{category}/{filename}`
//! paths are created. The pipeline only ever adds files to a destination; it
//! never reads back, renames, or removes anything it wrote.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Unified interface for destination backends.
///
/// All paths are relative to the backend root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations should
/// enforce this validation.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use sweep_storage::{backend::StorageBackend, error::Result};
///
/// fn copy_if_absent(backend: &dyn StorageBackend, source: &Path) -> Result<bool> {
///     let target = Path::new("Otros/notes.txt");
///     if backend.exists(target)? {
///         return Ok(false);
///     }
///     backend.create_dir_all(Path::new("Otros"))?;
///     backend.copy_from(source, target)?;
///     Ok(true)
/// }
/// ```
pub trait StorageBackend {
    /// Label of the destination, used in log lines and error strings
    /// (e.g. `"Primary"`).
    fn name(&self) -> &str;

    /// Absolute location of a relative path, for reporting where a file
    /// ended up. Does not touch the filesystem.
    fn locate(&self, path: &Path) -> Result<PathBuf>;

    /// Check whether anything already occupies a relative path.
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Create a directory (and all parents, including the root itself).
    /// Succeeds if it already exists.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Copy the file at absolute `source` to the relative `target`,
    /// preserving permission bits and access/modification times. Returns the
    /// number of bytes copied.
    ///
    /// Never overwrites: an occupied `target` fails with
    /// [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists).
    fn copy_from(&self, source: &Path, target: &Path) -> Result<u64>;
}
