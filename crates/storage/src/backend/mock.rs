//! In-memory destination backend for testing.

use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::path::validate as validate_path;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// In-memory destination backend for testing.
///
/// Copied files are held in a map behind a [`RwLock`], so all trait methods
/// can operate on `&self`. A backend built with [`MockBackend::unwritable`]
/// rejects every directory creation and copy with
/// [`PermissionDenied`](ErrorKind::PermissionDenied), which is how tests
/// simulate a read-only or unplugged destination drive.
///
/// # Examples
///
/// ```
/// use sweep_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// let backend = MockBackend::new("Primary").with_files([("Otros/old.txt", b"x")]);
/// assert!(backend.exists(Path::new("Otros/old.txt")).unwrap());
/// assert!(!backend.exists(Path::new("Otros/new.txt")).unwrap());
/// ```
pub struct MockBackend {
    name: String,
    writable: bool,
    files: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: RwLock<BTreeSet<PathBuf>>,
}

impl MockBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            writable: true,
            files: RwLock::default(),
            dirs: RwLock::default(),
        }
    }

    /// A backend on which every write fails.
    pub fn unwritable(name: impl Into<String>) -> Self {
        Self { writable: false, ..Self::new(name) }
    }

    /// Pre-populate the backend with files.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    pub fn with_files(self, files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        {
            let mut guard = self.files.write().unwrap_or_else(|e| e.into_inner());
            for (path, data) in files {
                let path = path.into();
                let Ok(validated) = validate_path(&path) else {
                    panic!("MockBackend::with_files: invalid path {}", path.display());
                };
                guard.insert(validated, data.into());
            }
        }
        self
    }

    /// Snapshot of every stored file, keyed by relative path.
    pub fn files(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        self.files.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn ensure_writable(&self, path: &Path) -> Result<()> {
        if !self.writable {
            exn::bail!(ErrorKind::PermissionDenied(Path::new("/mock").join(&self.name).join(path)));
        }
        Ok(())
    }
}

impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn locate(&self, path: &Path) -> Result<PathBuf> {
        Ok(Path::new("/mock").join(&self.name).join(validate_path(path)?))
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        let path = validate_path(path)?;
        let is_file = self.files.read().unwrap_or_else(|e| e.into_inner()).contains_key(&path);
        Ok(is_file || self.dirs.read().unwrap_or_else(|e| e.into_inner()).contains(&path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let path = validate_path(path)?;
        self.ensure_writable(&path)?;
        self.dirs.write().unwrap_or_else(|e| e.into_inner()).insert(path);
        Ok(())
    }

    fn copy_from(&self, source: &Path, target: &Path) -> Result<u64> {
        let target = validate_path(target)?;
        self.ensure_writable(&target)?;
        let data = fs::read(source).map_err(|e| ErrorKind::from_io(e, source))?;
        let mut guard = self.files.write().unwrap_or_else(|e| e.into_inner());
        if guard.contains_key(&target) {
            exn::bail!(ErrorKind::AlreadyExists(target));
        }
        let bytes = data.len() as u64;
        guard.insert(target, data);
        Ok(bytes)
    }
}
