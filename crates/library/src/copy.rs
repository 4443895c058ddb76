//! Copying one source file into one destination.

use crate::classify::Category;
use crate::resolve::unique_target;
use exn::OptionExt;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use sweep_storage::StorageBackend;
use sweep_storage::error::{ErrorKind as StorageErrorKind, Result as StorageResult};
use sweep_storage::validate_path;
use time::OffsetDateTime;
use tracing::instrument;

/// Result of copying one file to one destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyOutcome {
    /// Label of the destination.
    pub destination: String,
    /// Source file name, for display.
    pub file: String,
    /// Where the copy landed, or why it did not.
    pub target: Result<PathBuf, String>,
}
impl CopyOutcome {
    pub fn is_success(&self) -> bool {
        self.target.is_ok()
    }

    /// `"{destination}: {file} -> {cause}"` for failed copies.
    pub fn error_line(&self) -> Option<String> {
        self.target.as_ref().err().map(|cause| format!("{}: {} -> {cause}", self.destination, self.file))
    }
}

/// Copies `source` into `{category}/{file_name}` on `destination`, creating
/// the category folder first and renaming on collision. Returns the absolute
/// location of the new copy.
///
/// A failed copy may leave a partial file behind.
#[instrument(skip_all, fields(destination = destination.name(), category = %category))]
pub fn copy_one(
    source: &Path,
    destination: &dyn StorageBackend,
    category: Category,
    file_name: &OsStr,
    now: OffsetDateTime,
) -> StorageResult<PathBuf> {
    let folder = Path::new(category.as_str());
    destination.create_dir_all(folder)?;
    let candidate = validate_path(folder.join(file_name))?;
    // A failed lookup counts as free: the copy never overwrites, so it will
    // surface the underlying problem itself.
    let target = unique_target(&candidate, now, |path| destination.exists(path).unwrap_or(false))
        .ok_or_raise(|| StorageErrorKind::AlreadyExists(candidate.clone()))?;
    let bytes = destination.copy_from(source, &target)?;
    let located = destination.locate(&target)?;
    tracing::debug!(source = %source.display(), target = %located.display(), bytes, "Copied file");
    Ok(located)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use sweep_storage::backend::{LocalBackend, MockBackend};
    use crate::resolve::MAX_COUNTER;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2025-03-14 09:26:53 UTC);

    #[test]
    fn test_copy_creates_category_folder() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("notes.md");
        fs::write(&source, b"# notes").unwrap();
        let root = temp_dir.path().join("dest/2025/2025-03-14_Backup_Descargas");
        let backend = LocalBackend::new("Primary", &root).unwrap();

        let target = copy_one(&source, &backend, Category::Documentos, OsStr::new("notes.md"), NOW).unwrap();
        assert_eq!(target, root.join("Documentos/notes.md"));
        assert_eq!(fs::read(&target).unwrap(), b"# notes");
        assert!(source.exists());
    }

    #[test]
    fn test_copy_renames_on_collision() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("data.csv");
        fs::write(&source, b"new").unwrap();
        let backend = MockBackend::new("Secondary").with_files([("Datasets_Data/data.csv", b"old".to_vec())]);

        let target = copy_one(&source, &backend, Category::DatasetsData, OsStr::new("data.csv"), NOW).unwrap();
        assert_eq!(target, Path::new("/mock/Secondary/Datasets_Data/data_20250314_092653.csv"));
        let files = backend.files();
        assert_eq!(files[Path::new("Datasets_Data/data.csv")], b"old");
        assert_eq!(files[Path::new("Datasets_Data/data_20250314_092653.csv")], b"new");
    }

    #[test]
    fn test_copy_refuses_when_every_name_is_taken() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("a.txt");
        fs::write(&source, b"new").unwrap();
        let taken = ["Otros/a.txt".to_string(), "Otros/a_20250314_092653.txt".to_string()]
            .into_iter()
            .chain((1..=MAX_COUNTER).map(|n| format!("Otros/a_20250314_092653_{n}.txt")))
            .map(|path| (path, b"old".to_vec()));
        let backend = MockBackend::new("Primary").with_files(taken);

        let err = copy_one(&source, &backend, Category::Otros, OsStr::new("a.txt"), NOW).unwrap_err();
        assert!(matches!(&*err, StorageErrorKind::AlreadyExists(_)));
        assert!(backend.files().values().all(|data| data == b"old"));
    }

    #[test]
    fn test_copy_to_unwritable_destination() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("a.pdf");
        fs::write(&source, b"pdf").unwrap();
        let backend = MockBackend::unwritable("Primary");

        let err = copy_one(&source, &backend, Category::Documentos, OsStr::new("a.pdf"), NOW).unwrap_err();
        assert!(matches!(&*err, StorageErrorKind::PermissionDenied(_)));
    }

    #[test]
    fn test_copy_vanished_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = MockBackend::new("Primary");
        let missing = temp_dir.path().join("gone.txt");
        let err = copy_one(&missing, &backend, Category::Documentos, OsStr::new("gone.txt"), NOW).unwrap_err();
        assert!(matches!(&*err, StorageErrorKind::NotFound(_)));
    }

    #[test]
    fn test_error_line() {
        let outcome = CopyOutcome {
            destination: "Primary".to_string(),
            file: "a.pdf".to_string(),
            target: Err("permission denied: /mnt/d".to_string()),
        };
        assert_eq!(outcome.error_line().unwrap(), "Primary: a.pdf -> permission denied: /mnt/d");
        assert!(!outcome.is_success());
    }
}
