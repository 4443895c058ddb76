//! Backup orchestration across the two destinations.

use crate::classify::Classifier;
use crate::copy::{CopyOutcome, copy_one};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sweep_storage::{BackendHandle, FileRecord, SourceFolder, StorageBackend};
use time::OffsetDateTime;
use tracing::instrument;

/// Per-destination success counts and the failures of one backup pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BackupTally {
    /// Source files considered.
    pub considered: usize,
    pub primary: usize,
    pub secondary: usize,
    /// `"{destination}: {file} -> {cause}"`, in the order they happened.
    pub errors: Vec<String>,
}
impl BackupTally {
    /// At least one file reached at least one destination. This is the only
    /// condition under which the source folder may be cleaned.
    pub fn any_success(&self) -> bool {
        self.primary > 0 || self.secondary > 0
    }

    /// `(primary, secondary, errors)`
    pub fn as_tuple(&self) -> (usize, usize, &[String]) {
        (self.primary, self.secondary, &self.errors)
    }
}

/// Copies every file of a source folder to both destinations.
///
/// The destinations are independent: a file that fails on one is still
/// attempted on the other, and nothing is rolled back.
pub struct Backup {
    classifier: Classifier,
    primary: BackendHandle,
    secondary: BackendHandle,
}
impl Backup {
    pub fn new(classifier: Classifier, primary: BackendHandle, secondary: BackendHandle) -> Self {
        Self {
            classifier,
            primary,
            secondary,
        }
    }

    pub fn primary(&self) -> &BackendHandle {
        &self.primary
    }

    pub fn secondary(&self) -> &BackendHandle {
        &self.secondary
    }

    /// Lists the folder and copies each regular file found directly inside it.
    /// An empty folder yields an empty tally.
    ///
    /// `on_listed` sees the listing once, after the scan and before the first
    /// copy.
    #[instrument(skip_all, fields(source = %folder.path().display()))]
    pub fn run_backup(
        &self,
        folder: &SourceFolder,
        now: OffsetDateTime,
        on_listed: impl FnOnce(&[FileRecord]),
    ) -> Result<BackupTally> {
        let records = folder.list().or_raise(|| ErrorKind::Scan)?;
        on_listed(&records);
        if records.is_empty() {
            tracing::info!("Nothing to do, source folder has no files");
            return Ok(BackupTally::default());
        }
        Ok(self.copy_all(&records, now))
    }

    /// Copies already listed files, in the order given.
    pub fn copy_all(&self, records: &[FileRecord], now: OffsetDateTime) -> BackupTally {
        let mut tally = BackupTally {
            considered: records.len(),
            ..BackupTally::default()
        };
        for record in records {
            let category = self.classifier.classify(record.extension.as_deref());
            for (index, destination) in [&self.primary, &self.secondary].into_iter().enumerate() {
                let target = copy_one(&record.path, destination.as_ref(), category, record.file_name(), now)
                    .map_err(|err| (*err).to_string());
                let outcome = CopyOutcome {
                    destination: destination.name().to_string(),
                    file: record.name.clone(),
                    target,
                };
                match outcome.error_line() {
                    Some(line) => {
                        tracing::warn!("{line}");
                        tally.errors.push(line);
                    },
                    None if index == 0 => tally.primary += 1,
                    None => tally.secondary += 1,
                }
            }
        }
        tracing::debug!(primary = tally.primary, secondary = tally.secondary, errors = tally.errors.len(), "Backup pass finished");
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use sweep_storage::backend::MockBackend;

    const NOW: OffsetDateTime = time::macros::datetime!(2025-03-14 09:26:53 UTC);

    fn source_with(files: &[(&str, &[u8])]) -> (tempfile::TempDir, SourceFolder) {
        let temp_dir = tempfile::tempdir().unwrap();
        for (name, data) in files {
            fs::write(temp_dir.path().join(name), data).unwrap();
        }
        let folder = SourceFolder::open(temp_dir.path()).unwrap();
        (temp_dir, folder)
    }

    #[test]
    fn test_empty_source() {
        let (_temp_dir, folder) = source_with(&[]);
        let backup =
            Backup::new(Classifier::default(), Arc::new(MockBackend::new("P")), Arc::new(MockBackend::new("S")));
        let mut listed = None;
        let tally = backup.run_backup(&folder, NOW, |records| listed = Some(records.len())).unwrap();
        assert_eq!(listed, Some(0));
        assert_eq!(tally.as_tuple(), (0, 0, &[][..]));
        assert!(!tally.any_success());
    }

    #[test]
    fn test_copies_to_both_destinations_by_category() {
        let (_temp_dir, folder) = source_with(&[("a.csv", b"1"), ("b.PNG", b"2"), ("c", b"3")]);
        let primary = Arc::new(MockBackend::new("P"));
        let secondary = Arc::new(MockBackend::new("S"));
        let backup = Backup::new(Classifier::default(), primary.clone(), secondary.clone());

        let mut listed = Vec::new();
        let tally = backup
            .run_backup(&folder, NOW, |records| listed = records.iter().map(|r| r.name.clone()).collect())
            .unwrap();
        listed.sort();
        assert_eq!(listed, ["a.csv", "b.PNG", "c"]);
        assert_eq!(tally.as_tuple(), (3, 3, &[][..]));
        assert_eq!(tally.considered, 3);
        for backend in [&primary, &secondary] {
            let files = backend.files();
            assert!(files.contains_key(Path::new("Datasets_Data/a.csv")));
            assert!(files.contains_key(Path::new("Imagenes/b.PNG")));
            assert!(files.contains_key(Path::new("Otros/c")));
        }
    }

    #[test]
    fn test_destinations_are_independent() {
        let (_temp_dir, folder) = source_with(&[("a.pdf", b"1"), ("b.pdf", b"2")]);
        let secondary = Arc::new(MockBackend::new("Secondary"));
        let backup = Backup::new(Classifier::default(), Arc::new(MockBackend::unwritable("Primary")), secondary.clone());

        let tally = backup.run_backup(&folder, NOW, |_| {}).unwrap();
        assert_eq!(tally.primary, 0);
        assert_eq!(tally.secondary, 2);
        assert_eq!(tally.errors.len(), 2);
        assert!(tally.errors.iter().all(|e| e.starts_with("Primary: ") && e.contains(".pdf -> permission denied")));
        assert!(tally.any_success());
        assert_eq!(secondary.files().len(), 2);
    }

    #[test]
    fn test_missing_folder_is_a_scan_error() {
        let (temp_dir, folder) = source_with(&[]);
        drop(temp_dir);
        let backup =
            Backup::new(Classifier::default(), Arc::new(MockBackend::new("P")), Arc::new(MockBackend::new("S")));
        let err = backup.run_backup(&folder, NOW, |_| panic!("nothing was listed")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Scan));
    }
}
