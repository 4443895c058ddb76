//! Source folder sweep.

use crate::backup::BackupTally;
use crate::error::{ErrorKind, Result};
use crate::journal::Journal;
use exn::ResultExt;
use sweep_storage::error::Result as StorageResult;
use sweep_storage::{FileRecord, SourceFolder};
use tracing::instrument;

/// What a sweep removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sweep {
    pub deleted: usize,
    /// Sum of the sizes read immediately before each successful removal.
    pub bytes_freed: u64,
    pub failed: usize,
}

/// Deletes every regular file directly inside `folder`, re-listing it first.
///
/// Refuses to run unless `tally` shows that at least one destination received
/// at least one file. Subfolders are left alone. A file that cannot be
/// removed is journaled and skipped.
#[instrument(skip_all, fields(source = %folder.path().display()))]
pub fn clean(folder: &SourceFolder, tally: &BackupTally, journal: &mut Journal) -> Result<Sweep> {
    if !tally.any_success() {
        exn::bail!(ErrorKind::CleanupRefused);
    }
    let records = folder.list().or_raise(|| ErrorKind::Scan)?;
    Ok(remove_each(records, journal, |record| folder.remove(&record.path)))
}

fn remove_each(
    records: Vec<FileRecord>,
    journal: &mut Journal,
    mut remove: impl FnMut(&FileRecord) -> StorageResult<u64>,
) -> Sweep {
    let mut sweep = Sweep::default();
    for record in records {
        match remove(&record) {
            Ok(size) => {
                sweep.deleted += 1;
                sweep.bytes_freed += size;
            },
            Err(err) => {
                sweep.failed += 1;
                journal.warn(format!("Could not delete {}: {}", record.name, *err));
            },
        }
    }
    sweep
}
