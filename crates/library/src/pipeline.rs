//! One complete run: back up, sweep, report.

use crate::backup::Backup;
use crate::classify::Classifier;
use crate::cleanup::clean;
use crate::error::{ErrorKind, Result};
use crate::journal::Journal;
use crate::resolve::Resolver;
use crate::summary::{Mode, RunState, RunSummary, Status, megabytes};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sweep_config::Config;
use sweep_report::{DiskStatus, ReportSink};
use sweep_storage::{SourceFolder, StorageBackend};
use sweep_storage::backend::LocalBackend;
use time::OffsetDateTime;
use tracing::instrument;

/// How a run ended.
#[derive(Debug)]
pub enum Outcome {
    /// The run reached [`RunState::Done`].
    Completed(RunSummary),
    /// The source folder was missing; nothing was touched, the failure was reported.
    Failed(RunSummary),
    /// The confirmation prompt was declined; nothing was touched or reported.
    Declined,
}
impl Outcome {
    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            Self::Completed(summary) | Self::Failed(summary) => Some(summary),
            Self::Declined => None,
        }
    }

    /// Whether the run got past its preconditions.
    pub fn ran(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

pub struct Pipeline {
    source: PathBuf,
    backup: Backup,
    journal: Journal,
    sinks: Vec<Box<dyn ReportSink>>,
}
impl Pipeline {
    pub fn new(source: impl Into<PathBuf>, backup: Backup, journal: Journal) -> Self {
        Self {
            source: source.into(),
            backup,
            journal,
            sinks: Vec::new(),
        }
    }

    /// Builds a pipeline writing to local destinations, with the dated roots
    /// resolved for a run starting at `now`.
    pub fn from_config(config: &Config, now: OffsetDateTime) -> Result<Self> {
        let classifier = match &config.categories {
            Some(table) => Classifier::from_table(table)?,
            None => Classifier::default(),
        };
        let resolver = Resolver::new(&config.primary.path, &config.secondary.path, &config.folder_suffix);
        let (primary_root, secondary_root) = resolver.resolve_roots(now);
        let primary = LocalBackend::new(&config.primary.label, primary_root).or_raise(|| ErrorKind::Storage)?;
        let secondary = LocalBackend::new(&config.secondary.label, secondary_root).or_raise(|| ErrorKind::Storage)?;
        let backup = Backup::new(classifier, Arc::new(primary), Arc::new(secondary));
        let journal = Journal::new(&config.journal.path, config.journal.on_write_error);
        Ok(Self::new(&config.source, backup, journal))
    }

    pub fn with_sink(mut self, sink: Box<dyn ReportSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Runs the whole pipeline once.
    ///
    /// `confirm` is only consulted in [`Mode::Manual`], after the source
    /// folder has been checked and before anything is copied or journaled.
    /// Copying finishes completely before the first deletion.
    #[instrument(skip_all, fields(mode = %mode, source = %self.source.display()))]
    pub fn run(mut self, mode: Mode, now: OffsetDateTime, confirm: impl FnOnce(&Path) -> bool) -> Outcome {
        let mut summary = RunSummary::new(mode, now);
        if mode == Mode::Auto {
            self.journal.info("--- Automatic backup started ---");
        }

        let folder = match SourceFolder::open(&self.source) {
            Ok(folder) => folder,
            Err(_) => {
                let err = ErrorKind::SourceMissing(self.source.clone());
                self.journal.error(format!("Error: {err}"));
                summary.status = Status::Failed;
                self.report(&mut summary);
                summary.enter(RunState::Done);
                return Outcome::Failed(summary);
            },
        };

        if mode == Mode::Manual {
            if !confirm(folder.path()) {
                tracing::info!("Run declined, nothing was touched");
                return Outcome::Declined;
            }
            self.journal.info("--- Manual backup started ---");
        }

        summary.enter(RunState::Scanning);
        let listed = self.backup.run_backup(&folder, now, |records| {
            if records.is_empty() {
                self.journal.info("No new files in the source folder");
            }
            summary.enter(RunState::Copying);
        });
        match listed {
            Ok(tally) => summary.tally = tally,
            Err(err) => self.journal.error(format!("Error: {}: {}", *err, folder.path().display())),
        }

        if summary.tally.any_success() {
            summary.enter(RunState::Cleaning);
            self.journal.info(format!(
                "Copy finished: {}({}) | {}({})",
                self.backup.primary().name(),
                summary.tally.primary,
                self.backup.secondary().name(),
                summary.tally.secondary,
            ));
            if !summary.tally.errors.is_empty() {
                self.journal.warn(format!("Partial errors: {}", summary.tally.errors.len()));
                for error in &summary.tally.errors {
                    self.journal.error(error.as_str());
                }
            }
            self.journal.info("Cleaning up the source folder...");
            match clean(&folder, &summary.tally, &mut self.journal) {
                Ok(sweep) => {
                    summary.deleted = sweep.deleted;
                    summary.bytes_freed = sweep.bytes_freed;
                    self.journal.info(format!(
                        "Cleanup finished. Files deleted: {}. Space freed: {:.2} MB",
                        sweep.deleted,
                        megabytes(sweep.bytes_freed),
                    ));
                },
                Err(err) => self.journal.error(format!("Cleanup failed: {}", *err)),
            }
            summary.status = if summary.tally.errors.is_empty() { Status::Success } else { Status::Partial };
        } else {
            summary.enter(RunState::SkippedCleaning);
            for error in &summary.tally.errors {
                self.journal.error(error.as_str());
            }
            self.journal.warn("No files were copied (or there were none). Nothing is deleted.");
            summary.status = Status::NothingCopied;
        }

        self.journal.info(format!("--- {} backup finished ---", mode));
        self.report(&mut summary);
        summary.enter(RunState::Done);
        Outcome::Completed(summary)
    }

    /// Hands the summary to every sink. Delivery failures are journaled and
    /// do not change the run's status.
    fn report(&mut self, summary: &mut RunSummary) {
        summary.enter(RunState::Reporting);
        summary.lines = self.journal.lines().to_vec();
        summary.disk = DiskStatus::of(&self.source);
        let report = summary.to_report();
        for sink in &self.sinks {
            match sink.deliver(&report) {
                Ok(()) => tracing::info!(sink = sink.name(), "Report delivered"),
                Err(err) => self.journal.error(format!("Report delivery failed ({}): {}", sink.name(), *err)),
            }
        }
    }
}
