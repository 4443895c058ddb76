//! Run state and the summary handed to report sinks.

use crate::backup::BackupTally;
use derive_more::Display;
use sweep_report::{DiskStatus, Line, Report};
use time::OffsetDateTime;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// How the run was started.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Mode {
    /// Unattended, never prompts.
    #[display("AUTO")]
    Auto,
    /// Asks for confirmation before anything destructive happens.
    #[display("MANUAL")]
    Manual,
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Status {
    /// Files copied and the source swept without a single copy error.
    #[display("SUCCESS")]
    Success,
    /// Files copied and the source swept, but some copies failed.
    #[display("PARTIAL")]
    Partial,
    /// Nothing reached either destination, so the source was left alone.
    #[display("NOTHING COPIED")]
    NothingCopied,
    /// The run stopped before touching anything.
    #[display("FAILED")]
    Failed,
}

/// `Idle -> Scanning -> Copying -> (Cleaning | SkippedCleaning) -> Reporting -> Done`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Scanning,
    Copying,
    Cleaning,
    SkippedCleaning,
    Reporting,
    Done,
}

/// Bytes as megabytes (MiB) rounded to two decimals.
pub fn megabytes(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
}

/// The result of one run. Built as the run progresses and not modified after
/// it is handed to the report sinks.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub mode: Mode,
    pub status: Status,
    pub started_at: OffsetDateTime,
    pub tally: BackupTally,
    pub deleted: usize,
    pub bytes_freed: u64,
    pub lines: Vec<Line>,
    /// Volume holding the source folder, read just before reporting. `None`
    /// when it could not be determined.
    pub disk: Option<DiskStatus>,
    /// States the run passed through, in order.
    pub states: Vec<RunState>,
}
impl RunSummary {
    pub fn new(mode: Mode, started_at: OffsetDateTime) -> Self {
        Self {
            mode,
            status: Status::Failed,
            started_at,
            tally: BackupTally::default(),
            deleted: 0,
            bytes_freed: 0,
            lines: Vec::new(),
            disk: None,
            states: vec![RunState::Idle],
        }
    }

    pub fn state(&self) -> RunState {
        self.states.last().copied().unwrap_or(RunState::Idle)
    }

    pub(crate) fn enter(&mut self, state: RunState) {
        tracing::trace!(?state, "Run state changed");
        self.states.push(state);
    }

    pub fn mb_freed(&self) -> f64 {
        megabytes(self.bytes_freed)
    }

    /// `"{mode} {status}"`, e.g. `"AUTO PARTIAL"`.
    pub fn status_label(&self) -> String {
        format!("{} {}", self.mode, self.status)
    }

    pub fn cleaned(&self) -> bool {
        self.states.contains(&RunState::Cleaning)
    }

    pub fn to_report(&self) -> Report {
        Report {
            status: self.status_label(),
            lines: self.lines.clone(),
            mb_freed: self.mb_freed(),
            disk: self.disk,
            generated_at: self.started_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0.0)]
    #[case(3_145_728, 3.0)]
    #[case(1_500_000, 1.43)]
    #[case(5_242, 0.0)]
    #[case(5_243, 0.01)]
    fn test_megabytes(#[case] bytes: u64, #[case] expected: f64) {
        assert_eq!(megabytes(bytes), expected);
    }

    #[test]
    fn test_status_label() {
        let mut summary = RunSummary::new(Mode::Auto, OffsetDateTime::UNIX_EPOCH);
        summary.status = Status::NothingCopied;
        assert_eq!(summary.status_label(), "AUTO NOTHING COPIED");
        assert_eq!(summary.state(), RunState::Idle);
    }

    #[test]
    fn test_report_carries_disk_status() {
        let mut summary = RunSummary::new(Mode::Manual, OffsetDateTime::UNIX_EPOCH);
        summary.status = Status::Success;
        summary.bytes_freed = 3_145_728;
        summary.disk = Some(DiskStatus::new(1000, 250));

        let report = summary.to_report();
        assert_eq!(report.status, "MANUAL SUCCESS");
        assert_eq!(report.mb_freed, 3.0);
        assert_eq!(report.disk.map(|disk| disk.used_percent()), Some(75.0));
    }
}
