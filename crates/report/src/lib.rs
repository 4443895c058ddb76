//! Report sink contract for sweep runs.
//!
//! The pipeline hands a finished [`Report`] to every configured
//! [`ReportSink`]. Rendering ([`Renderer`]) and delivery (the [`sink`]
//! implementations) live here so the pipeline never needs to know how, or
//! whether, a report reaches a human.

mod assets;
mod disk;
pub mod error;
mod render;
pub mod sink;

use time::OffsetDateTime;
use time::macros::format_description;

pub use crate::disk::{DiskStatus, Usage};
pub use crate::render::{Rendered, Renderer};
pub use crate::sink::ReportSink;

/// Severity of a journal line, used to colour the report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Level {
    #[default]
    Info,
    Warn,
    Error,
}
impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// One line of the run's activity log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub level: Level,
    /// When the line was recorded.
    pub at: OffsetDateTime,
    pub text: String,
}
impl Line {
    pub fn new(level: Level, at: OffsetDateTime, text: impl Into<String>) -> Self {
        Self {
            level,
            at,
            text: text.into(),
        }
    }

    /// `YYYY-MM-DD HH:MM:SS`, as written to the journal file.
    pub fn stamp(&self) -> String {
        self.at.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]")).unwrap_or_default()
    }
}

/// Everything a sink receives about a finished run.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    /// Short status label, e.g. `"AUTO SUCCESS"`.
    pub status: String,
    /// Activity log in the order it was recorded.
    pub lines: Vec<Line>,
    /// Space freed in the source folder, in megabytes rounded to 2 decimals.
    pub mb_freed: f64,
    /// Space on the volume holding the source folder, when it could be read.
    pub disk: Option<DiskStatus>,
    pub generated_at: OffsetDateTime,
}
impl Report {
    /// `"{status} (+{mb} MB) - Backup {YYYY-MM-DD}"`
    pub fn subject(&self) -> String {
        let date = self.generated_at.format(format_description!("[year]-[month]-[day]")).unwrap_or_default();
        format!("{} (+{:.2} MB) - Backup {date}", self.status, self.mb_freed)
    }
}
