//! Append-only run journal.
//!
//! Every entry is appended to the journal file as
//! `[YYYY-MM-DD HH:MM:SS] message`, echoed through `tracing`, and kept in
//! memory so the run report can list it. A journal file that cannot be
//! written never stops the run.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use sweep_config::WriteFailurePolicy;
use sweep_report::{Level, Line};

pub struct Journal {
    path: Option<PathBuf>,
    policy: WriteFailurePolicy,
    lines: Vec<Line>,
}
impl Journal {
    pub fn new(path: impl Into<PathBuf>, policy: WriteFailurePolicy) -> Self {
        Self {
            path: Some(path.into()),
            policy,
            lines: Vec::new(),
        }
    }

    /// A journal that only keeps lines in memory.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            policy: WriteFailurePolicy::Ignore,
            lines: Vec::new(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(Level::Info, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.record(Level::Warn, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record(Level::Error, message.into());
    }

    /// Every line recorded so far, oldest first.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    fn record(&mut self, level: Level, message: String) {
        match level {
            Level::Info => tracing::info!("{message}"),
            Level::Warn => tracing::warn!("{message}"),
            Level::Error => tracing::error!("{message}"),
        }
        let line = Line::new(level, crate::now(), message);
        if let Some(path) = &self.path
            && let Err(e) = append(path, &format!("[{}] {}", line.stamp(), line.text))
        {
            match self.policy {
                WriteFailurePolicy::Warn => {
                    tracing::warn!(path = %path.display(), error = %e, "Could not write to journal");
                },
                WriteFailurePolicy::Ignore => {
                    tracing::debug!(path = %path.display(), error = %e, "Could not write to journal");
                },
            }
        }
        self.lines.push(line);
    }
}

fn append(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}
