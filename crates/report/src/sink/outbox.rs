use crate::error::{ErrorKind, Result};
use crate::sink::ReportSink;
use crate::{Renderer, Report};
use exn::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::macros::format_description;

/// Writes every report into a directory as `{YYYY-MM-DD_HHMMSS}_{status}.html`
/// plus a matching `.txt`, creating the directory if needed.
pub struct OutboxSink {
    dir: PathBuf,
    renderer: Arc<Renderer>,
}
impl OutboxSink {
    pub fn new(dir: impl Into<PathBuf>, renderer: Arc<Renderer>) -> Self {
        Self { dir: dir.into(), renderer }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn stem(report: &Report) -> String {
        let stamp = report
            .generated_at
            .format(format_description!("[year]-[month]-[day]_[hour][minute][second]"))
            .unwrap_or_default();
        let status: String = report
            .status
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        format!("{stamp}_{status}")
    }
}

impl ReportSink for OutboxSink {
    fn name(&self) -> &str {
        "outbox"
    }

    fn deliver(&self, report: &Report) -> Result<()> {
        let rendered = self.renderer.render(report)?;
        fs::create_dir_all(&self.dir).or_raise(|| ErrorKind::Io)?;
        let stem = Self::stem(report);
        fs::write(self.dir.join(format!("{stem}.html")), rendered.html).or_raise(|| ErrorKind::Io)?;
        fs::write(self.dir.join(format!("{stem}.txt")), rendered.text).or_raise(|| ErrorKind::Io)?;
        tracing::debug!(dir = %self.dir.display(), file = %stem, "Report written to outbox");
        Ok(())
    }
}
