use crate::error::{ErrorKind, Result};
use crate::sink::ReportSink;
use crate::{Rendered, Renderer, Report};
use exn::{OptionExt, ResultExt};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use time::format_description::well_known::Rfc2822;
use tracing::instrument;

/// Hands reports to a sendmail-compatible binary as a `multipart/alternative`
/// message with a plain-text and an HTML part.
pub struct SendmailSink {
    binary: PathBuf,
    from: String,
    to: String,
    renderer: Arc<Renderer>,
}
impl SendmailSink {
    pub fn new(binary: impl Into<PathBuf>, from: impl Into<String>, to: impl Into<String>, renderer: Arc<Renderer>) -> Self {
        Self {
            binary: binary.into(),
            from: from.into(),
            to: to.into(),
            renderer,
        }
    }

    /// Finds a sendmail binary on `PATH` (or in the usual sbin locations).
    pub fn discover(from: impl Into<String>, to: impl Into<String>, renderer: Arc<Renderer>) -> Result<Self> {
        let binary = ["sendmail"]
            .into_iter()
            .find_map(|exe| which::which(exe).ok())
            .or_else(|| {
                ["/usr/sbin/sendmail", "/usr/lib/sendmail"].into_iter().map(PathBuf::from).find(|p| p.is_file())
            })
            .ok_or_raise(|| ErrorKind::SendmailNotFound)?;
        tracing::debug!(sendmail = %binary.display(), "Discovered sendmail");
        Ok(Self::new(binary, from, to, renderer))
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn message(&self, report: &Report, rendered: &Rendered) -> String {
        let boundary = format!("sweep-{}", report.generated_at.unix_timestamp());
        let date = report.generated_at.format(&Rfc2822).unwrap_or_default();
        let mut message = String::new();
        message.push_str(&format!("From: {}\r\n", self.from));
        message.push_str(&format!("To: {}\r\n", self.to));
        message.push_str(&format!("Subject: {}\r\n", rendered.subject));
        if !date.is_empty() {
            message.push_str(&format!("Date: {date}\r\n"));
        }
        message.push_str("MIME-Version: 1.0\r\n");
        message.push_str(&format!("Content-Type: multipart/alternative; boundary=\"{boundary}\"\r\n\r\n"));
        for (kind, body) in [("plain", &rendered.text), ("html", &rendered.html)] {
            message.push_str(&format!("--{boundary}\r\n"));
            message.push_str(&format!("Content-Type: text/{kind}; charset=utf-8\r\n"));
            message.push_str("Content-Transfer-Encoding: 8bit\r\n\r\n");
            message.push_str(body);
            message.push_str("\r\n");
        }
        message.push_str(&format!("--{boundary}--\r\n"));
        message
    }
}

impl ReportSink for SendmailSink {
    fn name(&self) -> &str {
        "sendmail"
    }

    #[instrument(skip_all, fields(to = %self.to))]
    fn deliver(&self, report: &Report) -> Result<()> {
        let rendered = self.renderer.render(report)?;
        let message = self.message(report, &rendered);
        let mut child = Command::new(&self.binary)
            .args(["-t", "-oi"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .or_raise(|| ErrorKind::Io)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(message.as_bytes()).or_raise(|| ErrorKind::Io)?;
        }
        let status = child.wait().or_raise(|| ErrorKind::Io)?;
        if !status.success() {
            exn::bail!(ErrorKind::SendmailFailed(status.code()));
        }
        Ok(())
    }
}
