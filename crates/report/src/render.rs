//! Renders a [`Report`] into an HTML body and a plain-text alternative using
//! [`upon`] templates embedded at compile time.

use crate::assets::Templates;
use crate::error::{ErrorKind, Result};
use crate::disk::gigabytes;
use crate::{Level, Report, Usage};
use exn::ResultExt;
use time::macros::format_description;
use tracing::instrument;
use upon::{Engine, Template, Value};

/// Shown in place of disk figures that could not be read.
const UNKNOWN: &str = "?";

/// A report rendered for delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Compiled report templates. Construct once per run and share between sinks.
pub struct Renderer {
    engine: Engine<'static>,
    html: Template<'static>,
    text: Template<'static>,
}
impl Renderer {
    /// Compiles both embedded templates, failing fast on syntax errors.
    pub fn new() -> Result<Self> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let html = engine.compile(Templates::load("report.html")?).or_raise(|| ErrorKind::Template)?;
        let text = engine.compile(Templates::load("report.txt")?).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, html, text })
    }

    #[instrument(skip_all, fields(status = %report.status))]
    pub fn render(&self, report: &Report) -> Result<Rendered> {
        let subject = report.subject();
        let html = self
            .html
            .render(&self.engine, Self::parameters(report, &subject))
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        let text = self
            .text
            .render(&self.engine, Self::parameters(report, &subject))
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        Ok(Rendered { subject, text, html })
    }

    fn parameters(report: &Report, subject: &str) -> Value {
        let lines: Vec<Value> = report
            .lines
            .iter()
            .map(|line| {
                upon::value! {
                    stamp: line.stamp(),
                    level: line.level.as_str(),
                    style: style_of(line.level),
                    text: line.text.as_str(),
                }
            })
            .collect();
        let generated_at = report
            .generated_at
            .format(format_description!("[day]/[month]/[year] - [hour]:[minute]"))
            .unwrap_or_default();
        let disk = match &report.disk {
            Some(disk) => upon::value! {
                total: gigabytes(disk.total),
                used: gigabytes(disk.used()),
                free: gigabytes(disk.available),
                percent: format!("{:.1}", disk.used_percent()),
                colour: disk.usage().colour(),
            },
            None => upon::value! {
                total: UNKNOWN,
                used: UNKNOWN,
                free: UNKNOWN,
                percent: "0",
                colour: Usage::Healthy.colour(),
            },
        };
        upon::value! {
            title: subject,
            generated_at: generated_at,
            mb_freed: format!("{:.2}", report.mb_freed),
            disk: disk,
            lines: Value::List(lines),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

fn style_of(level: Level) -> &'static str {
    match level {
        Level::Error => "color: #dc3545; font-weight: bold;",
        Level::Warn => "color: #d39e00;",
        Level::Info => "color: #333;",
    }
}

/// Custom [`upon`] extensions.
mod addons {
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    /// Escapes the characters that would otherwise be read as markup. File
    /// names end up in log lines, and file names can contain anything.
    fn escape_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => {
                for c in s.chars() {
                    match c {
                        '&' => f.write_str("&amp;")?,
                        '<' => f.write_str("&lt;")?,
                        '>' => f.write_str("&gt;")?,
                        '"' => f.write_str("&quot;")?,
                        '\'' => f.write_str("&#39;")?,
                        c => f.write_char(c)?,
                    }
                }
            },
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("escape", escape_formatter);
    }
}
