//! Configuration for a sweep run.
//!
//! Values are layered with [`figment`], later layers overriding earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A configuration file, either given explicitly or discovered as
//!    `sweep.{toml,yaml,yml,json}` in the platform configuration directory.
//! 3. Environment variables prefixed with `SWEEP_`, with nested keys separated
//!    by a double underscore (`SWEEP_PRIMARY__PATH=/mnt/backup`).
//!
//! Nothing is hard-coded beyond the defaults below: both destination paths
//! must be supplied by a file or the environment.
//!
//! ```toml
//! source = "/home/me/Downloads"
//! folder_suffix = "Backup_Descargas"
//!
//! [primary]
//! path = "/mnt/backups/Descargas"
//! label = "D"
//!
//! [secondary]
//! path = "/media/usb/Backup_Descargas"
//! label = "A"
//!
//! [report.email]
//! from = "backup@example.com"
//! to = "me@example.com"
//! ```
//!
//! Reports can also go through an SMTP relay. Keep the password out of the
//! file and set `SWEEP_REPORT__SMTP__PASSWORD` instead:
//!
//! ```toml
//! [report.smtp]
//! server = "smtp.gmail.com"
//! username = "backup@example.com"
//! from = "backup@example.com"
//! to = "me@example.com"
//! ```

pub mod error;
mod load;
mod validate;

use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use crate::load::ENV_PREFIX;

pub const DEFAULT_FOLDER_SUFFIX: &str = "Backup_Descargas";
pub const DEFAULT_JOURNAL_NAME: &str = "backup_log.txt";
pub const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Folder that is backed up and then emptied of regular files.
    pub source: PathBuf,
    pub primary: Destination,
    pub secondary: Destination,
    /// Suffix of the per-day folder: `{YYYY-MM-DD}_{folder_suffix}`.
    pub folder_suffix: String,
    /// Optional replacement of the built-in extension table, keyed by
    /// category label.
    #[serde(default)]
    pub categories: Option<BTreeMap<String, Vec<String>>>,
    pub journal: JournalConfig,
    pub report: ReportConfig,
}

/// One of the two independent backup targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Base directory; the dated tree is built underneath it.
    pub path: PathBuf,
    /// Short name used in log lines and error strings.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalConfig {
    /// Append-only text log.
    pub path: PathBuf,
    pub on_write_error: WriteFailurePolicy,
}

/// What to do when a line cannot be appended to the journal file. The run
/// carries on either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteFailurePolicy {
    /// Emit a warning on the diagnostic channel.
    #[default]
    Warn,
    /// Only note the failure at debug level (the line is still kept for the
    /// report).
    Ignore,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory that receives a rendered copy of every report.
    #[serde(default)]
    pub outbox: Option<PathBuf>,
    #[serde(default)]
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailConfig {
    pub from: String,
    pub to: String,
    /// Sendmail-compatible binary; discovered on `PATH` when unset.
    #[serde(default)]
    pub sendmail: Option<PathBuf>,
}

/// Delivery through an SMTP relay using STARTTLS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Login name; no authentication is attempted when unset.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub from: String,
    pub to: String,
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

impl Default for Config {
    fn default() -> Self {
        let source = UserDirs::new().and_then(|dirs| dirs.download_dir().map(Path::to_path_buf)).unwrap_or_default();
        let journal = ProjectDirs::from("", "", "sweep")
            .map(|dirs| dirs.data_local_dir().join(DEFAULT_JOURNAL_NAME))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_JOURNAL_NAME));
        Self {
            source,
            primary: Destination {
                path: PathBuf::new(),
                label: "Primary".to_string(),
            },
            secondary: Destination {
                path: PathBuf::new(),
                label: "Secondary".to_string(),
            },
            folder_suffix: DEFAULT_FOLDER_SUFFIX.to_string(),
            categories: None,
            journal: JournalConfig {
                path: journal,
                on_write_error: WriteFailurePolicy::default(),
            },
            report: ReportConfig::default(),
        }
    }
}
