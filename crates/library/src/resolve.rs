//! Destination path computation.
//!
//! Everything here is a pure function of the timestamp it is given. The run
//! captures one timestamp at start, so a run that crosses midnight still
//! writes every file into the folder of the day it started.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const YEAR: &[BorrowedFormatItem<'static>] = format_description!("[year]");
const DAY: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const COLLISION_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]_[hour][minute][second]");
/// Counter suffixes tried after the timestamp suffix is also taken.
pub const MAX_COUNTER: u32 = 999;

/// Computes the dated run folder under each destination base.
#[derive(Clone, Debug)]
pub struct Resolver {
    primary: PathBuf,
    secondary: PathBuf,
    suffix: String,
}
impl Resolver {
    pub fn new(primary: impl Into<PathBuf>, secondary: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            suffix: suffix.into(),
        }
    }

    /// `{YYYY}/{YYYY-MM-DD}_{suffix}`, relative to a destination base.
    pub fn run_folder(&self, now: OffsetDateTime) -> PathBuf {
        let year = now.format(YEAR).unwrap_or_default();
        let day = now.format(DAY).unwrap_or_default();
        Path::new(&year).join(format!("{day}_{}", self.suffix))
    }

    /// The primary and secondary roots for a run started at `now`.
    pub fn resolve_roots(&self, now: OffsetDateTime) -> (PathBuf, PathBuf) {
        let folder = self.run_folder(now);
        (self.primary.join(&folder), self.secondary.join(&folder))
    }
}

/// Returns `candidate` untouched when `exists` says it is free. Otherwise
/// inserts `_{YYYYMMDD_HHMMSS}` before the extension, then `_{n}` after the
/// timestamp if that name is taken too. `None` once every counter up to
/// [`MAX_COUNTER`] is taken.
///
/// The check is best-effort: two processes racing on the same name in the
/// same second can still collide, which the never-overwriting copy reports as
/// an error instead of clobbering.
pub fn unique_target(candidate: &Path, now: OffsetDateTime, mut exists: impl FnMut(&Path) -> bool) -> Option<PathBuf> {
    if !exists(candidate) {
        return Some(candidate.to_path_buf());
    }
    let stamp = now.format(COLLISION_STAMP).unwrap_or_default();
    let stamped = with_suffix(candidate, &stamp);
    if !exists(&stamped) {
        return Some(stamped);
    }
    let found = (1..=MAX_COUNTER)
        .map(|n| with_suffix(candidate, &format!("{stamp}_{n}")))
        .find(|path| !exists(path));
    if found.is_none() {
        tracing::warn!(path = %candidate.display(), "Ran out of collision suffixes");
    }
    found
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_stem().map(|stem| stem.to_os_string()).unwrap_or_default();
    name.push("_");
    name.push(suffix);
    if let Some(extension) = path.extension() {
        name.push(".");
        name.push(extension);
    }
    path.with_file_name(OsString::from(name))
}
