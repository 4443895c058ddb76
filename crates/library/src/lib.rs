//! Backup-and-sweep pipeline for a download folder.
//!
//! Files directly inside the source folder are classified by extension
//! ([`Classifier`]), copied into two independent dated destination trees
//! ([`Backup`]), and removed from the source ([`clean`]) only once at least
//! one destination has received at least one file. [`Pipeline`] strings the
//! steps together, keeps the [`Journal`] and hands the [`RunSummary`] to the
//! configured report sinks.

mod backup;
mod classify;
mod cleanup;
mod copy;
pub mod error;
mod journal;
mod pipeline;
mod resolve;
mod summary;

pub use crate::backup::{Backup, BackupTally};
pub use crate::classify::{Category, Classifier};
pub use crate::cleanup::{Sweep, clean};
pub use crate::copy::{CopyOutcome, copy_one};
pub use crate::journal::Journal;
pub use crate::pipeline::{Outcome, Pipeline};
pub use crate::resolve::{Resolver, unique_target};
pub use crate::summary::{Mode, RunState, RunSummary, Status, megabytes};
use time::OffsetDateTime;

/// Current local time, falling back to UTC when the local offset cannot be
/// determined (e.g. in a multi-threaded process on some platforms).
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
