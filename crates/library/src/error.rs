//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Only failures that stop a run early are raised through these types. A file
//! that fails to copy or delete is recorded in the run summary instead.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The source folder is missing or is not a folder. Nothing has been
    /// touched when this is raised.
    #[display("source folder not found: {}", _0.display())]
    SourceMissing(#[error(not(source))] PathBuf),
    /// The source folder exists but could not be listed.
    #[display("could not list source folder")]
    Scan,
    /// The configured category table is unusable.
    #[display("invalid category table: {_0}")]
    Classifier(#[error(not(source))] String),
    /// A destination could not be prepared.
    #[display("destination storage error")]
    Storage,
    /// Cleanup was requested although no destination received a file.
    #[display("refusing to clean: no file reached any destination")]
    CleanupRefused,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Scan | Self::Storage)
    }
}
