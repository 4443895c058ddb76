//! Report Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A report error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Template was not loadable or failed to render.
    Template,
    /// Asset was not embedded in the binary.
    #[display("asset not found: {_0}")]
    AssetNotFound(#[error(not(source))] String),
    #[display("sendmail not found on this system")]
    SendmailNotFound,
    /// Sendmail exited unsuccessfully. `None` when killed by a signal.
    #[display("sendmail exited with code: {_0:?}")]
    SendmailFailed(#[error(not(source))] Option<i32>),
    Io,
    /// A sender or recipient could not be parsed as a mailbox.
    #[display("invalid e-mail address: {_0}")]
    InvalidAddress(#[error(not(source))] String),
    /// The relay refused the message or could not be reached.
    #[display("SMTP delivery failed")]
    Smtp,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io | Self::SendmailFailed(_) | Self::Smtp)
    }
}
