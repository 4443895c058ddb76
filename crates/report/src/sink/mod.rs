//! Report delivery.
//!
//! A sink receives a finished [`Report`] and is responsible for rendering and
//! delivering it. Delivery failures are returned to the caller, which records
//! them; they never change how the run itself is classified.

mod outbox;
mod sendmail;
mod smtp;

pub use self::outbox::OutboxSink;
pub use self::sendmail::SendmailSink;
pub use self::smtp::SmtpSink;
use crate::Report;
use crate::error::Result;

pub trait ReportSink {
    /// Short description used when logging delivery results.
    fn name(&self) -> &str;

    fn deliver(&self, report: &Report) -> Result<()>;
}
