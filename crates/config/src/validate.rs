use crate::error::{ErrorKind, Result};
use crate::{Config, Destination};
use std::path::{Component, Path};

impl Config {
    /// Rejects configurations that would make a run unsafe or meaningless.
    ///
    /// The source must not double as a destination: the cleanup sweep would
    /// otherwise be free to remove files that were just backed up.
    pub fn validate(&self) -> Result<()> {
        if self.source.as_os_str().is_empty() {
            invalid("source folder is not configured")?;
        }
        check_destination("primary", &self.primary)?;
        check_destination("secondary", &self.secondary)?;
        if self.primary.path == self.secondary.path {
            invalid("primary and secondary destinations must differ")?;
        }
        if self.primary.path == self.source || self.secondary.path == self.source {
            invalid("a destination cannot be the source folder")?;
        }
        if self.primary.label == self.secondary.label {
            invalid("primary and secondary labels must differ")?;
        }
        if !is_single_component(&self.folder_suffix) {
            invalid(format!("folder suffix `{}` must be a plain folder name", self.folder_suffix))?;
        }
        if self.journal.path.as_os_str().is_empty() {
            invalid("journal path is empty")?;
        }
        if let Some(email) = &self.report.email
            && (email.from.trim().is_empty() || email.to.trim().is_empty())
        {
            invalid("e-mail reports need both `from` and `to`")?;
        }
        if let Some(smtp) = &self.report.smtp {
            if smtp.server.trim().is_empty() {
                invalid("SMTP reports need a `server`")?;
            }
            if smtp.from.trim().is_empty() || smtp.to.trim().is_empty() {
                invalid("SMTP reports need both `from` and `to`")?;
            }
            if smtp.username.is_some() != smtp.password.is_some() {
                invalid("SMTP `username` and `password` must be set together")?;
            }
        }
        Ok(())
    }
}

fn check_destination(key: &str, destination: &Destination) -> Result<()> {
    if destination.path.as_os_str().is_empty() {
        invalid(format!("{key} destination path is not configured"))?;
    }
    if !destination.path.is_absolute() {
        invalid(format!("{key} destination path must be absolute"))?;
    }
    if destination.label.trim().is_empty() {
        invalid(format!("{key} destination label is empty"))?;
    }
    Ok(())
}

fn is_single_component(s: &str) -> bool {
    let mut components = Path::new(s).components();
    matches!((components.next(), components.next()), (Some(Component::Normal(_)), None)) && !s.contains(['/', '\\'])
}

fn invalid(reason: impl Into<String>) -> Result<()> {
    exn::bail!(ErrorKind::Invalid(reason.into()))
}
