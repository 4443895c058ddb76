//! Space on the volume holding the source folder.

use std::path::Path;
use sysinfo::Disks;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// How full a volume is, for colouring the usage bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Usage {
    /// Up to 75% used.
    Healthy,
    /// Over 75% used.
    Warning,
    /// Over 90% used.
    Critical,
}
impl Usage {
    pub fn colour(&self) -> &'static str {
        match self {
            Self::Healthy => "#28a745",
            Self::Warning => "#ffc107",
            Self::Critical => "#dc3545",
        }
    }
}

/// Total and available bytes of one mounted volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiskStatus {
    pub total: u64,
    pub available: u64,
}
impl DiskStatus {
    pub fn new(total: u64, available: u64) -> Self {
        Self { total, available }
    }

    /// Reads the volume whose mount point is the longest prefix of `path`.
    /// Returns `None` when the path cannot be resolved or no mounted volume
    /// contains it.
    pub fn of(path: &Path) -> Option<Self> {
        let path = path.canonicalize().ok()?;
        let disks = Disks::new_with_refreshed_list();
        let status = disks
            .list()
            .iter()
            .filter(|disk| path.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .map(|disk| Self::new(disk.total_space(), disk.available_space()))
            .filter(|status| status.total > 0);
        if status.is_none() {
            tracing::debug!(path = %path.display(), "No mounted volume found");
        }
        status
    }

    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.available)
    }

    /// Used share of the volume, rounded to one decimal.
    pub fn used_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.used() as f64 / self.total as f64 * 1000.0).round() / 10.0
    }

    pub fn usage(&self) -> Usage {
        match self.used_percent() {
            p if p > 90.0 => Usage::Critical,
            p if p > 75.0 => Usage::Warning,
            _ => Usage::Healthy,
        }
    }
}

/// Bytes as gigabytes (GiB) with two decimals.
pub(crate) fn gigabytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / BYTES_PER_GB)
}
