//! Monitor configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the episode monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Seconds to wait between failed or empty cycles.
    pub check_interval_secs: u64,

    /// Directory handed to the download client for the new job.
    pub save_path: PathBuf,
}

impl MonitorConfig {
    pub fn new(save_path: impl Into<PathBuf>) -> Self {
        Self {
            check_interval_secs: crate::config::default_check_interval(),
            save_path: save_path.into(),
        }
    }

    pub fn with_check_interval_secs(mut self, secs: u64) -> Self {
        self.check_interval_secs = secs;
        self
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}
