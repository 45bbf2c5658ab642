//! Scheduled backup configuration.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub enabled: bool,
    /// Local hour (in the configured timezone) of the first daily run.
    pub hour: u32,
    /// Hours between runs.
    pub interval_hours: u64,
    /// Backups older than this are deleted.
    pub retention_days: i64,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hour: 3,
            interval_hours: 24,
            retention_days: 30,
        }
    }
}
