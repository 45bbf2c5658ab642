//! Reminder scheduling configuration.

use serde::Deserialize;

/// Lead times used for new users and by the reset button.
pub const DEFAULT_NOTIFICATION_TIMES: [f64; 6] = [24.0, 12.0, 6.0, 3.0, 1.5, 0.5];

/// Reminder scheduling configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Hours before an interview at which reminders go out.
    pub default_times: Vec<f64>,
    /// Seconds between scheduler passes.
    pub check_interval_secs: u64,
    /// How far from the exact reminder time a pass may still send it.
    pub window_secs: i64,
    /// Days after an interview before a follow-up reminder fires.
    pub default_followup_days: i64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_times: DEFAULT_NOTIFICATION_TIMES.to_vec(),
            check_interval_secs: 60,
            window_secs: 60,
            default_followup_days: 3,
        }
    }
}
