//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the application's use cases. They only depend on the
//! ports in [`crate::port`], so tests drive them with a temporary SQLite
//! repository and a recording messenger.

pub mod conversation;
pub mod export;
pub mod html;
pub mod interview;
pub mod notification;
pub mod scheduler;

use std::path::PathBuf;

use chrono_tz::Tz;

/// Settings shared by the bot-facing services.
#[derive(Debug, Clone)]
pub struct BotSettings {
    /// Timezone for new users and for users with an unparseable zone.
    pub timezone: Tz,
    /// Locale for new users.
    pub locale: String,
    /// Default reminder lead times in hours, sorted descending.
    pub notification_times: Vec<f64>,
    /// Days between a finished interview and its follow-up reminder.
    pub followup_days: i64,
    /// Telegram ids allowed to create backups.
    pub admin_ids: Vec<i64>,
    /// Tolerance around the exact reminder time.
    pub reminder_window_secs: i64,
}

impl BotSettings {
    #[must_use]
    pub fn is_admin(&self, telegram_id: i64) -> bool {
        self.admin_ids.contains(&telegram_id)
    }
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            timezone: Tz::Europe__Moscow,
            locale: "ru".into(),
            notification_times: vec![24.0, 12.0, 6.0, 3.0, 1.5, 0.5],
            followup_days: 3,
            admin_ids: Vec::new(),
            reminder_window_secs: 60,
        }
    }
}

/// Settings for file exports and database backups.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Directory for temporary export files.
    pub data_dir: PathBuf,
    pub backup_dir: PathBuf,
    /// The live database file, `None` for an in-memory database.
    pub database_file: Option<PathBuf>,
    pub backup_enabled: bool,
    pub retention_days: i64,
    /// Timezone used in generated file names.
    pub timezone: Tz,
}
