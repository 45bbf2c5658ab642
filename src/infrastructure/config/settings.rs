//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from an optional TOML file, then environment
//! variables override individual values. The bot token is only ever read from
//! `BOT_TOKEN`.
//!
//! # Example
//!
//! ```no_run
//! use interview_bot::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use chrono_tz::Tz;
use serde::Deserialize;
use tracing::warn;

use super::backup::BackupConfig;
use super::logging::LoggingConfig;
use super::notification::{NotificationConfig, DEFAULT_NOTIFICATION_TIMES};
use super::storage::StorageConfig;
use super::telegram::TelegramConfig;
use super::web::WebConfig;
use crate::adapter::outbound::sqlite::database_file;
use crate::application::{BotSettings, ExportSettings};
use crate::domain::validate::{normalize_times, MAX_NOTIFICATION_HOURS};
use crate::error::{ConfigError, Result};

const DEFAULT_TIMEZONE: &str = "Europe/Moscow";
const DEFAULT_LOCALE: &str = "ru";

/// Upper bounds that keep derived durations inside chrono and tokio ranges.
const MAX_CHECK_INTERVAL_SECS: u64 = 86_400;
const MAX_WINDOW_SECS: i64 = 86_400;
const MAX_DAYS: i64 = 3_650;
const MAX_BACKUP_INTERVAL_HOURS: u64 = 8_760;

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging and tracing configuration.
    pub logging: LoggingConfig,
    pub telegram: TelegramConfig,
    pub storage: StorageConfig,
    pub notifications: NotificationConfig,
    pub backup: BackupConfig,
    pub web: WebConfig,
    /// IANA timezone used by the scheduler and for new users.
    pub timezone: String,
    /// Locale assigned to new users.
    pub locale: String,
    /// Telegram ids allowed to trigger backups.
    pub admin_ids: Vec<i64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            telegram: TelegramConfig::default(),
            storage: StorageConfig::default(),
            notifications: NotificationConfig::default(),
            backup: BackupConfig::default(),
            web: WebConfig::default(),
            timezone: DEFAULT_TIMEZONE.into(),
            locale: DEFAULT_LOCALE.into(),
            admin_ids: Vec::new(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content and apply process environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed, an environment
    /// value cannot be parsed, or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        Self::parse_with_env(content, |key| std::env::var(key).ok())
    }

    /// Like [`Config::parse_toml`] with an explicit environment lookup.
    ///
    /// # Errors
    ///
    /// See [`Config::parse_toml`].
    pub fn parse_with_env(content: &str, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_overrides(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load from `path` if it exists, otherwise start from defaults.
    ///
    /// Environment overrides apply either way.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Self::parse_toml("")
        }
    }

    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        self.telegram.bot_token = get("BOT_TOKEN");
        if let Some(url) = get("DATABASE_URL") {
            self.storage.database_url = Some(url);
        }
        if let Some(dir) = get("DATA_DIR") {
            self.storage.data_dir = dir.into();
        }
        if let Some(dir) = get("BACKUP_PATH") {
            self.storage.backup_dir = dir.into();
        }
        if let Some(tz) = get("TZ") {
            self.timezone = tz;
        }
        if let Some(locale) = get("DEFAULT_LOCALE") {
            self.locale = locale;
        }
        if let Some(ids) = get("ADMIN_IDS") {
            self.admin_ids = parse_admin_ids(&ids)?;
        }
        if let Some(times) = get("DEFAULT_NOTIFICATION_TIMES") {
            self.notifications.default_times = parse_times(&times)?;
        }
        if let Some(days) = get("DEFAULT_FOLLOWUP_DAYS") {
            self.notifications.default_followup_days =
                parse_number("DEFAULT_FOLLOWUP_DAYS", &days)?;
        }
        if let Some(enabled) = get("BACKUP_ENABLED") {
            self.backup.enabled = parse_bool("BACKUP_ENABLED", &enabled)?;
        }
        if let Some(hours) = get("BACKUP_INTERVAL_HOURS") {
            self.backup.interval_hours = parse_number("BACKUP_INTERVAL_HOURS", &hours)?;
        }
        if let Some(host) = get("WEB_HOST") {
            self.web.host = host;
        }
        if let Some(port) = get("WEB_PORT") {
            self.web.port = parse_number("WEB_PORT", &port)?;
        }
        if let Some(enabled) = get("WEBHOOK_ENABLED") {
            self.telegram.webhook_enabled = parse_bool("WEBHOOK_ENABLED", &enabled)?;
        }
        if let Some(url) = get("WEBHOOK_URL") {
            self.telegram.webhook_url = url;
        }
        Ok(())
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.timezone.parse::<Tz>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "timezone",
                reason: format!("unknown timezone '{}'", self.timezone),
            }
            .into());
        }
        if self.locale.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "locale" }.into());
        }

        let times = &self.notifications.default_times;
        if times.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "default_times",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        if times
            .iter()
            .any(|h| !h.is_finite() || *h <= 0.0 || *h > f64::from(MAX_NOTIFICATION_HOURS))
        {
            return Err(ConfigError::InvalidValue {
                field: "default_times",
                reason: format!("hours must be in (0, {MAX_NOTIFICATION_HOURS}]"),
            }
            .into());
        }
        let check = self.notifications.check_interval_secs;
        if check == 0 || check > MAX_CHECK_INTERVAL_SECS {
            return Err(ConfigError::InvalidValue {
                field: "check_interval_secs",
                reason: format!("must be between 1 and {MAX_CHECK_INTERVAL_SECS}"),
            }
            .into());
        }
        let window = self.notifications.window_secs;
        if window <= 0 || window > MAX_WINDOW_SECS {
            return Err(ConfigError::InvalidValue {
                field: "window_secs",
                reason: format!("must be between 1 and {MAX_WINDOW_SECS}"),
            }
            .into());
        }
        if !(0..=MAX_DAYS).contains(&self.notifications.default_followup_days) {
            return Err(ConfigError::InvalidValue {
                field: "default_followup_days",
                reason: format!("must be between 0 and {MAX_DAYS}"),
            }
            .into());
        }

        if self.backup.hour > 23 {
            return Err(ConfigError::InvalidValue {
                field: "backup.hour",
                reason: "must be between 0 and 23".to_string(),
            }
            .into());
        }
        if !(1..=MAX_BACKUP_INTERVAL_HOURS).contains(&self.backup.interval_hours) {
            return Err(ConfigError::InvalidValue {
                field: "backup.interval_hours",
                reason: format!("must be between 1 and {MAX_BACKUP_INTERVAL_HOURS}"),
            }
            .into());
        }
        if !(1..=MAX_DAYS).contains(&self.backup.retention_days) {
            return Err(ConfigError::InvalidValue {
                field: "backup.retention_days",
                reason: format!("must be between 1 and {MAX_DAYS}"),
            }
            .into());
        }

        if self.web.enabled && self.web.host.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "web.host" }.into());
        }
        if self.telegram.webhook_enabled {
            warn!("Webhook delivery is not supported; falling back to long polling");
        }
        Ok(())
    }

    /// The Telegram bot token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when `BOT_TOKEN` is not set.
    pub fn bot_token(&self) -> Result<&str> {
        self.telegram
            .bot_token
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField { field: "BOT_TOKEN" }.into())
    }

    #[must_use]
    pub fn database_url(&self) -> String {
        self.storage.database_url()
    }

    /// The configured timezone. Validation guarantees it parses.
    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone.parse().unwrap_or(Tz::Europe__Moscow)
    }

    #[must_use]
    pub fn is_admin(&self, telegram_id: i64) -> bool {
        self.admin_ids.contains(&telegram_id)
    }

    /// Settings the conversation and services need.
    #[must_use]
    pub fn bot_settings(&self) -> BotSettings {
        let mut notification_times = self.notifications.default_times.clone();
        normalize_times(&mut notification_times);
        BotSettings {
            timezone: self.timezone(),
            locale: self.locale.clone(),
            notification_times,
            followup_days: self.notifications.default_followup_days,
            admin_ids: self.admin_ids.clone(),
            reminder_window_secs: self.notifications.window_secs,
        }
    }

    /// Settings for exports and backups.
    #[must_use]
    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            data_dir: self.storage.data_dir.clone(),
            backup_dir: self.storage.backup_dir.clone(),
            database_file: database_file(&self.database_url()),
            backup_enabled: self.backup.enabled,
            retention_days: self.backup.retention_days,
            timezone: self.timezone(),
        }
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn parse_admin_ids(value: &str) -> Result<Vec<i64>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_number("ADMIN_IDS", s))
        .collect()
}

/// Accepts `24,12,6` as well as a JSON array like `[24, 12, 6]`.
fn parse_times(value: &str) -> Result<Vec<f64>> {
    if value.starts_with('[') {
        return serde_json::from_str(value).map_err(|e| {
            ConfigError::InvalidValue {
                field: "DEFAULT_NOTIFICATION_TIMES",
                reason: e.to_string(),
            }
            .into()
        });
    }
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_number("DEFAULT_NOTIFICATION_TIMES", s))
        .collect()
}

fn parse_number<T>(field: &'static str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        ConfigError::InvalidValue {
            field,
            reason: e.to_string(),
        }
        .into()
    })
}

fn parse_bool(field: &'static str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            field,
            reason: format!("expected true or false, got '{other}'"),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    fn parse(content: &str, vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::parse_with_env(content, |key| vars.get(key).cloned())
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse("", &[]).unwrap();
        assert_eq!(config.timezone, "Europe/Moscow");
        assert_eq!(config.locale, "ru");
        assert_eq!(config.notifications.default_times, DEFAULT_NOTIFICATION_TIMES.to_vec());
        assert_eq!(config.notifications.check_interval_secs, 60);
        assert!(config.backup.enabled);
        assert_eq!(config.backup.hour, 3);
        assert_eq!(config.web.bind_address(), "0.0.0.0:8080");
        assert!(config.telegram.bot_token.is_none());
        assert!(config.admin_ids.is_empty());
    }

    #[test]
    fn file_values_are_read() {
        let config = parse(
            r#"
            timezone = "Asia/Almaty"
            admin_ids = [1, 2]

            [logging]
            level = "debug"
            format = "json"

            [notifications]
            default_times = [2.0, 1.0]

            [web]
            port = 9000
            "#,
            &[],
        )
        .unwrap();
        assert_eq!(config.timezone(), chrono_tz::Asia::Almaty);
        assert!(config.is_admin(2));
        assert!(!config.is_admin(3));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.notifications.default_times, vec![2.0, 1.0]);
        assert_eq!(config.web.port, 9000);
    }

    #[test]
    fn env_overrides_file() {
        let config = parse(
            "timezone = \"Asia/Almaty\"",
            &[
                ("BOT_TOKEN", "123:abc"),
                ("TZ", "Europe/Berlin"),
                ("ADMIN_IDS", "10, 20"),
                ("DEFAULT_NOTIFICATION_TIMES", "1, 24, 1"),
                ("BACKUP_ENABLED", "0"),
                ("DATA_DIR", "/data"),
                ("WEB_PORT", "8081"),
            ],
        )
        .unwrap();
        assert_eq!(config.bot_token().unwrap(), "123:abc");
        assert_eq!(config.timezone, "Europe/Berlin");
        assert_eq!(config.admin_ids, vec![10, 20]);
        assert!(!config.backup.enabled);
        assert_eq!(config.web.port, 8081);
        assert_eq!(config.database_url(), "sqlite+aiosqlite:////data/interviews.db");
        assert_eq!(config.bot_settings().notification_times, vec![24.0, 1.0]);
    }

    #[test]
    fn notification_times_accept_json() {
        let config = parse("", &[("DEFAULT_NOTIFICATION_TIMES", "[3, 0.5]")]).unwrap();
        assert_eq!(config.notifications.default_times, vec![3.0, 0.5]);
    }

    #[test]
    fn bot_token_is_never_read_from_file() {
        let config = parse("[telegram]\nbot_token = \"leaked\"", &[]).unwrap();
        assert!(config.bot_token().is_err());
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let err = parse("timezone = \"Mars/Olympus\"", &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { field: "timezone", .. })
        ));
    }

    #[test]
    fn out_of_range_times_are_rejected() {
        assert!(parse("[notifications]\ndefault_times = [200.0]", &[]).is_err());
        assert!(parse("[notifications]\ndefault_times = []", &[]).is_err());
        assert!(parse("", &[("DEFAULT_NOTIFICATION_TIMES", "-1")]).is_err());
    }

    #[test]
    fn malformed_env_values_are_rejected() {
        assert!(parse("", &[("ADMIN_IDS", "abc")]).is_err());
        assert!(parse("", &[("BACKUP_ENABLED", "maybe")]).is_err());
        assert!(parse("", &[("WEB_PORT", "99999")]).is_err());
    }

    #[test]
    fn invalid_backup_hour_is_rejected() {
        assert!(parse("[backup]\nhour = 24", &[]).is_err());
    }

    #[test]
    fn durations_beyond_the_supported_range_are_rejected() {
        let cases = [
            ("[notifications]\nwindow_secs = 100000000000000000", "window_secs"),
            ("[notifications]\ncheck_interval_secs = 100000000000", "check_interval_secs"),
            ("[notifications]\ndefault_followup_days = 1000000000", "default_followup_days"),
            ("[backup]\ninterval_hours = 10000000000000000", "backup.interval_hours"),
            ("[backup]\nretention_days = 100000000000", "backup.retention_days"),
        ];
        for (content, expected) in cases {
            match parse(content, &[]) {
                Err(Error::Config(ConfigError::InvalidValue { field, .. })) => {
                    assert_eq!(field, expected);
                }
                other => panic!("{content:?} gave {other:?}"),
            }
        }
        assert!(parse("", &[("DEFAULT_FOLLOWUP_DAYS", "1000000000")]).is_err());
        assert!(parse("", &[("BACKUP_INTERVAL_HOURS", "10000000000000000")]).is_err());

        let config = parse(
            r#"
            [notifications]
            window_secs = 86400
            default_followup_days = 3650

            [backup]
            interval_hours = 8760
            retention_days = 3650
            "#,
            &[],
        )
        .unwrap();
        assert_eq!(
            crate::infrastructure::bootstrap::scheduler_settings(&config)
                .backup
                .unwrap()
                .interval,
            std::time::Duration::from_secs(8760 * 3600)
        );
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = parse("timezone = ", &[]).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
    }

    #[test]
    fn export_settings_follow_database_url() {
        let config = parse("", &[("DATABASE_URL", ":memory:")]).unwrap();
        assert!(config.export_settings().database_file.is_none());
    }
}
