//! Handler for the `check` command.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::error::{Error, Result};
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::Config;
use crate::port::HealthProbe;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Healthy,
    Unhealthy(String),
}

#[derive(Debug, Clone)]
pub struct CheckEntry {
    pub name: &'static str,
    /// A failed critical check fails the whole report.
    pub critical: bool,
    pub status: CheckStatus,
}

#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub checks: Vec<CheckEntry>,
}

impl CheckReport {
    fn push(&mut self, name: &'static str, critical: bool, result: std::result::Result<(), String>) {
        let status = match result {
            Ok(()) => CheckStatus::Healthy,
            Err(reason) => CheckStatus::Unhealthy(reason),
        };
        self.checks.push(CheckEntry {
            name,
            critical,
            status,
        });
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.checks
            .iter()
            .all(|check| !check.critical || check.status == CheckStatus::Healthy)
    }
}

fn writable(dir: &Path) -> std::result::Result<(), String> {
    std::fs::create_dir_all(dir).map_err(|e| e.to_string())?;
    let probe = dir.join(".write-check");
    std::fs::write(&probe, b"ok").map_err(|e| e.to_string())?;
    std::fs::remove_file(&probe).map_err(|e| e.to_string())
}

/// Run every readiness check against a loaded configuration.
pub async fn report(config: &Config) -> CheckReport {
    let mut report = CheckReport::default();

    report.push("Bot token", true, config.bot_token().map(|_| ()).map_err(|e| e.to_string()));
    report.push("Data directory", true, writable(&config.storage.data_dir));
    report.push("Backup directory", config.backup.enabled, writable(&config.storage.backup_dir));

    let database = match bootstrap::open_repository(config) {
        Ok(repo) => repo.ping().await.map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    report.push("Database", true, database);
    report
}

/// Validate configuration and storage without starting the bot.
pub async fn execute(config_path: &Path) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let report = report(&config).await;

    if output::is_json() {
        let checks = report
            .checks
            .iter()
            .map(|check| {
                let (status, details) = match &check.status {
                    CheckStatus::Healthy => ("healthy", None),
                    CheckStatus::Unhealthy(reason) => ("unhealthy", Some(reason.as_str())),
                };
                json!({
                    "name": check.name,
                    "critical": check.critical,
                    "status": status,
                    "details": details,
                })
            })
            .collect::<Vec<_>>();
        println!(
            "{}",
            json!({
                "command": "check",
                "status": if report.is_healthy() { "healthy" } else { "unhealthy" },
                "checks": checks,
            })
        );
    } else {
        output::section("Configuration");
        output::field("Config", config_path.display());
        output::field("Database", config.database_url());
        output::field("Timezone", &config.timezone);

        output::section("Checks");
        for check in &report.checks {
            let suffix = if check.critical { "" } else { " (optional)" };
            match &check.status {
                CheckStatus::Healthy => output::success(&format!("{}{suffix}", check.name)),
                CheckStatus::Unhealthy(reason) => {
                    output::warning(&format!("{}{suffix}: {reason}", check.name));
                }
            }
        }
    }

    if !report.is_healthy() {
        output::error("Check failed");
        output::hint("set BOT_TOKEN and make sure the data directory is writable");
        return Err(Error::Connection("readiness check failed".to_string()));
    }
    output::success("Ready to run");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.storage.data_dir = dir.join("data");
        config.storage.backup_dir = dir.join("backups");
        config
    }

    #[tokio::test]
    async fn missing_token_fails_the_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = report(&config_in(dir.path())).await;

        assert!(!report.is_healthy());
        let token = report.checks.iter().find(|c| c.name == "Bot token").unwrap();
        assert!(matches!(token.status, CheckStatus::Unhealthy(_)));
        let database = report.checks.iter().find(|c| c.name == "Database").unwrap();
        assert_eq!(database.status, CheckStatus::Healthy);
    }

    #[tokio::test]
    async fn ready_with_token_and_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.telegram.bot_token = Some("123:abc".into());

        assert!(report(&config).await.is_healthy());
    }

    #[test]
    fn optional_failures_do_not_fail_the_report() {
        let mut report = CheckReport::default();
        report.push("Database", true, Ok(()));
        report.push("Backup directory", false, Err("read-only".into()));
        assert!(report.is_healthy());

        report.push("Data directory", true, Err("read-only".into()));
        assert!(!report.is_healthy());
    }
}
