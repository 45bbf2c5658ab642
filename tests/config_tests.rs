use std::path::PathBuf;

use parking_lot::Mutex;

use interview_bot::error::Error;
use interview_bot::infrastructure::config::settings::Config;

/// Serializes tests that touch the process environment.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: &[&str] = &[
    "BOT_TOKEN",
    "DATABASE_URL",
    "DATA_DIR",
    "BACKUP_PATH",
    "TZ",
    "DEFAULT_LOCALE",
    "ADMIN_IDS",
    "DEFAULT_NOTIFICATION_TIMES",
    "DEFAULT_FOLLOWUP_DAYS",
    "BACKUP_ENABLED",
    "BACKUP_INTERVAL_HOURS",
    "WEB_HOST",
    "WEB_PORT",
    "WEBHOOK_ENABLED",
    "WEBHOOK_URL",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
fn shipped_example_config_loads() {
    let _guard = ENV_LOCK.lock();
    clear_env();

    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.example.toml");
    let config = Config::load(path).unwrap();
    assert_eq!(config.timezone, "Europe/Moscow");
    assert_eq!(config.notifications.default_times.len(), 6);
    assert!(config.backup.enabled);
    assert!(config.web.enabled);
    assert!(config.bot_token().is_err());
}

#[test]
fn file_values_are_applied() {
    let _guard = ENV_LOCK.lock();
    clear_env();

    let (_dir, path) = write_config(
        r#"
timezone = "Asia/Almaty"
admin_ids = [7, 8]

[storage]
data_dir = "/srv/bot"

[notifications]
default_times = [1.0, 48.0]
default_followup_days = 5

[web]
port = 9000
"#,
    );
    let config = Config::load(&path).unwrap();

    assert_eq!(config.timezone(), chrono_tz::Asia::Almaty);
    assert!(config.is_admin(8));
    assert!(!config.is_admin(9));
    assert_eq!(config.web.bind_address(), "0.0.0.0:9000");
    assert!(config.database_url().ends_with("/srv/bot/interviews.db"));

    let settings = config.bot_settings();
    assert_eq!(settings.notification_times, vec![48.0, 1.0]);
    assert_eq!(settings.followup_days, 5);

    let export = config.export_settings();
    assert_eq!(export.database_file, Some(PathBuf::from("/srv/bot/interviews.db")));
}

#[test]
fn environment_overrides_the_file() {
    let _guard = ENV_LOCK.lock();
    clear_env();

    let (_dir, path) = write_config("timezone = \"Asia/Almaty\"\n");
    std::env::set_var("BOT_TOKEN", "123:abc");
    std::env::set_var("TZ", "Europe/Berlin");
    std::env::set_var("ADMIN_IDS", "1, 2");
    std::env::set_var("DEFAULT_NOTIFICATION_TIMES", "[2, 1]");
    std::env::set_var("BACKUP_ENABLED", "false");
    let loaded = Config::load(&path);
    clear_env();

    let config = loaded.unwrap();
    assert_eq!(config.bot_token().unwrap(), "123:abc");
    assert_eq!(config.timezone, "Europe/Berlin");
    assert_eq!(config.admin_ids, vec![1, 2]);
    assert_eq!(config.notifications.default_times, vec![2.0, 1.0]);
    assert!(!config.backup.enabled);
}

#[test]
fn container_environment_points_at_the_volume() {
    let _guard = ENV_LOCK.lock();
    clear_env();

    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("DATABASE_URL", "sqlite+aiosqlite:////data/interviews.db");
    std::env::set_var("DATA_DIR", "/data");
    std::env::set_var("BACKUP_PATH", "/app/backups");
    let loaded = Config::load_or_default(dir.path().join("config.toml"));
    clear_env();

    let export = loaded.unwrap().export_settings();
    assert_eq!(export.database_file, Some(PathBuf::from("/data/interviews.db")));
    assert_eq!(export.data_dir, PathBuf::from("/data"));
    assert_eq!(export.backup_dir, PathBuf::from("/app/backups"));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let _guard = ENV_LOCK.lock();
    clear_env();

    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.locale, "ru");
    assert!(matches!(
        Config::load(dir.path().join("absent.toml")),
        Err(Error::Config(_))
    ));
}

#[test]
fn invalid_values_are_rejected() {
    let _guard = ENV_LOCK.lock();
    clear_env();

    for content in [
        "timezone = \"Mars/Olympus\"\n",
        "[notifications]\ndefault_times = []\n",
        "[notifications]\ndefault_times = [-1.0]\n",
        "[backup]\nhour = 24\n",
        "[backup]\nretention_days = 0\n",
        "[backup]\nretention_days = 100000\n",
        "[backup]\ninterval_hours = 10000000000000000\n",
        "[notifications]\nwindow_secs = 100000000000000000\n",
        "[notifications]\ndefault_followup_days = 1000000000\n",
        "this is not toml",
    ] {
        let (_dir, path) = write_config(content);
        assert!(
            matches!(Config::load(&path), Err(Error::Config(_))),
            "{content:?} was accepted"
        );
    }

    let (_dir, path) = write_config("");
    std::env::set_var("WEB_PORT", "eighty");
    let loaded = Config::load(&path);
    clear_env();
    assert!(loaded.is_err());
}
