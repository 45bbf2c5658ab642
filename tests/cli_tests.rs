use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

/// The binary with a clean environment rooted in `dir`.
fn bot(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("interview-bot").unwrap();
    cmd.current_dir(dir)
        .env_remove("BOT_TOKEN")
        .env_remove("DATABASE_URL")
        .env_remove("TZ")
        .env_remove("RUST_LOG")
        .env("DATA_DIR", dir.join("data"))
        .env("BACKUP_PATH", dir.join("backups"));
    cmd
}

#[test]
fn help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    bot(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("backup"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn init_writes_config_and_database() {
    let dir = tempfile::tempdir().unwrap();
    bot(dir.path()).arg("init").assert().success();

    let config = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(config.contains("[notifications]"));
    assert!(dir.path().join("data").join("interviews.db").exists());
    assert!(dir.path().join("backups").is_dir());

    // A second run must not clobber the file.
    bot(dir.path()).arg("init").assert().failure();
    bot(dir.path()).args(["init", "--force"]).assert().success();
}

#[test]
fn check_fails_without_a_token() {
    let dir = tempfile::tempdir().unwrap();
    bot(dir.path())
        .args(["--json", "check"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"status\":\"unhealthy\""))
        .stdout(predicate::str::contains("Bot token"));
}

#[test]
fn check_passes_with_token_and_writable_storage() {
    let dir = tempfile::tempdir().unwrap();
    bot(dir.path())
        .env("BOT_TOKEN", "123456:TEST")
        .args(["--json", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\":\"healthy\""));
}

#[test]
fn backup_copies_the_database() {
    let dir = tempfile::tempdir().unwrap();
    bot(dir.path()).args(["init", "--no-config"]).assert().success();
    bot(dir.path()).arg("backup").assert().success();

    let backups: Vec<_> = std::fs::read_dir(dir.path().join("backups"))
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("backup_"))
        .collect();
    assert_eq!(backups.len(), 1);
}

#[test]
fn invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "timezone = \"Nowhere/City\"\n").unwrap();
    bot(dir.path()).arg("check").assert().failure();
}
