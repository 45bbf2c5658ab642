//! Handler for the `init` command.
//!
//! Writes a documented config file and prepares the database so that `run`
//! starts against a migrated schema.

use std::fs;
use std::path::Path;

use crate::adapter::inbound::cli::command::InitArgs;
use crate::adapter::inbound::cli::output;
use crate::error::{ConfigError, Result};
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::Config;

/// Documented configuration template.
pub const CONFIG_TEMPLATE: &str = include_str!("../../../../config.example.toml");

/// Execute `init`.
pub fn execute(path: &Path, args: &InitArgs) -> Result<()> {
    if !args.no_config {
        write_config(path, args.force)?;
    }

    let config = Config::load_or_default(path)?;
    bootstrap::open_repository(&config)?;

    output::section("Storage");
    output::success("Database migrated");
    output::field("Database", config.database_url());
    output::field("Data", config.storage.data_dir.display());
    output::field("Backups", config.storage.backup_dir.display());

    output::section("Next Steps");
    output::note("1. Set BOT_TOKEN in the environment or in .env");
    output::note(&format!("2. Run: interview-bot --config {} check", path.display()));
    output::note(&format!("3. Run: interview-bot --config {} run", path.display()));
    Ok(())
}

fn write_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            field: "config",
            reason: format!("{} already exists (use --force to overwrite)", path.display()),
        }
        .into());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, CONFIG_TEMPLATE)?;

    output::section("Config");
    output::success("Created configuration file");
    output::field("Path", path.display());
    Ok(())
}
