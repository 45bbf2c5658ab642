//! Handler for the `backup` command.

use std::path::Path;

use chrono::Utc;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::Config;

/// Take a backup now, using the same rules as the scheduled job.
pub async fn execute(config_path: &Path) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    config.init_logging();

    let repo = bootstrap::open_repository(&config)?;
    let exports = bootstrap::export_service(&config, &repo);

    output::section("Backup");
    match exports.create_backup(Utc::now()).await? {
        Some(path) => {
            output::success("Backup created");
            output::field("Path", path.display());
        }
        None if !config.backup.enabled => {
            output::warning("Backups are disabled (BACKUP_ENABLED=false)");
        }
        None => {
            output::warning("Nothing to back up: the database is not a file");
        }
    }
    Ok(())
}
