//! Handler for the `run` command.

use std::path::Path;

use tracing::info;

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::bootstrap::{self, RunOptions};
use crate::infrastructure::config::Config;

/// Execute the run command.
pub async fn execute(config_path: &Path, args: &RunArgs) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    config.init_logging();

    if !args.no_banner {
        print_startup(&config, args);
    }
    info!(config = %config_path.display(), "interview-bot starting");

    bootstrap::run(config, RunOptions { web: !args.no_web }).await
}

fn print_startup(config: &Config, args: &RunArgs) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Database", config.database_url());
    output::field("Backups", config.storage.backup_dir.display());
    output::field("Timezone", &config.timezone);
    if config.web.enabled && !args.no_web {
        output::field("Health", format!("http://{}/health", config.web.bind_address()));
    }
    if output::verbosity() > 0 {
        output::field("Admins", config.admin_ids.len());
        output::field("Check every", format!("{}s", config.notifications.check_interval_secs));
    }
    if !config.backup.enabled {
        output::warning("Automatic backups are disabled");
    }
}
