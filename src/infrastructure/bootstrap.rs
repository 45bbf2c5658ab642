//! Composition root for runtime wiring.
//!
//! ```text
//! Config ──► SqliteRepository ──┬─► InterviewService ──────┐
//!                               ├─► NotificationService ───┼─► Conversation ──► Telegram dispatcher
//!                               ├─► ExportService ─────────┘
//!                               ├─► Scheduler (reminders, backups)
//!                               └─► health server
//! ```

use std::sync::Arc;
use std::time::Duration;

use teloxide::Bot;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::adapter::inbound::web;
use crate::adapter::outbound::sqlite::{create_pool, database_path, run_migrations, SqliteRepository};
use crate::adapter::outbound::telegram::{self, TelegramMessenger};
use crate::application::conversation::{Conversation, DialogueStorage};
use crate::application::export::ExportService;
use crate::application::interview::InterviewService;
use crate::application::notification::NotificationService;
use crate::application::scheduler::{BackupSchedule, Scheduler, SchedulerSettings};
use crate::error::Result;
use crate::infrastructure::config::Config;

/// Switches for [`run`] that come from the command line.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub web: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { web: true }
    }
}

/// Create the data and backup directories.
///
/// # Errors
/// Returns an error if a directory cannot be created.
pub fn prepare_directories(config: &Config) -> Result<()> {
    std::fs::create_dir_all(&config.storage.data_dir)?;
    std::fs::create_dir_all(&config.storage.backup_dir)?;
    Ok(())
}

/// Open the database, apply migrations and wrap it in a repository.
///
/// # Errors
/// Returns an error if the directories, the pool or the migrations fail.
pub fn open_repository(config: &Config) -> Result<Arc<SqliteRepository>> {
    prepare_directories(config)?;
    let url = config.database_url();
    let pool = create_pool(&url)?;
    run_migrations(&pool)?;
    info!(database = %database_path(&url), "Database ready");
    Ok(Arc::new(SqliteRepository::new(pool)))
}

#[must_use]
pub fn export_service(config: &Config, repo: &Arc<SqliteRepository>) -> ExportService<SqliteRepository> {
    ExportService::new(Arc::clone(repo), config.export_settings())
}

/// Job timing derived from configuration.
#[must_use]
pub fn scheduler_settings(config: &Config) -> SchedulerSettings {
    let backup = config.backup.enabled.then(|| BackupSchedule {
        hour: config.backup.hour,
        interval: Duration::from_secs(config.backup.interval_hours.saturating_mul(3600)),
        timezone: config.timezone(),
    });
    SchedulerSettings {
        check_interval: Duration::from_secs(config.notifications.check_interval_secs),
        backup,
    }
}

/// Run the bot until Ctrl-C.
///
/// Starts the Telegram dispatcher, the reminder and backup jobs and, when
/// enabled, the health server. All of them stop on the same shutdown signal.
///
/// # Errors
/// Returns an error if the bot token is missing, the database cannot be
/// opened or the health server cannot bind.
pub async fn run(config: Config, options: RunOptions) -> Result<()> {
    let token = config.bot_token()?.to_string();
    let repo = open_repository(&config)?;

    let bot = Bot::new(token);
    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));
    let settings = config.bot_settings();

    let interviews = InterviewService::new(Arc::clone(&repo), settings.clone());
    let notifications =
        NotificationService::new(Arc::clone(&repo), Arc::clone(&messenger), settings.clone());
    let exports = export_service(&config, &repo);
    let conversation = Conversation::new(
        interviews,
        notifications.clone(),
        exports.clone(),
        Arc::new(DialogueStorage::default()),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut handles = Scheduler::new(
        notifications,
        exports,
        messenger,
        settings.admin_ids.clone(),
        scheduler_settings(&config),
    )
    .spawn(shutdown_rx.clone());

    if options.web && config.web.enabled {
        let listener = TcpListener::bind(config.web.bind_address()).await?;
        let probe = Arc::clone(&repo);
        let shutdown = shutdown_rx.clone();
        handles.push(tokio::spawn(async move {
            if let Err(e) = web::serve(listener, probe, shutdown).await {
                error!(error = %e, "Health server failed");
            }
        }));
    } else {
        info!("Health server disabled");
    }

    info!(
        timezone = %settings.timezone,
        admins = settings.admin_ids.len(),
        "Bot started"
    );

    let polling = telegram::runtime::run(bot, conversation, shutdown_rx);
    tokio::pin!(polling);

    tokio::select! {
        () = &mut polling => warn!("Telegram polling ended unexpectedly"),
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "Failed to listen for the shutdown signal");
            }
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
            polling.await;
        }
    }

    let _ = shutdown_tx.send(true);
    for handle in handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "Background task ended abnormally");
        }
    }
    info!("Bot stopped");
    Ok(())
}
