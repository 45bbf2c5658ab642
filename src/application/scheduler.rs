//! Background jobs: reminder passes and periodic backups.
//!
//! Both jobs run until the shutdown channel flips to `true` or is dropped.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::export::ExportService;
use super::html::escape;
use super::notification::NotificationService;
use crate::port::{Messenger, Repository};

/// When backups run.
#[derive(Debug, Clone, Copy)]
pub struct BackupSchedule {
    /// Local hour of the first backup.
    pub hour: u32,
    pub interval: Duration,
    pub timezone: Tz,
}

/// Job timing.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerSettings {
    pub check_interval: Duration,
    /// `None` disables the backup job.
    pub backup: Option<BackupSchedule>,
}

/// The first moment at or after `now` whose local time is `hour:00` in `tz`.
#[must_use]
pub fn next_backup_at(now: DateTime<Utc>, hour: u32, tz: Tz) -> DateTime<Utc> {
    let local_today = now.with_timezone(&tz).date_naive();
    for days in 0..=2 {
        let Some(day) = local_today.checked_add_days(Days::new(days)) else {
            break;
        };
        let Some(naive) = day.and_hms_opt(hour, 0, 0) else {
            break;
        };
        // A local time skipped by a DST change falls through to the next day.
        if let Some(at) = tz.from_local_datetime(&naive).earliest() {
            let at = at.with_timezone(&Utc);
            if at > now {
                return at;
            }
        }
    }
    now + chrono::Duration::days(1)
}

/// Returns `true` when the scheduler should stop.
async fn stopped(shutdown: &mut watch::Receiver<bool>) -> bool {
    match shutdown.changed().await {
        Ok(()) => *shutdown.borrow(),
        Err(_) => true,
    }
}

/// Drives [`NotificationService::tick`] and [`ExportService::create_backup`].
pub struct Scheduler<R, M> {
    notifications: NotificationService<R, M>,
    exports: ExportService<R>,
    messenger: Arc<M>,
    admin_ids: Vec<i64>,
    settings: SchedulerSettings,
}

impl<R: Repository, M: Messenger + 'static> Scheduler<R, M> {
    pub fn new(
        notifications: NotificationService<R, M>,
        exports: ExportService<R>,
        messenger: Arc<M>,
        admin_ids: Vec<i64>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            notifications,
            exports,
            messenger,
            admin_ids,
            settings,
        }
    }

    /// Start the jobs on the current runtime.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        let mut handles = vec![tokio::spawn(run_reminders(
            self.notifications,
            self.settings.check_interval,
            shutdown.clone(),
        ))];

        match self.settings.backup {
            Some(schedule) => {
                let job = BackupJob {
                    exports: self.exports,
                    messenger: self.messenger,
                    admin_ids: self.admin_ids,
                };
                handles.push(tokio::spawn(job.run(schedule, shutdown)));
            }
            None => info!("Automatic backups disabled"),
        }
        handles
    }
}

async fn run_reminders<R: Repository, M: Messenger + 'static>(
    service: NotificationService<R, M>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(period_secs = period.as_secs(), "Reminder job started");

    loop {
        tokio::select! {
            stop = stopped(&mut shutdown) => {
                if stop {
                    info!("Reminder job stopped");
                    break;
                }
            }
            _ = interval.tick() => {
                match service.tick(Utc::now()).await {
                    Ok(report) => debug!(?report, "Reminder pass finished"),
                    Err(e) => error!(error = %e, "Reminder pass failed"),
                }
            }
        }
    }
}

struct BackupJob<R, M> {
    exports: ExportService<R>,
    messenger: Arc<M>,
    admin_ids: Vec<i64>,
}

impl<R: Repository, M: Messenger + 'static> BackupJob<R, M> {
    async fn run(self, schedule: BackupSchedule, mut shutdown: watch::Receiver<bool>) {
        let first = next_backup_at(Utc::now(), schedule.hour, schedule.timezone);
        info!(first = %first, interval_secs = schedule.interval.as_secs(), "Backup job scheduled");

        let delay = (first - Utc::now()).to_std().unwrap_or_default();
        let start = tokio::time::Instant::now() + delay;
        let mut interval = tokio::time::interval_at(start, schedule.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                stop = stopped(&mut shutdown) => {
                    if stop {
                        info!("Backup job stopped");
                        break;
                    }
                }
                _ = interval.tick() => self.backup(Utc::now()).await,
            }
        }
    }

    async fn backup(&self, now: DateTime<Utc>) {
        let path = match self.exports.create_backup(now).await {
            Ok(Some(path)) => path,
            Ok(None) => {
                warn!("Automatic backup skipped");
                return;
            }
            Err(e) => {
                error!(error = %e, "Automatic backup failed");
                return;
            }
        };

        let text = format!(
            "✅ Автоматическая резервная копия создана\n\n📁 {}",
            escape(&path.display().to_string())
        );
        for admin in &self.admin_ids {
            if let Err(e) = self.messenger.send_text(*admin, &text).await {
                error!(admin, error = %e, "Failed to notify admin about backup");
            }
        }
    }
}
