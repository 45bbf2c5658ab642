//! Calendar and JSON exports, and database backups.
//!
//! Exports are written to the data directory and handed to the caller as a
//! path; the caller deletes the file after delivery. Backups are copies of the
//! live SQLite file, recorded in the `backups` table and pruned after the
//! retention period.

pub mod backup;
pub mod ics;
pub mod json;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use self::json::ExportDocument;
use super::ExportSettings;
use crate::domain::{Interview, NewBackupRecord, User};
use crate::error::{ConfigError, Error, Result};
use crate::port::Repository;

/// Produces export files and backups.
pub struct ExportService<R> {
    repo: Arc<R>,
    settings: ExportSettings,
}

impl<R> Clone for ExportService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            settings: self.settings.clone(),
        }
    }
}

impl<R: Repository> ExportService<R> {
    pub fn new(repo: Arc<R>, settings: ExportSettings) -> Self {
        Self { repo, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    async fn user(&self, telegram_id: i64) -> Result<User> {
        self.repo
            .find_user(telegram_id)
            .await?
            .ok_or(Error::NotFound { entity: "user" })
    }

    fn stamp(&self, now: DateTime<Utc>) -> String {
        now.with_timezone(&self.settings.timezone)
            .format("%Y%m%d_%H%M%S")
            .to_string()
    }

    async fn write(&self, name: String, contents: String) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.settings.data_dir).await?;
        let path = self.settings.data_dir.join(name);
        tokio::fs::write(&path, contents).await?;
        Ok(path)
    }

    /// Write the user's interviews as an `.ics` file.
    ///
    /// Without `ids` every upcoming interview is exported. With `ids` only the
    /// listed interviews the user owns are. Returns `None` when nothing
    /// matches.
    pub async fn export_ics(
        &self,
        telegram_id: i64,
        ids: Option<&[i32]>,
        now: DateTime<Utc>,
    ) -> Result<Option<PathBuf>> {
        let user = self.user(telegram_id).await?;
        let interviews: Vec<Interview> = match ids {
            Some(ids) => {
                let mut found = Vec::with_capacity(ids.len());
                for &id in ids {
                    if let Some(interview) = self.repo.find_interview(user.id, id).await? {
                        found.push(interview);
                    }
                }
                found
            }
            None => self.repo.list_interviews(user.id, false, now).await?,
        };
        if interviews.is_empty() {
            return Ok(None);
        }

        let calendar = ics::render_calendar(&interviews, now);
        let name = format!("interviews_{telegram_id}_{}.ics", self.stamp(now));
        let path = self.write(name, calendar).await?;
        info!(telegram_id, count = interviews.len(), path = %path.display(), "Calendar exported");
        Ok(Some(path))
    }

    /// Write every interview of the user as pretty printed JSON.
    pub async fn export_json(&self, telegram_id: i64, now: DateTime<Utc>) -> Result<PathBuf> {
        let user = self.user(telegram_id).await?;
        let interviews = self.repo.list_interviews(user.id, true, now).await?;
        let document = ExportDocument::new(&user, &interviews, now);

        let name = format!("interviews_export_{telegram_id}_{}.json", self.stamp(now));
        let path = self.write(name, document.to_pretty_json()?).await?;
        info!(telegram_id, count = interviews.len(), path = %path.display(), "JSON exported");
        Ok(path)
    }

    /// Copy the database into the backup directory.
    ///
    /// Returns `None` when backups are disabled or the database is not a file.
    /// Records older than the retention period are pruned along with their
    /// files.
    pub async fn create_backup(&self, now: DateTime<Utc>) -> Result<Option<PathBuf>> {
        if !self.settings.backup_enabled {
            return Ok(None);
        }
        let Some(database) = self.settings.database_file.as_deref() else {
            warn!("Backups are only supported for file databases");
            return Ok(None);
        };
        if !tokio::fs::try_exists(database).await? {
            warn!(path = %database.display(), "Database file not found");
            return Ok(None);
        }

        let cutoff = Duration::try_days(self.settings.retention_days)
            .and_then(|age| now.checked_sub_signed(age))
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "backup.retention_days",
                reason: format!("{} days is out of range", self.settings.retention_days),
            })?;

        let name = backup::backup_file_name(now, self.settings.timezone);
        let (path, size) =
            backup::copy_database(database, &self.settings.backup_dir, &name).await?;
        self.repo
            .record_backup(&NewBackupRecord {
                filename: name,
                filepath: path.display().to_string(),
                size_bytes: i64::try_from(size).unwrap_or(i64::MAX),
                created_at: now,
            })
            .await?;

        let pruned = self.repo.prune_backups(cutoff).await?;
        let removed = backup::remove_files(&pruned).await;
        info!(
            path = %path.display(),
            size,
            pruned = pruned.len(),
            removed,
            "Backup created"
        );
        Ok(Some(path))
    }
}
