//! Database file backups.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::domain::BackupRecord;
use crate::error::Result;

/// File name for a backup taken at `at`, rendered in `tz`.
#[must_use]
pub fn backup_file_name(at: DateTime<Utc>, tz: Tz) -> String {
    format!("backup_{}.db", at.with_timezone(&tz).format("%Y%m%d_%H%M%S"))
}

/// Copy `database` into `dir` and return the new file's path and size.
pub async fn copy_database(database: &Path, dir: &Path, name: &str) -> Result<(PathBuf, u64)> {
    tokio::fs::create_dir_all(dir).await?;
    let target = dir.join(name);
    let size = tokio::fs::copy(database, &target).await?;
    debug!(from = %database.display(), to = %target.display(), size, "Database copied");
    Ok((target, size))
}

/// Delete the files behind pruned backup records.
///
/// Missing files are ignored. Returns how many files were removed.
pub async fn remove_files(records: &[BackupRecord]) -> usize {
    let mut removed = 0;
    for record in records {
        match tokio::fs::remove_file(&record.filepath).await {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %record.filepath, error = %e, "Failed to remove old backup"),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_uses_local_time() {
        let at = Utc.with_ymd_and_hms(2030, 6, 1, 22, 15, 30).unwrap();
        assert_eq!(
            backup_file_name(at, chrono_tz::Europe::Moscow),
            "backup_20300602_011530.db"
        );
    }

    #[tokio::test]
    async fn copies_and_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("live.db");
        std::fs::write(&db, b"sqlite").unwrap();

        let (path, size) = copy_database(&db, &dir.path().join("backups"), "b.db")
            .await
            .unwrap();
        assert_eq!(size, 6);
        assert!(path.exists());

        let record = BackupRecord {
            id: 1,
            filename: "b.db".into(),
            filepath: path.display().to_string(),
            size_bytes: 6,
            created_at: Utc::now(),
        };
        let missing = BackupRecord {
            filepath: dir.path().join("gone.db").display().to_string(),
            ..record.clone()
        };
        assert_eq!(remove_files(&[record, missing]).await, 1);
        assert!(!path.exists());
    }
}
