//! Database backup metadata.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct BackupRecord {
    pub id: i32,
    pub filename: String,
    pub filepath: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBackupRecord {
    pub filename: String,
    pub filepath: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}
