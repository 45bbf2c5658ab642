//! Database and file locations.

use std::path::PathBuf;

use serde::Deserialize;

/// Where the bot keeps its database, exports and backups.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite URL or path. Derived from `data_dir` when unset.
    pub database_url: Option<String>,
    /// Directory for the database file and temporary exports.
    pub data_dir: PathBuf,
    /// Directory for database backups.
    pub backup_dir: PathBuf,
}

impl StorageConfig {
    /// The configured database URL, or `interviews.db` inside `data_dir`.
    #[must_use]
    pub fn database_url(&self) -> String {
        match &self.database_url {
            Some(url) if !url.trim().is_empty() => url.clone(),
            _ => format!(
                "sqlite+aiosqlite:///{}",
                self.data_dir.join("interviews.db").display()
            ),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            data_dir: PathBuf::from("./data"),
            backup_dir: PathBuf::from("./backups"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_url_defaults_to_data_dir() {
        let storage = StorageConfig {
            data_dir: PathBuf::from("/data"),
            ..Default::default()
        };
        assert_eq!(storage.database_url(), "sqlite+aiosqlite:////data/interviews.db");
    }

    #[test]
    fn explicit_database_url_wins() {
        let storage = StorageConfig {
            database_url: Some("sqlite:///tmp/x.db".into()),
            ..Default::default()
        };
        assert_eq!(storage.database_url(), "sqlite:///tmp/x.db");
    }
}
