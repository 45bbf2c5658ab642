//! Database connection management using Diesel ORM.
//!
//! Provides connection pooling, migration support, and connection
//! configuration for SQLite databases.

use std::path::{Path, PathBuf};
use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Embedded database migrations compiled from the migrations/ directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Type alias for a SQLite connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

const BUSY_TIMEOUT_MS: u32 = 5000;

/// Applies pragmas to every connection the pool opens.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&pragmas())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

fn pragmas() -> String {
    format!("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {BUSY_TIMEOUT_MS};")
}

/// Strip a SQLAlchemy or URI style prefix from a database URL.
///
/// Accepts `sqlite+aiosqlite:///path`, `sqlite:///path`, `sqlite://path`,
/// `file:path` and plain paths. `:memory:` is returned unchanged.
#[must_use]
pub fn database_path(url: &str) -> String {
    let url = url.trim();
    for prefix in ["sqlite+aiosqlite:///", "sqlite:///"] {
        if let Some(rest) = url.strip_prefix(prefix) {
            return rest.to_string();
        }
    }
    for prefix in ["sqlite://", "file:"] {
        if let Some(rest) = url.strip_prefix(prefix) {
            return rest.to_string();
        }
    }
    url.to_string()
}

/// The database file behind `url`, or `None` for an in-memory database.
#[must_use]
pub fn database_file(url: &str) -> Option<PathBuf> {
    let path = database_path(url);
    if path.is_empty() || path == ":memory:" || path.contains("mode=memory") {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

/// Create a connection pool for the given database URL.
///
/// The parent directory of a file database is created if missing.
///
/// # Errors
/// Returns an error if the pool cannot be created.
pub fn create_pool(database_url: &str) -> Result<DbPool> {
    let path = database_path(database_url);
    if let Some(parent) = database_file(database_url)
        .as_deref()
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }

    debug!(path = %path, "Opening SQLite pool");
    let manager = ConnectionManager::<SqliteConnection>::new(path);
    Pool::builder()
        .max_size(5)
        .connection_timeout(Duration::from_secs(10))
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
        .map_err(|e| Error::Connection(e.to_string()))
}

/// Run all pending database migrations.
///
/// # Errors
/// Returns an error if migrations fail.
pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| Error::Database(e.to_string()))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "Applied database migrations");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::prelude::*;

    #[derive(diesel::QueryableByName)]
    struct TableName {
        #[diesel(sql_type = diesel::sql_types::Text)]
        name: String,
    }

    #[derive(diesel::QueryableByName)]
    struct ForeignKeys {
        #[diesel(sql_type = diesel::sql_types::Integer)]
        foreign_keys: i32,
    }

    fn memory_pool() -> DbPool {
        // A single connection keeps the in-memory database alive between checkouts.
        let manager = ConnectionManager::<SqliteConnection>::new(":memory:");
        Pool::builder()
            .max_size(1)
            .connection_customizer(Box::new(SqlitePragmas))
            .build(manager)
            .unwrap()
    }

    #[test]
    fn database_path_accepts_url_forms() {
        assert_eq!(
            database_path("sqlite+aiosqlite:///./data/interviews.db"),
            "./data/interviews.db"
        );
        assert_eq!(database_path("sqlite:////data/interviews.db"), "/data/interviews.db");
        assert_eq!(database_path("sqlite://interviews.db"), "interviews.db");
        assert_eq!(database_path("file:interviews.db"), "interviews.db");
        assert_eq!(database_path("interviews.db"), "interviews.db");
        assert_eq!(database_path(":memory:"), ":memory:");
    }

    #[test]
    fn memory_database_has_no_file() {
        assert_eq!(database_file(":memory:"), None);
        assert_eq!(
            database_file("sqlite:///data/x.db"),
            Some(PathBuf::from("data/x.db"))
        );
    }

    #[test]
    fn run_migrations_creates_tables() {
        let pool = memory_pool();
        run_migrations(&pool).unwrap();

        let mut conn = pool.get().unwrap();
        let tables: Vec<String> = diesel::sql_query(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name",
        )
        .load::<TableName>(&mut conn)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();

        for table in [
            "backups",
            "followups",
            "interview_status_history",
            "interview_templates",
            "interviews",
            "notification_logs",
            "notification_settings",
            "recruiters",
            "users",
        ] {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
    }

    #[test]
    fn run_migrations_is_idempotent() {
        let pool = memory_pool();
        run_migrations(&pool).unwrap();
        run_migrations(&pool).unwrap();
    }

    #[test]
    fn connections_enforce_foreign_keys() {
        let pool = memory_pool();
        let mut conn = pool.get().unwrap();
        let rows: Vec<ForeignKeys> = diesel::sql_query("PRAGMA foreign_keys")
            .load(&mut conn)
            .unwrap();
        assert_eq!(rows[0].foreign_keys, 1);
    }

    #[test]
    fn create_pool_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("interviews.db");
        let url = format!("sqlite+aiosqlite:///{}", path.display());

        let pool = create_pool(&url).unwrap();
        run_migrations(&pool).unwrap();
        assert!(path.exists());
    }
}
