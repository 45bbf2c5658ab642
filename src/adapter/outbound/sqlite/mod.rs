//! SQLite persistence adapter.
//!
//! Provides the Diesel-backed [`SqliteRepository`] implementing every store
//! port, together with pool and migration helpers.

pub mod database;
pub mod repository;

pub use database::connection::{create_pool, database_file, database_path, run_migrations, DbPool};
pub use repository::SqliteRepository;
