//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use tempfile::TempDir;

use interview_bot::adapter::outbound::sqlite::{create_pool, run_migrations, SqliteRepository};
use interview_bot::application::conversation::{Conversation, DialogueStorage};
use interview_bot::application::export::ExportService;
use interview_bot::application::interview::InterviewService;
use interview_bot::application::notification::NotificationService;
use interview_bot::application::{BotSettings, ExportSettings};
use interview_bot::domain::{InterviewDraft, InterviewType};
use interview_bot::error::{Error, Result};
use interview_bot::port::Messenger;

/// Temporary SQLite database with migrations applied.
///
/// The directory also holds exports and backups and is removed on drop.
pub struct TempDb {
    dir: TempDir,
    repo: Arc<SqliteRepository>,
}

impl TempDb {
    pub fn create() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let file = dir.path().join("interviews.db");
        let pool = create_pool(&file.display().to_string()).expect("create sqlite pool");
        run_migrations(&pool).expect("run migrations");
        Self {
            dir,
            repo: Arc::new(SqliteRepository::new(pool)),
        }
    }

    pub fn repo(&self) -> Arc<SqliteRepository> {
        Arc::clone(&self.repo)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn database_file(&self) -> PathBuf {
        self.dir.path().join("interviews.db")
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            data_dir: self.dir.path().join("data"),
            backup_dir: self.dir.path().join("backups"),
            database_file: Some(self.database_file()),
            backup_enabled: true,
            retention_days: 30,
            timezone: chrono_tz::Europe::Moscow,
        }
    }
}

/// A message captured by [`RecordingMessenger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text {
        chat_id: i64,
        html: String,
    },
    Document {
        chat_id: i64,
        path: PathBuf,
        caption: Option<String>,
    },
}

/// Thread-safe message collector for delivery assertions.
#[derive(Clone, Default)]
pub struct RecordingMessenger {
    sent: Arc<Mutex<Vec<Sent>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following delivery fail (or succeed again).
    pub fn fail(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    pub fn texts(&self) -> Vec<(i64, String)> {
        self.sent
            .lock()
            .iter()
            .filter_map(|sent| match sent {
                Sent::Text { chat_id, html } => Some((*chat_id, html.clone())),
                Sent::Document { .. } => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }

    fn outcome(&self) -> Result<()> {
        if *self.failing.lock() {
            Err(Error::Connection("messenger offline".into()))
        } else {
            Ok(())
        }
    }
}

impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat_id: i64, html: &str) -> Result<()> {
        self.outcome()?;
        self.sent.lock().push(Sent::Text {
            chat_id,
            html: html.to_string(),
        });
        Ok(())
    }

    async fn send_document(&self, chat_id: i64, path: &Path, caption: Option<&str>) -> Result<()> {
        self.outcome()?;
        self.sent.lock().push(Sent::Document {
            chat_id,
            path: path.to_path_buf(),
            caption: caption.map(str::to_string),
        });
        Ok(())
    }
}

/// Services wired against a temporary database and a recording messenger.
pub struct Harness {
    pub db: TempDb,
    pub messenger: Arc<RecordingMessenger>,
    pub settings: BotSettings,
    pub interviews: InterviewService<SqliteRepository>,
    pub notifications: NotificationService<SqliteRepository, RecordingMessenger>,
    pub exports: ExportService<SqliteRepository>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(BotSettings::default())
    }

    pub fn with_settings(settings: BotSettings) -> Self {
        let db = TempDb::create();
        let messenger = Arc::new(RecordingMessenger::new());
        let interviews = InterviewService::new(db.repo(), settings.clone());
        let notifications =
            NotificationService::new(db.repo(), Arc::clone(&messenger), settings.clone());
        let exports = ExportService::new(db.repo(), db.export_settings());
        Self {
            db,
            messenger,
            settings,
            interviews,
            notifications,
            exports,
        }
    }

    pub fn conversation(&self) -> Conversation<SqliteRepository, RecordingMessenger> {
        Conversation::new(
            self.interviews.clone(),
            self.notifications.clone(),
            self.exports.clone(),
            Arc::new(DialogueStorage::new()),
        )
    }
}

/// A fixed instant: 2030-03-10 09:00 UTC (12:00 in Moscow).
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 3, 10, 9, 0, 0).unwrap()
}

pub fn in_hours(hours: f64) -> DateTime<Utc> {
    base_time() + Duration::seconds((hours * 3600.0) as i64)
}

/// A complete draft for an interview at `at`.
pub fn draft(company: &str, at: DateTime<Utc>) -> InterviewDraft {
    InterviewDraft {
        company_name: Some(company.to_string()),
        position: Some("Rust Developer".to_string()),
        vacancy_url: Some("https://jobs.example.com/42".to_string()),
        recruiter_name: Some("Anna".to_string()),
        interview_date: Some(at),
        platform_name: Some("Zoom".to_string()),
        platform_url: Some("https://zoom.us/j/1".to_string()),
        camera_required: Some(true),
        interview_type: Some(InterviewType::Technical),
    }
}
