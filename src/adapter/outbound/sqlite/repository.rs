//! SQLite repository implementation.
//!
//! Implements every store port on top of a Diesel r2d2 pool. Queries are
//! synchronous and short; each method checks out a connection for its
//! duration only.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::SqliteConnection;
use tracing::debug;

use super::database::connection::DbPool;
use super::database::model::{
    encode_checklist, format_timestamp, BackupRow, FollowUpRow, InterviewRow, NewBackupRow,
    NewFollowUpRow, NewInterviewRow, NewNotificationLogRow, NewRecruiterRow, NewSettingsRow,
    NewStatusHistoryRow, NewTemplateRow, NewUserRow, RecruiterRow, SettingsRow, StatusHistoryRow,
    TemplateRow, UserRow,
};
use super::database::schema::{
    backups, followups, interview_status_history, interview_templates, interviews,
    notification_logs, notification_settings, recruiters, users,
};
use crate::domain::{
    BackupRecord, FollowUp, Interview, InterviewStatus, InterviewTemplate, NewBackupRecord,
    NewFollowUp, NewInterview, NewNotificationLog, NewRecruiter, NewTemplate, NewUser,
    NotificationKind, NotificationSettings, Recruiter, StatusChange, StatusHistoryEntry, User,
};
use crate::error::{Error, Result};
use crate::port::outbound::store::{
    BackupStore, FollowUpStore, HealthProbe, InterviewStore, NotificationStore, RecruiterStore,
    TemplateStore, UserStore,
};

type Conn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Statuses that still get reminders.
const ACTIVE_STATUSES: [&str; 2] = [
    InterviewStatus::Scheduled.code(),
    InterviewStatus::Rescheduled.code(),
];

/// Tolerance when matching stored lead times, which are floats.
const HOURS_EPSILON: f64 = 1e-6;

/// SQLite-backed repository.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: DbPool,
}

impl SqliteRepository {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn conn(&self) -> Result<Conn> {
        Ok(self.pool.get()?)
    }
}

fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = Error>,
{
    rows.into_iter().map(T::try_from).collect()
}

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

impl UserStore for SqliteRepository {
    async fn find_user(&self, telegram_id: i64) -> Result<Option<User>> {
        let mut conn = self.conn()?;
        let row: Option<UserRow> = users::table
            .filter(users::telegram_id.eq(telegram_id))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        row.map(User::try_from).transpose()
    }

    async fn get_user(&self, id: i32) -> Result<Option<User>> {
        let mut conn = self.conn()?;
        let row: Option<UserRow> = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        row.map(User::try_from).transpose()
    }

    async fn get_or_create_user(&self, new: &NewUser) -> Result<User> {
        let mut conn = self.conn()?;
        let row = conn.transaction::<UserRow, Error, _>(|conn| {
            let existing: Option<UserRow> = users::table
                .filter(users::telegram_id.eq(new.telegram_id))
                .select(UserRow::as_select())
                .first(conn)
                .optional()?;

            match existing {
                Some(row) if row.username == new.username => Ok(row),
                Some(row) => Ok(diesel::update(users::table.find(row.id))
                    .set(users::username.eq(new.username.as_deref()))
                    .returning(UserRow::as_returning())
                    .get_result(conn)?),
                None => {
                    debug!(telegram_id = new.telegram_id, "Registering user");
                    Ok(diesel::insert_into(users::table)
                        .values(NewUserRow {
                            telegram_id: new.telegram_id,
                            username: new.username.as_deref(),
                            locale: &new.locale,
                            timezone: &new.timezone,
                            created_at: format_timestamp(Utc::now()),
                        })
                        .returning(UserRow::as_returning())
                        .get_result(conn)?)
                }
            }
        })?;
        User::try_from(row)
    }

    async fn update_timezone(&self, user_id: i32, timezone: &str) -> Result<bool> {
        let mut conn = self.conn()?;
        let updated = diesel::update(users::table.find(user_id))
            .set(users::timezone.eq(timezone))
            .execute(&mut conn)?;
        Ok(updated > 0)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut conn = self.conn()?;
        let rows = users::table
            .order(users::id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)?;
        collect(rows)
    }
}

// ---------------------------------------------------------------------------
// interviews
// ---------------------------------------------------------------------------

impl InterviewStore for SqliteRepository {
    async fn create_interview(&self, new: &NewInterview) -> Result<Interview> {
        let mut conn = self.conn()?;
        let now = format_timestamp(Utc::now());
        let details = &new.details;
        let row = diesel::insert_into(interviews::table)
            .values(NewInterviewRow {
                user_id: new.user_id,
                recruiter_id: new.recruiter_id,
                parent_interview_id: new.parent_interview_id,
                company_name: &details.company_name,
                position: &details.position,
                vacancy_url: details.vacancy_url.as_deref(),
                recruiter_name: &details.recruiter_name,
                interview_date: format_timestamp(details.interview_date),
                platform_name: &details.platform_name,
                platform_url: details.platform_url.as_deref(),
                camera_required: details.camera_required,
                interview_type: details.interview_type.code(),
                status: InterviewStatus::Scheduled.code(),
                checklist: encode_checklist(&new.checklist)?,
                stage_number: new.stage_number,
                created_at: now.clone(),
                updated_at: now,
            })
            .returning(InterviewRow::as_returning())
            .get_result(&mut conn)?;
        Interview::try_from(row)
    }

    async fn find_interview(&self, user_id: i32, id: i32) -> Result<Option<Interview>> {
        let mut conn = self.conn()?;
        let row: Option<InterviewRow> = interviews::table
            .filter(interviews::id.eq(id))
            .filter(interviews::user_id.eq(user_id))
            .select(InterviewRow::as_select())
            .first(&mut conn)
            .optional()?;
        row.map(Interview::try_from).transpose()
    }

    async fn get_interview(&self, id: i32) -> Result<Option<Interview>> {
        let mut conn = self.conn()?;
        let row: Option<InterviewRow> = interviews::table
            .find(id)
            .select(InterviewRow::as_select())
            .first(&mut conn)
            .optional()?;
        row.map(Interview::try_from).transpose()
    }

    async fn list_interviews(
        &self,
        user_id: i32,
        include_past: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<Interview>> {
        let mut conn = self.conn()?;
        let mut query = interviews::table
            .filter(interviews::user_id.eq(user_id))
            .into_boxed();
        if !include_past {
            query = query.filter(interviews::interview_date.ge(format_timestamp(now)));
        }
        let rows = query
            .order((interviews::interview_date.asc(), interviews::id.asc()))
            .select(InterviewRow::as_select())
            .load(&mut conn)?;
        collect(rows)
    }

    async fn upcoming_interviews(&self, since: DateTime<Utc>) -> Result<Vec<Interview>> {
        let mut conn = self.conn()?;
        let rows = interviews::table
            .filter(interviews::status.eq_any(ACTIVE_STATUSES))
            .filter(interviews::interview_date.ge(format_timestamp(since)))
            .order((interviews::interview_date.asc(), interviews::id.asc()))
            .select(InterviewRow::as_select())
            .load(&mut conn)?;
        collect(rows)
    }

    async fn delete_interview(&self, user_id: i32, id: i32) -> Result<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            interviews::table
                .filter(interviews::id.eq(id))
                .filter(interviews::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }

    async fn change_status(
        &self,
        user_id: i32,
        id: i32,
        change: &StatusChange,
        now: DateTime<Utc>,
    ) -> Result<Option<Interview>> {
        let mut conn = self.conn()?;
        let now = format_timestamp(now);

        let row = conn.transaction::<Option<InterviewRow>, Error, _>(|conn| {
            let current: Option<InterviewRow> = interviews::table
                .filter(interviews::id.eq(id))
                .filter(interviews::user_id.eq(user_id))
                .select(InterviewRow::as_select())
                .first(conn)
                .optional()?;
            let Some(current) = current else {
                return Ok(None);
            };

            diesel::insert_into(interview_status_history::table)
                .values(NewStatusHistoryRow {
                    interview_id: id,
                    old_status: Some(current.status.as_str()),
                    new_status: change.status.code(),
                    notes: change.notes.as_deref(),
                    changed_at: now.clone(),
                })
                .execute(conn)?;

            let ends = change.status.is_final() || change.status == InterviewStatus::Completed;
            let completed_at = if ends {
                Some(now.clone())
            } else {
                current.completed_at.clone()
            };

            let updated = diesel::update(interviews::table.find(id))
                .set((
                    interviews::status.eq(change.status.code()),
                    interviews::updated_at.eq(&now),
                    interviews::completed_at.eq(completed_at),
                ))
                .returning(InterviewRow::as_returning())
                .get_result(conn)?;
            Ok(Some(updated))
        })?;

        row.map(Interview::try_from).transpose()
    }

    async fn status_history(&self, interview_id: i32) -> Result<Vec<StatusHistoryEntry>> {
        let mut conn = self.conn()?;
        let rows = interview_status_history::table
            .filter(interview_status_history::interview_id.eq(interview_id))
            .order((
                interview_status_history::changed_at.asc(),
                interview_status_history::id.asc(),
            ))
            .select(StatusHistoryRow::as_select())
            .load(&mut conn)?;
        collect(rows)
    }
}

// ---------------------------------------------------------------------------
// recruiters
// ---------------------------------------------------------------------------

impl RecruiterStore for SqliteRepository {
    async fn create_recruiter(&self, new: &NewRecruiter) -> Result<Recruiter> {
        let mut conn = self.conn()?;
        let row = diesel::insert_into(recruiters::table)
            .values(NewRecruiterRow {
                user_id: new.user_id,
                name: &new.name,
                company_name: new.company_name.as_deref(),
                email: new.email.as_deref(),
                phone: new.phone.as_deref(),
                telegram: new.telegram.as_deref(),
                notes: new.notes.as_deref(),
                created_at: format_timestamp(Utc::now()),
            })
            .returning(RecruiterRow::as_returning())
            .get_result(&mut conn)?;
        Recruiter::try_from(row)
    }

    async fn find_recruiter(&self, user_id: i32, id: i32) -> Result<Option<Recruiter>> {
        let mut conn = self.conn()?;
        let row: Option<RecruiterRow> = recruiters::table
            .filter(recruiters::id.eq(id))
            .filter(recruiters::user_id.eq(user_id))
            .select(RecruiterRow::as_select())
            .first(&mut conn)
            .optional()?;
        row.map(Recruiter::try_from).transpose()
    }

    async fn list_recruiters(&self, user_id: i32) -> Result<Vec<Recruiter>> {
        let mut conn = self.conn()?;
        let rows = recruiters::table
            .filter(recruiters::user_id.eq(user_id))
            .order((recruiters::name.asc(), recruiters::id.asc()))
            .select(RecruiterRow::as_select())
            .load(&mut conn)?;
        collect(rows)
    }

    async fn delete_recruiter(&self, user_id: i32, id: i32) -> Result<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            recruiters::table
                .filter(recruiters::id.eq(id))
                .filter(recruiters::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }
}

// ---------------------------------------------------------------------------
// templates
// ---------------------------------------------------------------------------

impl TemplateStore for SqliteRepository {
    async fn create_template(&self, new: &NewTemplate) -> Result<InterviewTemplate> {
        let mut conn = self.conn()?;
        let row = diesel::insert_into(interview_templates::table)
            .values(NewTemplateRow {
                user_id: new.user_id,
                name: &new.name,
                platform_name: &new.platform_name,
                platform_url: new.platform_url.as_deref(),
                camera_required: new.camera_required,
                interview_type: new.interview_type.code(),
                default_checklist: encode_checklist(&new.default_checklist)?,
                created_at: format_timestamp(Utc::now()),
            })
            .returning(TemplateRow::as_returning())
            .get_result(&mut conn)?;
        InterviewTemplate::try_from(row)
    }

    async fn find_template(&self, user_id: i32, id: i32) -> Result<Option<InterviewTemplate>> {
        let mut conn = self.conn()?;
        let row: Option<TemplateRow> = interview_templates::table
            .filter(interview_templates::id.eq(id))
            .filter(interview_templates::user_id.eq(user_id))
            .select(TemplateRow::as_select())
            .first(&mut conn)
            .optional()?;
        row.map(InterviewTemplate::try_from).transpose()
    }

    async fn list_templates(&self, user_id: i32) -> Result<Vec<InterviewTemplate>> {
        let mut conn = self.conn()?;
        let rows = interview_templates::table
            .filter(interview_templates::user_id.eq(user_id))
            .order((interview_templates::name.asc(), interview_templates::id.asc()))
            .select(TemplateRow::as_select())
            .load(&mut conn)?;
        collect(rows)
    }

    async fn delete_template(&self, user_id: i32, id: i32) -> Result<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            interview_templates::table
                .filter(interview_templates::id.eq(id))
                .filter(interview_templates::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }
}

// ---------------------------------------------------------------------------
// notifications
// ---------------------------------------------------------------------------

impl NotificationStore for SqliteRepository {
    async fn notification_settings(&self, user_id: i32) -> Result<Option<NotificationSettings>> {
        let mut conn = self.conn()?;
        let row: Option<SettingsRow> = notification_settings::table
            .filter(notification_settings::user_id.eq(user_id))
            .select(SettingsRow::as_select())
            .first(&mut conn)
            .optional()?;
        row.map(NotificationSettings::try_from).transpose()
    }

    async fn get_or_create_settings(
        &self,
        user_id: i32,
        default_times: &[f64],
    ) -> Result<NotificationSettings> {
        let mut conn = self.conn()?;
        let times = serde_json::to_string(default_times)?;
        let row = conn.transaction::<SettingsRow, Error, _>(|conn| {
            let existing: Option<SettingsRow> = notification_settings::table
                .filter(notification_settings::user_id.eq(user_id))
                .select(SettingsRow::as_select())
                .first(conn)
                .optional()?;
            if let Some(row) = existing {
                return Ok(row);
            }
            Ok(diesel::insert_into(notification_settings::table)
                .values(NewSettingsRow {
                    user_id,
                    notification_times: times,
                    enabled: true,
                    quiet_hours_enabled: false,
                    group_notifications: false,
                })
                .returning(SettingsRow::as_returning())
                .get_result(conn)?)
        })?;
        NotificationSettings::try_from(row)
    }

    async fn save_settings(&self, settings: &NotificationSettings) -> Result<()> {
        let row = SettingsRow::from_domain(settings)?;
        let mut conn = self.conn()?;
        let updated = diesel::update(notification_settings::table.find(row.id))
            .set(&row)
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(Error::NotFound {
                entity: "notification settings",
            });
        }
        Ok(())
    }

    async fn log_notification(&self, log: &NewNotificationLog) -> Result<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(notification_logs::table)
            .values(NewNotificationLogRow {
                interview_id: log.interview_id,
                notification_type: log.kind.as_str(),
                notification_time_hours: log.notification_time_hours,
                sent_at: format_timestamp(log.sent_at),
                success: log.success,
                error_message: log.error_message.as_deref(),
            })
            .execute(&mut conn)?;
        Ok(())
    }

    async fn was_notified(&self, interview_id: i32, hours: f64) -> Result<bool> {
        let mut conn = self.conn()?;
        let count: i64 = notification_logs::table
            .filter(notification_logs::interview_id.eq(interview_id))
            .filter(notification_logs::notification_type.eq(NotificationKind::Interview.as_str()))
            .filter(notification_logs::success.eq(true))
            .filter(notification_logs::notification_time_hours.ge(hours - HOURS_EPSILON))
            .filter(notification_logs::notification_time_hours.le(hours + HOURS_EPSILON))
            .count()
            .get_result(&mut conn)?;
        Ok(count > 0)
    }
}

// ---------------------------------------------------------------------------
// follow-ups
// ---------------------------------------------------------------------------

impl FollowUpStore for SqliteRepository {
    async fn create_followup(&self, new: &NewFollowUp) -> Result<FollowUp> {
        let mut conn = self.conn()?;
        let row = diesel::insert_into(followups::table)
            .values(NewFollowUpRow {
                interview_id: new.interview_id,
                reminder_date: format_timestamp(new.reminder_date),
                message: &new.message,
                sent: false,
                created_at: format_timestamp(Utc::now()),
            })
            .returning(FollowUpRow::as_returning())
            .get_result(&mut conn)?;
        FollowUp::try_from(row)
    }

    async fn due_followups(&self, now: DateTime<Utc>) -> Result<Vec<FollowUp>> {
        let mut conn = self.conn()?;
        let rows = followups::table
            .filter(followups::sent.eq(false))
            .filter(followups::reminder_date.le(format_timestamp(now)))
            .order((followups::reminder_date.asc(), followups::id.asc()))
            .select(FollowUpRow::as_select())
            .load(&mut conn)?;
        collect(rows)
    }

    async fn mark_followup_sent(&self, id: i32) -> Result<()> {
        let mut conn = self.conn()?;
        diesel::update(followups::table.find(id))
            .set(followups::sent.eq(true))
            .execute(&mut conn)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// backups
// ---------------------------------------------------------------------------

impl BackupStore for SqliteRepository {
    async fn record_backup(&self, new: &NewBackupRecord) -> Result<BackupRecord> {
        let mut conn = self.conn()?;
        let row = diesel::insert_into(backups::table)
            .values(NewBackupRow {
                filename: &new.filename,
                filepath: &new.filepath,
                size_bytes: new.size_bytes,
                created_at: format_timestamp(new.created_at),
            })
            .returning(BackupRow::as_returning())
            .get_result(&mut conn)?;
        BackupRecord::try_from(row)
    }

    async fn list_backups(&self) -> Result<Vec<BackupRecord>> {
        let mut conn = self.conn()?;
        let rows = backups::table
            .order((backups::created_at.desc(), backups::id.desc()))
            .select(BackupRow::as_select())
            .load(&mut conn)?;
        collect(rows)
    }

    async fn prune_backups(&self, older_than: DateTime<Utc>) -> Result<Vec<BackupRecord>> {
        let mut conn = self.conn()?;
        let cutoff = format_timestamp(older_than);
        let rows = diesel::delete(backups::table.filter(backups::created_at.lt(cutoff)))
            .returning(BackupRow::as_returning())
            .get_results(&mut conn)?;
        collect(rows)
    }
}

impl HealthProbe for SqliteRepository {
    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
    use crate::domain::{InterviewDetails, InterviewType};
    use chrono::{Duration, TimeZone};

    fn setup() -> (tempfile::TempDir, SqliteRepository) {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("test.db").display().to_string();
        let pool = create_pool(&url).unwrap();
        run_migrations(&pool).unwrap();
        (dir, SqliteRepository::new(pool))
    }

    fn new_user(telegram_id: i64) -> NewUser {
        NewUser {
            telegram_id,
            username: Some("candidate".into()),
            locale: "ru".into(),
            timezone: "Europe/Moscow".into(),
        }
    }

    fn details(at: DateTime<Utc>) -> InterviewDetails {
        InterviewDetails {
            company_name: "Acme".into(),
            position: "Backend".into(),
            vacancy_url: None,
            recruiter_name: "Anna".into(),
            interview_date: at,
            platform_name: "Zoom".into(),
            platform_url: Some("https://zoom.us/j/1".into()),
            camera_required: true,
            interview_type: InterviewType::Technical,
        }
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 3, 1, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn get_or_create_user_is_idempotent() {
        let (_dir, repo) = setup();
        let first = repo.get_or_create_user(&new_user(100)).await.unwrap();
        let second = repo.get_or_create_user(&new_user(100)).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(repo.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_or_create_user_refreshes_username() {
        let (_dir, repo) = setup();
        repo.get_or_create_user(&new_user(100)).await.unwrap();
        let mut renamed = new_user(100);
        renamed.username = Some("renamed".into());
        let user = repo.get_or_create_user(&renamed).await.unwrap();
        assert_eq!(user.username.as_deref(), Some("renamed"));
    }

    #[tokio::test]
    async fn interviews_are_scoped_to_their_owner() {
        let (_dir, repo) = setup();
        let owner = repo.get_or_create_user(&new_user(1)).await.unwrap();
        let other = repo.get_or_create_user(&new_user(2)).await.unwrap();
        let interview = repo
            .create_interview(&NewInterview::new(owner.id, details(base())))
            .await
            .unwrap();

        assert!(repo.find_interview(other.id, interview.id).await.unwrap().is_none());
        assert!(!repo.delete_interview(other.id, interview.id).await.unwrap());
        assert!(repo.find_interview(owner.id, interview.id).await.unwrap().is_some());
        assert!(repo.delete_interview(owner.id, interview.id).await.unwrap());
        assert!(repo.get_interview(interview.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_interviews_hides_past_unless_asked() {
        let (_dir, repo) = setup();
        let user = repo.get_or_create_user(&new_user(1)).await.unwrap();
        for offset in [-2, 1, 3] {
            repo.create_interview(&NewInterview::new(
                user.id,
                details(base() + Duration::days(offset)),
            ))
            .await
            .unwrap();
        }

        let upcoming = repo.list_interviews(user.id, false, base()).await.unwrap();
        assert_eq!(upcoming.len(), 2);
        assert!(upcoming[0].interview_date < upcoming[1].interview_date);

        let all = repo.list_interviews(user.id, true, base()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn change_status_records_history_and_completion() {
        let (_dir, repo) = setup();
        let user = repo.get_or_create_user(&new_user(1)).await.unwrap();
        let interview = repo
            .create_interview(&NewInterview::new(user.id, details(base())))
            .await
            .unwrap();

        let change = StatusChange {
            status: InterviewStatus::Completed,
            notes: Some("went well".into()),
        };
        let updated = repo
            .change_status(user.id, interview.id, &change, base())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, InterviewStatus::Completed);
        assert_eq!(updated.completed_at, Some(base()));

        let history = repo.status_history(interview.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].old_status, Some(InterviewStatus::Scheduled));
        assert_eq!(history[0].new_status, InterviewStatus::Completed);
        assert_eq!(history[0].notes.as_deref(), Some("went well"));

        let upcoming = repo.upcoming_interviews(base() - Duration::days(1)).await.unwrap();
        assert!(upcoming.is_empty());
    }

    #[tokio::test]
    async fn change_status_ignores_foreign_interviews() {
        let (_dir, repo) = setup();
        let owner = repo.get_or_create_user(&new_user(1)).await.unwrap();
        let other = repo.get_or_create_user(&new_user(2)).await.unwrap();
        let interview = repo
            .create_interview(&NewInterview::new(owner.id, details(base())))
            .await
            .unwrap();
        let change = StatusChange {
            status: InterviewStatus::Cancelled,
            notes: None,
        };
        assert!(repo
            .change_status(other.id, interview.id, &change, base())
            .await
            .unwrap()
            .is_none());
        assert!(repo.status_history(interview.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn was_notified_only_counts_successes_for_that_lead_time() {
        let (_dir, repo) = setup();
        let user = repo.get_or_create_user(&new_user(1)).await.unwrap();
        let interview = repo
            .create_interview(&NewInterview::new(user.id, details(base())))
            .await
            .unwrap();

        let mut log = NewNotificationLog {
            interview_id: interview.id,
            kind: NotificationKind::Interview,
            notification_time_hours: Some(1.5),
            sent_at: base(),
            success: false,
            error_message: Some("blocked".into()),
        };
        repo.log_notification(&log).await.unwrap();
        assert!(!repo.was_notified(interview.id, 1.5).await.unwrap());

        log.success = true;
        log.error_message = None;
        repo.log_notification(&log).await.unwrap();
        assert!(repo.was_notified(interview.id, 1.5).await.unwrap());
        assert!(!repo.was_notified(interview.id, 24.0).await.unwrap());
    }

    #[tokio::test]
    async fn settings_are_created_once_and_saved() {
        let (_dir, repo) = setup();
        let user = repo.get_or_create_user(&new_user(1)).await.unwrap();

        let mut settings = repo.get_or_create_settings(user.id, &[24.0, 1.0]).await.unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.notification_times, vec![24.0, 1.0]);

        settings.enabled = false;
        settings.notification_times = vec![2.0];
        repo.save_settings(&settings).await.unwrap();

        let again = repo.get_or_create_settings(user.id, &[24.0]).await.unwrap();
        assert_eq!(again, settings);
    }

    #[tokio::test]
    async fn due_followups_skip_sent_and_future() {
        let (_dir, repo) = setup();
        let user = repo.get_or_create_user(&new_user(1)).await.unwrap();
        let interview = repo
            .create_interview(&NewInterview::new(user.id, details(base())))
            .await
            .unwrap();

        let due = repo
            .create_followup(&NewFollowUp {
                interview_id: interview.id,
                reminder_date: base(),
                message: "ping".into(),
            })
            .await
            .unwrap();
        repo.create_followup(&NewFollowUp {
            interview_id: interview.id,
            reminder_date: base() + Duration::days(1),
            message: "later".into(),
        })
        .await
        .unwrap();

        let found = repo.due_followups(base()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, due.id);

        repo.mark_followup_sent(due.id).await.unwrap();
        assert!(repo.due_followups(base()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_user_cascades() {
        let (_dir, repo) = setup();
        let user = repo.get_or_create_user(&new_user(1)).await.unwrap();
        let interview = repo
            .create_interview(&NewInterview::new(user.id, details(base())))
            .await
            .unwrap();

        let mut conn = repo.conn().unwrap();
        diesel::delete(users::table.find(user.id)).execute(&mut conn).unwrap();
        drop(conn);

        assert!(repo.get_interview(interview.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn prune_backups_returns_removed_records() {
        let (_dir, repo) = setup();
        for (name, age) in [("old.db", 40), ("new.db", 1)] {
            repo.record_backup(&NewBackupRecord {
                filename: name.into(),
                filepath: format!("/backups/{name}"),
                size_bytes: 1024,
                created_at: base() - Duration::days(age),
            })
            .await
            .unwrap();
        }

        let pruned = repo.prune_backups(base() - Duration::days(30)).await.unwrap();
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0].filename, "old.db");

        let left = repo.list_backups().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].filename, "new.db");
    }

    #[tokio::test]
    async fn ping_succeeds_on_open_database() {
        let (_dir, repo) = setup();
        repo.ping().await.unwrap();
    }
}
