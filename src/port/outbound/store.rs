//! Store ports for persistence operations.
//!
//! Each trait covers one aggregate. Methods that act on behalf of a user take
//! that user's id and only ever touch rows the user owns; a row owned by
//! someone else behaves exactly like a missing one.
//!
//! # Implementation Notes
//!
//! - Implementations must be thread-safe (`Send + Sync`)
//! - Timestamps are compared in UTC

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::{
    BackupRecord, FollowUp, Interview, InterviewTemplate, NewBackupRecord, NewFollowUp,
    NewInterview, NewNotificationLog, NewRecruiter, NewTemplate, NewUser, NotificationSettings,
    Recruiter, StatusChange, StatusHistoryEntry, User,
};
use crate::error::Result;

/// Storage operations for users.
pub trait UserStore: Send + Sync {
    /// Look a user up by Telegram id.
    fn find_user(&self, telegram_id: i64) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Look a user up by primary key.
    fn get_user(&self, id: i32) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Return the existing user for `new.telegram_id` or insert `new`.
    ///
    /// An existing user keeps their stored timezone and locale. A changed
    /// username is updated.
    fn get_or_create_user(&self, new: &NewUser) -> impl Future<Output = Result<User>> + Send;

    /// Store a new timezone name. Returns false when the user does not exist.
    fn update_timezone(
        &self,
        user_id: i32,
        timezone: &str,
    ) -> impl Future<Output = Result<bool>> + Send;

    fn list_users(&self) -> impl Future<Output = Result<Vec<User>>> + Send;
}

/// Storage operations for interviews and their status history.
pub trait InterviewStore: Send + Sync {
    fn create_interview(
        &self,
        new: &NewInterview,
    ) -> impl Future<Output = Result<Interview>> + Send;

    /// Fetch an interview owned by `user_id`.
    fn find_interview(
        &self,
        user_id: i32,
        id: i32,
    ) -> impl Future<Output = Result<Option<Interview>>> + Send;

    /// Fetch an interview regardless of owner. Used by background jobs.
    fn get_interview(&self, id: i32) -> impl Future<Output = Result<Option<Interview>>> + Send;

    /// A user's interviews ordered by date.
    ///
    /// Unless `include_past` is set, only interviews at or after `now` are
    /// returned.
    fn list_interviews(
        &self,
        user_id: i32,
        include_past: bool,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Interview>>> + Send;

    /// Scheduled or rescheduled interviews of every user at or after `since`.
    fn upcoming_interviews(
        &self,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Interview>>> + Send;

    /// Delete an interview owned by `user_id`. Returns true if it existed.
    fn delete_interview(&self, user_id: i32, id: i32) -> impl Future<Output = Result<bool>> + Send;

    /// Apply a status change and record it in the history.
    ///
    /// `completed_at` is set when the new status ends the interview or marks
    /// it as held. Returns `None` when the interview is not the user's.
    fn change_status(
        &self,
        user_id: i32,
        id: i32,
        change: &StatusChange,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<Interview>>> + Send;

    /// Status transitions of an interview, oldest first.
    fn status_history(
        &self,
        interview_id: i32,
    ) -> impl Future<Output = Result<Vec<StatusHistoryEntry>>> + Send;
}

/// Storage operations for the recruiter address book.
pub trait RecruiterStore: Send + Sync {
    fn create_recruiter(
        &self,
        new: &NewRecruiter,
    ) -> impl Future<Output = Result<Recruiter>> + Send;

    fn find_recruiter(
        &self,
        user_id: i32,
        id: i32,
    ) -> impl Future<Output = Result<Option<Recruiter>>> + Send;

    /// A user's recruiters ordered by name.
    fn list_recruiters(&self, user_id: i32) -> impl Future<Output = Result<Vec<Recruiter>>> + Send;

    fn delete_recruiter(&self, user_id: i32, id: i32) -> impl Future<Output = Result<bool>> + Send;
}

/// Storage operations for interview templates.
pub trait TemplateStore: Send + Sync {
    fn create_template(
        &self,
        new: &NewTemplate,
    ) -> impl Future<Output = Result<InterviewTemplate>> + Send;

    fn find_template(
        &self,
        user_id: i32,
        id: i32,
    ) -> impl Future<Output = Result<Option<InterviewTemplate>>> + Send;

    /// A user's templates ordered by name.
    fn list_templates(
        &self,
        user_id: i32,
    ) -> impl Future<Output = Result<Vec<InterviewTemplate>>> + Send;

    fn delete_template(&self, user_id: i32, id: i32) -> impl Future<Output = Result<bool>> + Send;
}

/// Storage operations for reminder settings and the delivery log.
pub trait NotificationStore: Send + Sync {
    fn notification_settings(
        &self,
        user_id: i32,
    ) -> impl Future<Output = Result<Option<NotificationSettings>>> + Send;

    /// Return the user's settings, inserting enabled defaults with
    /// `default_times` when none exist.
    fn get_or_create_settings(
        &self,
        user_id: i32,
        default_times: &[f64],
    ) -> impl Future<Output = Result<NotificationSettings>> + Send;

    /// Overwrite the stored settings identified by `settings.id`.
    fn save_settings(
        &self,
        settings: &NotificationSettings,
    ) -> impl Future<Output = Result<()>> + Send;

    fn log_notification(&self, log: &NewNotificationLog)
        -> impl Future<Output = Result<()>> + Send;

    /// Whether the reminder `hours` before the interview was delivered.
    ///
    /// Failed attempts do not count.
    fn was_notified(
        &self,
        interview_id: i32,
        hours: f64,
    ) -> impl Future<Output = Result<bool>> + Send;
}

/// Storage operations for follow-up reminders.
pub trait FollowUpStore: Send + Sync {
    fn create_followup(&self, new: &NewFollowUp) -> impl Future<Output = Result<FollowUp>> + Send;

    /// Unsent follow-ups due at or before `now`.
    fn due_followups(&self, now: DateTime<Utc>)
        -> impl Future<Output = Result<Vec<FollowUp>>> + Send;

    fn mark_followup_sent(&self, id: i32) -> impl Future<Output = Result<()>> + Send;
}

/// Storage operations for backup metadata.
pub trait BackupStore: Send + Sync {
    fn record_backup(
        &self,
        new: &NewBackupRecord,
    ) -> impl Future<Output = Result<BackupRecord>> + Send;

    /// Backups, newest first.
    fn list_backups(&self) -> impl Future<Output = Result<Vec<BackupRecord>>> + Send;

    /// Delete records created before `older_than` and return them.
    fn prune_backups(
        &self,
        older_than: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<BackupRecord>>> + Send;
}

/// Cheap round trip used by health checks.
pub trait HealthProbe: Send + Sync {
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Everything the application needs from storage.
pub trait Repository:
    UserStore
    + InterviewStore
    + RecruiterStore
    + TemplateStore
    + NotificationStore
    + FollowUpStore
    + BackupStore
    + HealthProbe
    + 'static
{
}

impl<T> Repository for T where
    T: UserStore
        + InterviewStore
        + RecruiterStore
        + TemplateStore
        + NotificationStore
        + FollowUpStore
        + BackupStore
        + HealthProbe
        + 'static
{
}
