//! Database model types for Diesel ORM.
//!
//! Rows mirror the tables one to one. Timestamps are RFC 3339 UTC strings with
//! second precision so that text comparison matches time order.

use chrono::{DateTime, NaiveTime, SecondsFormat, Utc};
use diesel::prelude::*;

use super::schema::{
    backups, followups, interview_status_history, interview_templates, interviews,
    notification_logs, notification_settings, recruiters, users,
};
use crate::domain::{
    BackupRecord, ChecklistItem, FollowUp, Interview, InterviewStatus, InterviewTemplate,
    InterviewType, NotificationKind, NotificationLog, NotificationSettings, QuietHours, Recruiter,
    StatusHistoryEntry, User,
};
use crate::error::{Error, Result};

/// Render a timestamp the way it is stored.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a stored timestamp.
///
/// # Errors
/// Returns [`Error::Parse`] if the text is not RFC 3339.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("timestamp {text:?}: {e}")))
}

fn parse_optional_timestamp(text: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    text.map(parse_timestamp).transpose()
}

fn parse_type(code: &str) -> Result<InterviewType> {
    InterviewType::from_code(code).ok_or_else(|| Error::Parse(format!("interview type {code:?}")))
}

fn parse_status(code: &str) -> Result<InterviewStatus> {
    InterviewStatus::from_code(code)
        .ok_or_else(|| Error::Parse(format!("interview status {code:?}")))
}

/// Serialize a checklist, storing an empty one as NULL.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn encode_checklist(items: &[ChecklistItem]) -> Result<Option<String>> {
    if items.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string(items)?))
}

fn decode_checklist(text: Option<&str>) -> Result<Vec<ChecklistItem>> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(serde_json::from_str(text)?),
        _ => Ok(Vec::new()),
    }
}

fn format_clock(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

fn parse_clock(text: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M")
        .map_err(|e| Error::Parse(format!("clock time {text:?}: {e}")))
}

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRow {
    pub id: i32,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub locale: String,
    pub timezone: String,
    pub created_at: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub telegram_id: i64,
    pub username: Option<&'a str>,
    pub locale: &'a str,
    pub timezone: &'a str,
    pub created_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            telegram_id: row.telegram_id,
            username: row.username,
            locale: row.locale,
            timezone: row.timezone,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// recruiters
// ---------------------------------------------------------------------------

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = recruiters)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecruiterRow {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub telegram: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = recruiters)]
pub struct NewRecruiterRow<'a> {
    pub user_id: i32,
    pub name: &'a str,
    pub company_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub telegram: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub created_at: String,
}

impl TryFrom<RecruiterRow> for Recruiter {
    type Error = Error;

    fn try_from(row: RecruiterRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            company_name: row.company_name,
            email: row.email,
            phone: row.phone,
            telegram: row.telegram,
            notes: row.notes,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// interviews
// ---------------------------------------------------------------------------

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = interviews)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InterviewRow {
    pub id: i32,
    pub user_id: i32,
    pub recruiter_id: Option<i32>,
    pub parent_interview_id: Option<i32>,
    pub company_name: String,
    pub position: String,
    pub vacancy_url: Option<String>,
    pub recruiter_name: String,
    pub interview_date: String,
    pub original_date: Option<String>,
    pub platform_name: String,
    pub platform_url: Option<String>,
    pub camera_required: bool,
    pub interview_type: String,
    pub status: String,
    pub preparation_notes: Option<String>,
    pub post_interview_notes: Option<String>,
    pub rating: Option<i32>,
    pub checklist: Option<String>,
    pub stage_number: i32,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = interviews)]
pub struct NewInterviewRow<'a> {
    pub user_id: i32,
    pub recruiter_id: Option<i32>,
    pub parent_interview_id: Option<i32>,
    pub company_name: &'a str,
    pub position: &'a str,
    pub vacancy_url: Option<&'a str>,
    pub recruiter_name: &'a str,
    pub interview_date: String,
    pub platform_name: &'a str,
    pub platform_url: Option<&'a str>,
    pub camera_required: bool,
    pub interview_type: &'static str,
    pub status: &'static str,
    pub checklist: Option<String>,
    pub stage_number: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<InterviewRow> for Interview {
    type Error = Error;

    fn try_from(row: InterviewRow) -> Result<Self> {
        let rating = row
            .rating
            .map(|r| u8::try_from(r).map_err(|_| Error::Parse(format!("rating {r}"))))
            .transpose()?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            recruiter_id: row.recruiter_id,
            parent_interview_id: row.parent_interview_id,
            company_name: row.company_name,
            position: row.position,
            vacancy_url: row.vacancy_url,
            recruiter_name: row.recruiter_name,
            interview_date: parse_timestamp(&row.interview_date)?,
            original_date: parse_optional_timestamp(row.original_date.as_deref())?,
            platform_name: row.platform_name,
            platform_url: row.platform_url,
            camera_required: row.camera_required,
            interview_type: parse_type(&row.interview_type)?,
            status: parse_status(&row.status)?,
            preparation_notes: row.preparation_notes,
            post_interview_notes: row.post_interview_notes,
            rating,
            checklist: decode_checklist(row.checklist.as_deref())?,
            stage_number: row.stage_number,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            completed_at: parse_optional_timestamp(row.completed_at.as_deref())?,
        })
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = interview_status_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StatusHistoryRow {
    pub id: i32,
    pub interview_id: i32,
    pub old_status: Option<String>,
    pub new_status: String,
    pub notes: Option<String>,
    pub changed_at: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = interview_status_history)]
pub struct NewStatusHistoryRow<'a> {
    pub interview_id: i32,
    pub old_status: Option<&'a str>,
    pub new_status: &'static str,
    pub notes: Option<&'a str>,
    pub changed_at: String,
}

impl TryFrom<StatusHistoryRow> for StatusHistoryEntry {
    type Error = Error;

    fn try_from(row: StatusHistoryRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            interview_id: row.interview_id,
            old_status: row.old_status.as_deref().map(parse_status).transpose()?,
            new_status: parse_status(&row.new_status)?,
            notes: row.notes,
            changed_at: parse_timestamp(&row.changed_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// templates
// ---------------------------------------------------------------------------

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = interview_templates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TemplateRow {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub platform_name: String,
    pub platform_url: Option<String>,
    pub camera_required: bool,
    pub interview_type: String,
    pub default_checklist: Option<String>,
    pub created_at: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = interview_templates)]
pub struct NewTemplateRow<'a> {
    pub user_id: i32,
    pub name: &'a str,
    pub platform_name: &'a str,
    pub platform_url: Option<&'a str>,
    pub camera_required: bool,
    pub interview_type: &'static str,
    pub default_checklist: Option<String>,
    pub created_at: String,
}

impl TryFrom<TemplateRow> for InterviewTemplate {
    type Error = Error;

    fn try_from(row: TemplateRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            platform_name: row.platform_name,
            platform_url: row.platform_url,
            camera_required: row.camera_required,
            interview_type: parse_type(&row.interview_type)?,
            default_checklist: decode_checklist(row.default_checklist.as_deref())?,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// notifications
// ---------------------------------------------------------------------------

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = notification_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct SettingsRow {
    pub id: i32,
    pub user_id: i32,
    pub notification_times: String,
    pub enabled: bool,
    pub quiet_hours_enabled: bool,
    pub quiet_hours_start: Option<String>,
    pub quiet_hours_end: Option<String>,
    pub group_notifications: bool,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = notification_settings)]
pub struct NewSettingsRow {
    pub user_id: i32,
    pub notification_times: String,
    pub enabled: bool,
    pub quiet_hours_enabled: bool,
    pub group_notifications: bool,
}

impl SettingsRow {
    /// Build a row from domain settings.
    ///
    /// # Errors
    /// Returns an error if the lead times cannot be serialized.
    pub fn from_domain(settings: &NotificationSettings) -> Result<Self> {
        Ok(Self {
            id: settings.id,
            user_id: settings.user_id,
            notification_times: serde_json::to_string(&settings.notification_times)?,
            enabled: settings.enabled,
            quiet_hours_enabled: settings.quiet_hours_enabled,
            quiet_hours_start: settings.quiet_hours.map(|q| format_clock(q.start)),
            quiet_hours_end: settings.quiet_hours.map(|q| format_clock(q.end)),
            group_notifications: settings.group_notifications,
        })
    }
}

impl TryFrom<SettingsRow> for NotificationSettings {
    type Error = Error;

    fn try_from(row: SettingsRow) -> Result<Self> {
        let quiet_hours = match (row.quiet_hours_start, row.quiet_hours_end) {
            (Some(start), Some(end)) => Some(QuietHours::new(parse_clock(&start)?, parse_clock(&end)?)),
            _ => None,
        };

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            notification_times: serde_json::from_str(&row.notification_times)?,
            enabled: row.enabled,
            quiet_hours_enabled: row.quiet_hours_enabled,
            quiet_hours,
            group_notifications: row.group_notifications,
        })
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = notification_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NotificationLogRow {
    pub id: i32,
    pub interview_id: i32,
    pub notification_type: String,
    pub notification_time_hours: Option<f64>,
    pub sent_at: String,
    pub success: bool,
    pub error_message: Option<String>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = notification_logs)]
pub struct NewNotificationLogRow<'a> {
    pub interview_id: i32,
    pub notification_type: &'static str,
    pub notification_time_hours: Option<f64>,
    pub sent_at: String,
    pub success: bool,
    pub error_message: Option<&'a str>,
}

impl TryFrom<NotificationLogRow> for NotificationLog {
    type Error = Error;

    fn try_from(row: NotificationLogRow) -> Result<Self> {
        let kind = NotificationKind::parse(&row.notification_type).ok_or_else(|| {
            Error::Parse(format!("notification type {:?}", row.notification_type))
        })?;
        Ok(Self {
            id: row.id,
            interview_id: row.interview_id,
            kind,
            notification_time_hours: row.notification_time_hours,
            sent_at: parse_timestamp(&row.sent_at)?,
            success: row.success,
            error_message: row.error_message,
        })
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = followups)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FollowUpRow {
    pub id: i32,
    pub interview_id: i32,
    pub reminder_date: String,
    pub message: String,
    pub sent: bool,
    pub created_at: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = followups)]
pub struct NewFollowUpRow<'a> {
    pub interview_id: i32,
    pub reminder_date: String,
    pub message: &'a str,
    pub sent: bool,
    pub created_at: String,
}

impl TryFrom<FollowUpRow> for FollowUp {
    type Error = Error;

    fn try_from(row: FollowUpRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            interview_id: row.interview_id,
            reminder_date: parse_timestamp(&row.reminder_date)?,
            message: row.message,
            sent: row.sent,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// backups
// ---------------------------------------------------------------------------

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = backups)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BackupRow {
    pub id: i32,
    pub filename: String,
    pub filepath: String,
    pub size_bytes: i64,
    pub created_at: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = backups)]
pub struct NewBackupRow<'a> {
    pub filename: &'a str,
    pub filepath: &'a str,
    pub size_bytes: i64,
    pub created_at: String,
}

impl TryFrom<BackupRow> for BackupRecord {
    type Error = Error;

    fn try_from(row: BackupRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            filename: row.filename,
            filepath: row.filepath,
            size_bytes: row.size_bytes,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_sort_lexically() {
        let early = Utc.with_ymd_and_hms(2026, 1, 9, 23, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 1, 10, 1, 0, 0).unwrap();
        assert!(format_timestamp(early) < format_timestamp(late));
        assert_eq!(format_timestamp(early), "2026-01-09T23:00:00Z");
        assert_eq!(parse_timestamp("2026-01-09T23:00:00Z").unwrap(), early);
    }

    #[test]
    fn empty_checklist_is_stored_as_null() {
        assert_eq!(encode_checklist(&[]).unwrap(), None);
        assert!(decode_checklist(None).unwrap().is_empty());
    }

    #[test]
    fn settings_row_keeps_quiet_window() {
        let settings = NotificationSettings {
            id: 3,
            user_id: 7,
            notification_times: vec![24.0, 1.5],
            enabled: true,
            quiet_hours_enabled: true,
            quiet_hours: Some(QuietHours::default_window()),
            group_notifications: true,
        };
        let row = SettingsRow::from_domain(&settings).unwrap();
        assert_eq!(row.quiet_hours_start.as_deref(), Some("22:00"));
        assert_eq!(row.quiet_hours_end.as_deref(), Some("08:00"));
        assert_eq!(NotificationSettings::try_from(row).unwrap(), settings);
    }

    #[test]
    fn unknown_status_code_is_a_parse_error() {
        assert!(matches!(parse_status("PENDING"), Err(Error::Parse(_))));
    }
}
