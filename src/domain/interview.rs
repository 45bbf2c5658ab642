//! Interview records, their lifecycle statuses and the data collected while
//! a user describes a new interview.

use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Kind of interview.
///
/// Stored by [`code`](Self::code), displayed by [`label`](Self::label).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterviewType {
    Screening,
    Technical,
    LiveCoding,
    Hr,
    SystemDesign,
    Cultural,
    Final,
}

impl InterviewType {
    /// Every type in menu order.
    pub const ALL: [Self; 7] = [
        Self::Screening,
        Self::Technical,
        Self::LiveCoding,
        Self::Hr,
        Self::SystemDesign,
        Self::Cultural,
        Self::Final,
    ];

    /// Stable identifier used in the database and in callback data.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Screening => "SCREENING",
            Self::Technical => "TECHNICAL",
            Self::LiveCoding => "LIVE_CODING",
            Self::Hr => "HR",
            Self::SystemDesign => "SYSTEM_DESIGN",
            Self::Cultural => "CULTURAL",
            Self::Final => "FINAL",
        }
    }

    /// Human readable name shown in the bot.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Screening => "Скрининг",
            Self::Technical => "Техническое",
            Self::LiveCoding => "Лайв-кодинг",
            Self::Hr => "HR интервью",
            Self::SystemDesign => "System Design",
            Self::Cultural => "Культурное",
            Self::Final => "Финальное",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

impl Default for InterviewType {
    fn default() -> Self {
        Self::Screening
    }
}

impl fmt::Display for InterviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where an interview stands in the hiring process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
    Offer,
    Rejected,
    WaitingFeedback,
}

impl InterviewStatus {
    pub const ALL: [Self; 7] = [
        Self::Scheduled,
        Self::Completed,
        Self::Cancelled,
        Self::Rescheduled,
        Self::Offer,
        Self::Rejected,
        Self::WaitingFeedback,
    ];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Rescheduled => "RESCHEDULED",
            Self::Offer => "OFFER",
            Self::Rejected => "REJECTED",
            Self::WaitingFeedback => "WAITING_FEEDBACK",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Запланировано",
            Self::Completed => "Прошло",
            Self::Cancelled => "Отменено",
            Self::Rescheduled => "Перенесено",
            Self::Offer => "Получен оффер 🎉",
            Self::Rejected => "Отказ",
            Self::WaitingFeedback => "Жду ответа",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Reminders are only sent for interviews that are still going to happen.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Scheduled | Self::Rescheduled)
    }

    /// The process for this interview has ended one way or another.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Cancelled | Self::Offer | Self::Rejected)
    }

    /// The interview happened and the candidate is waiting to hear back.
    #[must_use]
    pub const fn awaits_followup(self) -> bool {
        matches!(self, Self::Completed | Self::WaitingFeedback)
    }
}

impl Default for InterviewStatus {
    fn default() -> Self {
        Self::Scheduled
    }
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of a preparation checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

/// A stored interview.
#[derive(Debug, Clone, PartialEq)]
pub struct Interview {
    pub id: i32,
    pub user_id: i32,
    pub recruiter_id: Option<i32>,
    pub parent_interview_id: Option<i32>,
    pub company_name: String,
    pub position: String,
    pub vacancy_url: Option<String>,
    pub recruiter_name: String,
    pub interview_date: DateTime<Utc>,
    pub original_date: Option<DateTime<Utc>>,
    pub platform_name: String,
    pub platform_url: Option<String>,
    pub camera_required: bool,
    pub interview_type: InterviewType,
    pub status: InterviewStatus,
    pub preparation_notes: Option<String>,
    pub post_interview_notes: Option<String>,
    pub rating: Option<u8>,
    pub checklist: Vec<ChecklistItem>,
    pub stage_number: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Interview {
    /// Interview start converted to the given timezone.
    #[must_use]
    pub fn local_date(&self, tz: Tz) -> DateTime<Tz> {
        self.interview_date.with_timezone(&tz)
    }

    #[must_use]
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.interview_date >= now
    }
}

/// Everything a user supplies about an interview.
#[derive(Debug, Clone, PartialEq)]
pub struct InterviewDetails {
    pub company_name: String,
    pub position: String,
    pub vacancy_url: Option<String>,
    pub recruiter_name: String,
    pub interview_date: DateTime<Utc>,
    pub platform_name: String,
    pub platform_url: Option<String>,
    pub camera_required: bool,
    pub interview_type: InterviewType,
}

/// Insert payload for a new interview.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInterview {
    pub user_id: i32,
    pub details: InterviewDetails,
    pub recruiter_id: Option<i32>,
    pub parent_interview_id: Option<i32>,
    pub checklist: Vec<ChecklistItem>,
    pub stage_number: i32,
}

impl NewInterview {
    #[must_use]
    pub fn new(user_id: i32, details: InterviewDetails) -> Self {
        Self {
            user_id,
            details,
            recruiter_id: None,
            parent_interview_id: None,
            checklist: Vec::new(),
            stage_number: 1,
        }
    }
}

/// Partially collected interview details.
///
/// Filled in step by step by the add-interview dialogue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterviewDraft {
    pub company_name: Option<String>,
    pub position: Option<String>,
    pub vacancy_url: Option<String>,
    pub recruiter_name: Option<String>,
    pub interview_date: Option<DateTime<Utc>>,
    pub platform_name: Option<String>,
    pub platform_url: Option<String>,
    pub camera_required: Option<bool>,
    pub interview_type: Option<InterviewType>,
}

impl InterviewDraft {
    /// Returns the finished details once every required field is present.
    #[must_use]
    pub fn details(&self) -> Option<InterviewDetails> {
        Some(InterviewDetails {
            company_name: self.company_name.clone()?,
            position: self.position.clone()?,
            vacancy_url: self.vacancy_url.clone(),
            recruiter_name: self.recruiter_name.clone()?,
            interview_date: self.interview_date?,
            platform_name: self.platform_name.clone()?,
            platform_url: self.platform_url.clone(),
            camera_required: self.camera_required?,
            interview_type: self.interview_type?,
        })
    }
}

/// A status transition requested by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub status: InterviewStatus,
    pub notes: Option<String>,
}

/// A recorded status transition.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusHistoryEntry {
    pub id: i32,
    pub interview_id: i32,
    pub old_status: Option<InterviewStatus>,
    pub new_status: InterviewStatus,
    pub notes: Option<String>,
    pub changed_at: DateTime<Utc>,
}
