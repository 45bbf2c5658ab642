//! JSON export document.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::domain::{Interview, User};

#[derive(Debug, Serialize)]
pub struct ExportDocument {
    pub exported_at: String,
    pub user: ExportUser,
    pub interviews: Vec<ExportInterview>,
}

#[derive(Debug, Serialize)]
pub struct ExportUser {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub timezone: String,
}

#[derive(Debug, Serialize)]
pub struct ExportInterview {
    pub id: i32,
    pub company: String,
    pub position: String,
    pub vacancy_url: Option<String>,
    pub recruiter_name: String,
    pub interview_date: String,
    pub platform_name: String,
    pub platform_url: Option<String>,
    pub camera_required: bool,
    pub interview_type: &'static str,
    pub status: &'static str,
    pub preparation_notes: Option<String>,
    pub post_interview_notes: Option<String>,
    pub rating: Option<u8>,
    pub stage_number: i32,
}

impl From<&Interview> for ExportInterview {
    fn from(i: &Interview) -> Self {
        Self {
            id: i.id,
            company: i.company_name.clone(),
            position: i.position.clone(),
            vacancy_url: i.vacancy_url.clone(),
            recruiter_name: i.recruiter_name.clone(),
            interview_date: rfc3339(i.interview_date),
            platform_name: i.platform_name.clone(),
            platform_url: i.platform_url.clone(),
            camera_required: i.camera_required,
            interview_type: i.interview_type.label(),
            status: i.status.label(),
            preparation_notes: i.preparation_notes.clone(),
            post_interview_notes: i.post_interview_notes.clone(),
            rating: i.rating,
            stage_number: i.stage_number,
        }
    }
}

impl ExportDocument {
    #[must_use]
    pub fn new(user: &User, interviews: &[Interview], exported_at: DateTime<Utc>) -> Self {
        Self {
            exported_at: rfc3339(exported_at),
            user: ExportUser {
                telegram_id: user.telegram_id,
                username: user.username.clone(),
                timezone: user.timezone.clone(),
            },
            interviews: interviews.iter().map(ExportInterview::from).collect(),
        }
    }

    /// Pretty printed JSON. Non-ASCII text is written as is.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
