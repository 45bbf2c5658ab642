//! Reusable interview templates.

use chrono::{DateTime, Utc};

use super::interview::{ChecklistItem, InterviewType};

/// Platform, camera and type settings shared by recurring interviews.
#[derive(Debug, Clone, PartialEq)]
pub struct InterviewTemplate {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub platform_name: String,
    pub platform_url: Option<String>,
    pub camera_required: bool,
    pub interview_type: InterviewType,
    pub default_checklist: Vec<ChecklistItem>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTemplate {
    pub user_id: i32,
    pub name: String,
    pub platform_name: String,
    pub platform_url: Option<String>,
    pub camera_required: bool,
    pub interview_type: InterviewType,
    pub default_checklist: Vec<ChecklistItem>,
}
