//! Recruiter contacts.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Recruiter {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub telegram: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRecruiter {
    pub user_id: i32,
    pub name: String,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub telegram: Option<String>,
    pub notes: Option<String>,
}
