//! Interview tracking domain types.
//!
//! Nothing here performs I/O. Persistence lives behind the
//! [`port`](crate::port) traits.

pub mod backup;
pub mod error;
pub mod interview;
pub mod notification;
pub mod recruiter;
pub mod template;
pub mod user;
pub mod validate;

pub use backup::{BackupRecord, NewBackupRecord};
pub use error::ValidationError;
pub use interview::{
    ChecklistItem, Interview, InterviewDetails, InterviewDraft, InterviewStatus, InterviewType,
    NewInterview, StatusChange, StatusHistoryEntry,
};
pub use notification::{
    format_hours, format_hours_list, lead_time_label, FollowUp, NewFollowUp, NewNotificationLog,
    NotificationKind, NotificationLog, NotificationSettings, QuietHours,
};
pub use recruiter::{NewRecruiter, Recruiter};
pub use template::{InterviewTemplate, NewTemplate};
pub use user::{NewUser, User};
