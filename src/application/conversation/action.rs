//! Inline button actions and their callback data encoding.
//!
//! Telegram limits callback data to 64 bytes. Every encoding below stays well
//! under that for realistic ids and the timezones offered as buttons.

use std::fmt;

use crate::domain::{InterviewStatus, InterviewType};

/// Telegram's callback data limit in bytes.
pub const MAX_CALLBACK_DATA: usize = 64;

/// Something a user can do by pressing an inline button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    MainMenu,
    Cancel,
    Skip,

    AddInterview,
    MyInterviews,
    AllInterviews,
    ViewInterview(i32),
    DeleteInterview(i32),
    ChangeStatus(i32),
    SetStatus(i32, InterviewStatus),
    History(i32),
    ExportInterview(i32),
    Camera(bool),
    Type(InterviewType),
    Confirm,

    NotificationSettings,
    ToggleNotifications,
    ChangeNotificationTimes,
    ResetNotificationTimes,
    QuietHoursSettings,
    QuietHoursEnable,
    QuietHoursDisable,
    QuietHoursSetTime,
    ToggleGrouping,

    Recruiters,
    ViewRecruiter(i32),
    AddRecruiter,
    DeleteRecruiter(i32),

    Templates,
    ViewTemplate(i32),
    AddTemplate,
    UseTemplate(i32),
    DeleteTemplate(i32),

    Settings,
    TimezoneMenu,
    SetTimezone(String),
    TimezoneManual,

    ExportMenu,
    ExportIcs,
    ExportJson,
    CreateBackup,
}

impl Action {
    /// Callback data for this action.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::ViewInterview(id) => format!("view_interview_{id}"),
            Self::DeleteInterview(id) => format!("delete_interview_{id}"),
            Self::ChangeStatus(id) => format!("change_status_{id}"),
            Self::SetStatus(id, status) => format!("set_status_{id}_{}", status.code()),
            Self::History(id) => format!("history_{id}"),
            Self::ExportInterview(id) => format!("export_ics_{id}"),
            Self::Type(kind) => format!("type_{}", kind.code()),
            Self::ViewRecruiter(id) => format!("view_recruiter_{id}"),
            Self::DeleteRecruiter(id) => format!("delete_recruiter_{id}"),
            Self::ViewTemplate(id) => format!("view_template_{id}"),
            Self::UseTemplate(id) => format!("use_template_{id}"),
            Self::DeleteTemplate(id) => format!("delete_template_{id}"),
            Self::SetTimezone(name) => format!("set_tz_{name}"),
            Self::MainMenu => "main_menu".into(),
            Self::Cancel => "cancel".into(),
            Self::Skip => "skip".into(),
            Self::AddInterview => "add_interview".into(),
            Self::MyInterviews => "my_interviews".into(),
            Self::AllInterviews => "all_interviews".into(),
            Self::Camera(true) => "camera_yes".into(),
            Self::Camera(false) => "camera_no".into(),
            Self::Confirm => "confirm_yes".into(),
            Self::NotificationSettings => "notification_settings".into(),
            Self::ToggleNotifications => "toggle_notifications".into(),
            Self::ChangeNotificationTimes => "change_notification_times".into(),
            Self::ResetNotificationTimes => "reset_notification_times".into(),
            Self::QuietHoursSettings => "quiet_hours_settings".into(),
            Self::QuietHoursEnable => "quiet_hours_enable".into(),
            Self::QuietHoursDisable => "quiet_hours_disable".into(),
            Self::QuietHoursSetTime => "quiet_hours_set_time".into(),
            Self::ToggleGrouping => "toggle_grouping".into(),
            Self::Recruiters => "recruiters_list".into(),
            Self::AddRecruiter => "add_recruiter".into(),
            Self::Templates => "templates_list".into(),
            Self::AddTemplate => "add_template".into(),
            Self::Settings => "settings_menu".into(),
            Self::TimezoneMenu => "settings_timezone".into(),
            Self::TimezoneManual => "timezone_manual".into(),
            Self::ExportMenu => "export_menu".into(),
            Self::ExportIcs => "export_ics".into(),
            Self::ExportJson => "export_json".into(),
            Self::CreateBackup => "create_backup".into(),
        }
    }

    /// Decode callback data. Returns `None` for anything unrecognized.
    #[must_use]
    pub fn parse(data: &str) -> Option<Self> {
        let simple = match data {
            "main_menu" => Some(Self::MainMenu),
            "cancel" => Some(Self::Cancel),
            "skip" => Some(Self::Skip),
            "add_interview" => Some(Self::AddInterview),
            "my_interviews" => Some(Self::MyInterviews),
            "all_interviews" => Some(Self::AllInterviews),
            "camera_yes" => Some(Self::Camera(true)),
            "camera_no" => Some(Self::Camera(false)),
            "confirm_yes" => Some(Self::Confirm),
            "notification_settings" => Some(Self::NotificationSettings),
            "toggle_notifications" => Some(Self::ToggleNotifications),
            "change_notification_times" => Some(Self::ChangeNotificationTimes),
            "reset_notification_times" => Some(Self::ResetNotificationTimes),
            "quiet_hours_settings" => Some(Self::QuietHoursSettings),
            "quiet_hours_enable" => Some(Self::QuietHoursEnable),
            "quiet_hours_disable" => Some(Self::QuietHoursDisable),
            "quiet_hours_set_time" => Some(Self::QuietHoursSetTime),
            "toggle_grouping" => Some(Self::ToggleGrouping),
            "recruiters_list" => Some(Self::Recruiters),
            "add_recruiter" => Some(Self::AddRecruiter),
            "templates_list" => Some(Self::Templates),
            "add_template" => Some(Self::AddTemplate),
            "settings_menu" => Some(Self::Settings),
            "settings_timezone" => Some(Self::TimezoneMenu),
            "timezone_manual" => Some(Self::TimezoneManual),
            "export_menu" => Some(Self::ExportMenu),
            "export_ics" => Some(Self::ExportIcs),
            "export_json" => Some(Self::ExportJson),
            "create_backup" => Some(Self::CreateBackup),
            _ => None,
        };
        if simple.is_some() {
            return simple;
        }

        let id = |prefix: &str| data.strip_prefix(prefix).and_then(|s| s.parse::<i32>().ok());

        if let Some(id) = id("view_interview_") {
            return Some(Self::ViewInterview(id));
        }
        if let Some(id) = id("delete_interview_") {
            return Some(Self::DeleteInterview(id));
        }
        if let Some(id) = id("change_status_") {
            return Some(Self::ChangeStatus(id));
        }
        if let Some(rest) = data.strip_prefix("set_status_") {
            let (id, code) = rest.split_once('_')?;
            return Some(Self::SetStatus(
                id.parse().ok()?,
                InterviewStatus::from_code(code)?,
            ));
        }
        if let Some(id) = id("history_") {
            return Some(Self::History(id));
        }
        if let Some(id) = id("export_ics_") {
            return Some(Self::ExportInterview(id));
        }
        if let Some(code) = data.strip_prefix("type_") {
            return InterviewType::from_code(code).map(Self::Type);
        }
        if let Some(id) = id("view_recruiter_") {
            return Some(Self::ViewRecruiter(id));
        }
        if let Some(id) = id("delete_recruiter_") {
            return Some(Self::DeleteRecruiter(id));
        }
        if let Some(id) = id("view_template_") {
            return Some(Self::ViewTemplate(id));
        }
        if let Some(id) = id("use_template_") {
            return Some(Self::UseTemplate(id));
        }
        if let Some(id) = id("delete_template_") {
            return Some(Self::DeleteTemplate(id));
        }
        if let Some(name) = data.strip_prefix("set_tz_") {
            if !name.is_empty() {
                return Some(Self::SetTimezone(name.to_string()));
            }
        }
        None
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
