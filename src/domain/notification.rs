//! Reminder settings, delivery log and follow-up reminders.

use std::fmt;

use chrono::{DateTime, NaiveTime, Utc};

/// Default quiet window used when a user switches quiet hours on.
pub const DEFAULT_QUIET_START: (u32, u32) = (22, 0);
pub const DEFAULT_QUIET_END: (u32, u32) = (8, 0);

/// A local-time window during which reminders are held back.
///
/// The window may wrap midnight (`22:00-08:00`). Equal start and end times
/// describe an empty window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl QuietHours {
    #[must_use]
    pub const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// The window applied by the "enable quiet hours" button.
    #[must_use]
    pub fn default_window() -> Self {
        let (sh, sm) = DEFAULT_QUIET_START;
        let (eh, em) = DEFAULT_QUIET_END;
        Self {
            start: NaiveTime::from_hms_opt(sh, sm, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(eh, em, 0).unwrap_or(NaiveTime::MIN),
        }
    }

    /// Whether `time` falls inside the window. The end is exclusive.
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start == self.end {
            return false;
        }
        if self.start < self.end {
            time >= self.start && time < self.end
        } else {
            time >= self.start || time < self.end
        }
    }
}

impl fmt::Display for QuietHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// Per-user reminder preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationSettings {
    pub id: i32,
    pub user_id: i32,
    /// Lead times in hours before an interview, sorted descending.
    pub notification_times: Vec<f64>,
    pub enabled: bool,
    pub quiet_hours_enabled: bool,
    /// Last configured window, kept while quiet hours are switched off.
    pub quiet_hours: Option<QuietHours>,
    pub group_notifications: bool,
}

impl NotificationSettings {
    /// The quiet window currently in force, if any.
    #[must_use]
    pub fn active_quiet_hours(&self) -> Option<QuietHours> {
        if self.quiet_hours_enabled {
            self.quiet_hours
        } else {
            None
        }
    }

    /// Whether reminders are held back at the given local time.
    #[must_use]
    pub fn is_quiet_at(&self, local_time: NaiveTime) -> bool {
        self.active_quiet_hours()
            .is_some_and(|window| window.contains(local_time))
    }
}

/// What a delivery log entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Interview,
    FollowUp,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Interview => "interview",
            Self::FollowUp => "followup",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "interview" => Some(Self::Interview),
            "followup" => Some(Self::FollowUp),
            _ => None,
        }
    }
}

/// A recorded delivery attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationLog {
    pub id: i32,
    pub interview_id: i32,
    pub kind: NotificationKind,
    pub notification_time_hours: Option<f64>,
    pub sent_at: DateTime<Utc>,
    pub success: bool,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotificationLog {
    pub interview_id: i32,
    pub kind: NotificationKind,
    pub notification_time_hours: Option<f64>,
    pub sent_at: DateTime<Utc>,
    pub success: bool,
    pub error_message: Option<String>,
}

/// A reminder to chase feedback after an interview.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowUp {
    pub id: i32,
    pub interview_id: i32,
    pub reminder_date: DateTime<Utc>,
    pub message: String,
    pub sent: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFollowUp {
    pub interview_id: i32,
    pub reminder_date: DateTime<Utc>,
    pub message: String,
}

/// Short "time remaining" phrase for a lead time given in hours.
#[must_use]
pub fn lead_time_label(hours: f64) -> String {
    if hours >= 24.0 {
        let days = (hours / 24.0) as i64;
        if days > 1 {
            format!("{days} дн.")
        } else {
            "1 день".to_string()
        }
    } else if hours >= 1.0 {
        format!("{} ч.", hours as i64)
    } else {
        format!("{} мин.", (hours * 60.0).round() as i64)
    }
}

/// Compact rendering of an hour count: `24`, `1.5`, `0.25`.
#[must_use]
pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.0}")
    } else {
        let text = format!("{hours:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Renders a list of lead times as `24ч, 12ч, 1.5ч`.
#[must_use]
pub fn format_hours_list(times: &[f64]) -> String {
    times
        .iter()
        .map(|t| format!("{}ч", format_hours(*t)))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn quiet_hours_wrapping_midnight() {
        let window = QuietHours::new(at(22, 0), at(8, 0));
        assert!(window.contains(at(23, 30)));
        assert!(window.contains(at(0, 0)));
        assert!(window.contains(at(7, 59)));
        assert!(!window.contains(at(8, 0)));
        assert!(!window.contains(at(12, 0)));
        assert!(window.contains(at(22, 0)));
    }

    #[test]
    fn quiet_hours_same_day() {
        let window = QuietHours::new(at(13, 0), at(14, 0));
        assert!(window.contains(at(13, 30)));
        assert!(!window.contains(at(14, 0)));
        assert!(!window.contains(at(12, 59)));
    }

    #[test]
    fn empty_quiet_window_never_matches() {
        let window = QuietHours::new(at(9, 0), at(9, 0));
        assert!(!window.contains(at(9, 0)));
    }

    #[test]
    fn disabled_quiet_hours_are_ignored() {
        let settings = NotificationSettings {
            id: 1,
            user_id: 1,
            notification_times: vec![1.0],
            enabled: true,
            quiet_hours_enabled: false,
            quiet_hours: Some(QuietHours::default_window()),
            group_notifications: false,
        };
        assert!(!settings.is_quiet_at(at(23, 0)));
        assert_eq!(settings.active_quiet_hours(), None);
    }

    #[test]
    fn lead_time_labels() {
        assert_eq!(lead_time_label(24.0), "1 день");
        assert_eq!(lead_time_label(72.0), "3 дн.");
        assert_eq!(lead_time_label(12.0), "12 ч.");
        assert_eq!(lead_time_label(1.5), "1 ч.");
        assert_eq!(lead_time_label(0.5), "30 мин.");
    }

    #[test]
    fn hours_formatting() {
        assert_eq!(format_hours(24.0), "24");
        assert_eq!(format_hours(1.5), "1.5");
        assert_eq!(format_hours(0.25), "0.25");
        assert_eq!(format_hours_list(&[24.0, 0.5]), "24ч, 0.5ч");
    }

    #[test]
    fn notification_kind_parsing() {
        assert_eq!(NotificationKind::parse("followup"), Some(NotificationKind::FollowUp));
        assert_eq!(NotificationKind::parse("other"), None);
        assert_eq!(NotificationKind::Interview.as_str(), "interview");
    }
}
