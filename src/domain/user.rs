//! Bot users.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// A registered Telegram user.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i32,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub locale: String,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The user's timezone, falling back to `default` when the stored name is
    /// not a known IANA zone.
    #[must_use]
    pub fn tz_or(&self, default: Tz) -> Tz {
        self.timezone.parse().unwrap_or(default)
    }
}

/// Timezones offered as buttons, with their button labels.
pub const POPULAR_TIMEZONES: [(&str, &str); 10] = [
    ("Europe/Kaliningrad", "🇷🇺 Калининград (UTC+2)"),
    ("Europe/Moscow", "🇷🇺 Москва (UTC+3)"),
    ("Europe/Samara", "🇷🇺 Самара (UTC+4)"),
    ("Asia/Yekaterinburg", "🇷🇺 Екатеринбург (UTC+5)"),
    ("Asia/Novosibirsk", "🇷🇺 Новосибирск (UTC+7)"),
    ("Asia/Vladivostok", "🇷🇺 Владивосток (UTC+10)"),
    ("Europe/Minsk", "🇧🇾 Минск (UTC+3)"),
    ("Asia/Almaty", "🇰🇿 Алматы (UTC+5)"),
    ("Europe/Berlin", "🇩🇪 Берлин (CET)"),
    ("UTC", "🌐 UTC"),
];

/// Insert payload for a user seen for the first time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub locale: String,
    pub timezone: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(timezone: &str) -> User {
        User {
            id: 1,
            telegram_id: 42,
            username: None,
            locale: "ru".into(),
            timezone: timezone.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn tz_or_parses_known_zone() {
        assert_eq!(user("Asia/Tokyo").tz_or(Tz::UTC), Tz::Asia__Tokyo);
    }

    #[test]
    fn popular_timezones_are_valid() {
        for (name, _) in POPULAR_TIMEZONES {
            assert!(name.parse::<Tz>().is_ok(), "{name}");
        }
    }

    #[test]
    fn tz_or_falls_back_on_garbage() {
        assert_eq!(user("Mars/Olympus").tz_or(Tz::Europe__Moscow), Tz::Europe__Moscow);
    }
}
