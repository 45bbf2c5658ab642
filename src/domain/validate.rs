//! Parsers and validators for text typed by users.
//!
//! Every function trims its input first and returns a [`ValidationError`]
//! whose message can be shown to the user as is.

use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use url::{Host, Url};

use super::error::ValidationError;
use super::notification::QuietHours;

/// Longest lead time accepted for a reminder, in hours.
pub const MAX_NOTIFICATION_HOURS: u32 = 168;

/// Default upper bound for free-text fields.
pub const MAX_TEXT_LEN: usize = 255;

/// Accepted interview date formats, tried in order.
const DATE_FORMATS: [&str; 5] = [
    "%d.%m.%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M",
    "%d.%m.%y %H:%M",
];

/// Trim `text` and check its length in characters.
pub fn validate_text(text: &str, min: usize, max: usize) -> Result<String, ValidationError> {
    let text = text.trim();
    let len = text.chars().count();
    if len < min {
        return Err(ValidationError::TooShort { min });
    }
    if len > max {
        return Err(ValidationError::TooLong { max });
    }
    Ok(text.to_string())
}

/// Require a non-empty value of at most [`MAX_TEXT_LEN`] characters.
pub fn validate_name(text: &str) -> Result<String, ValidationError> {
    validate_text(text, 1, MAX_TEXT_LEN)
}

/// Accept absolute `http`/`https` URLs pointing at a domain, `localhost` or an IP.
pub fn validate_url(text: &str) -> Result<String, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    if text.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidUrl);
    }

    let url = Url::parse(text).map_err(|_| ValidationError::InvalidUrl)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::InvalidUrl);
    }

    let host_ok = match url.host() {
        Some(Host::Domain(domain)) => domain == "localhost" || is_public_domain(domain),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        None => false,
    };
    if !host_ok {
        return Err(ValidationError::InvalidUrl);
    }

    Ok(text.to_string())
}

fn is_public_domain(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.');
    let mut labels = domain.split('.');
    let Some(tld) = domain.rsplit('.').next() else {
        return false;
    };
    let has_dot = domain.contains('.');
    let tld_ok = (2..=63).contains(&tld.len())
        && (tld.chars().all(|c| c.is_ascii_alphabetic()) || tld.starts_with("xn--"));
    has_dot
        && tld_ok
        && labels.all(|label| {
            !label.is_empty() && !label.starts_with('-') && !label.ends_with('-')
        })
}

/// Parse an interview date typed in the user's timezone.
///
/// The result is in UTC and must be strictly after `now`.
pub fn parse_datetime(
    text: &str,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ValidationError> {
    let text = text.trim();

    for format in DATE_FORMATS {
        let Ok(naive) = NaiveDateTime::parse_from_str(text, format) else {
            continue;
        };
        // `%Y` happily reads "24" as year 24; leave two-digit years to `%y`.
        if naive.year() < 1000 {
            continue;
        }

        let Some(local) = tz.from_local_datetime(&naive).earliest() else {
            // Skipped by a DST jump.
            return Err(ValidationError::InvalidDate);
        };
        let utc = local.with_timezone(&Utc);
        if utc <= now {
            return Err(ValidationError::DateInPast);
        }
        return Ok(utc);
    }

    Err(ValidationError::InvalidDate)
}

/// Parse a comma separated list of lead times in hours.
///
/// Values must be positive and at most [`MAX_NOTIFICATION_HOURS`]. The result
/// is deduplicated and sorted from the earliest reminder to the latest.
pub fn parse_notification_times(text: &str) -> Result<Vec<f64>, ValidationError> {
    let mut times = Vec::new();
    for part in text.trim().split(',') {
        let value: f64 = part
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidNotificationTimes)?;
        if !value.is_finite() {
            return Err(ValidationError::InvalidNotificationTimes);
        }
        if value <= 0.0 {
            return Err(ValidationError::NonPositiveTime);
        }
        if value > f64::from(MAX_NOTIFICATION_HOURS) {
            return Err(ValidationError::TimeTooLarge {
                max: MAX_NOTIFICATION_HOURS,
            });
        }
        times.push(value);
    }

    normalize_times(&mut times);
    Ok(times)
}

/// Sort lead times descending and drop duplicates.
pub fn normalize_times(times: &mut Vec<f64>) {
    times.sort_by(|a, b| b.total_cmp(a));
    times.dedup();
}

/// Parse an IANA timezone name such as `Europe/Moscow`.
pub fn parse_timezone(text: &str) -> Result<Tz, ValidationError> {
    let text = text.trim();
    text.parse::<Tz>()
        .map_err(|_| ValidationError::InvalidTimezone(text.to_string()))
}

/// Parse a wall clock time in `HH:MM` form.
pub fn parse_clock(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M").ok()
}

/// Parse a quiet hours window written as `HH:MM-HH:MM`.
pub fn parse_quiet_hours(text: &str) -> Result<QuietHours, ValidationError> {
    let (start, end) = text
        .trim()
        .split_once('-')
        .ok_or(ValidationError::InvalidQuietHours)?;
    let start = parse_clock(start).ok_or(ValidationError::InvalidQuietHours)?;
    let end = parse_clock(end).ok_or(ValidationError::InvalidQuietHours)?;
    Ok(QuietHours::new(start, end))
}

/// Parse an interview rating between 1 and 5.
pub fn validate_rating(text: &str) -> Result<u8, ValidationError> {
    match text.trim().parse::<u8>() {
        Ok(value @ 1..=5) => Ok(value),
        _ => Err(ValidationError::InvalidRating),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    // -------------------------------------------------------------------------
    // Text
    // -------------------------------------------------------------------------

    #[test]
    fn text_is_trimmed() {
        assert_eq!(validate_text("  Acme  ", 1, 255).unwrap(), "Acme");
    }

    #[test]
    fn text_length_limits() {
        assert_eq!(
            validate_text("   ", 1, 255),
            Err(ValidationError::TooShort { min: 1 })
        );
        assert_eq!(
            validate_text("abcdef", 1, 5),
            Err(ValidationError::TooLong { max: 5 })
        );
    }

    #[test]
    fn text_length_counts_characters_not_bytes() {
        assert!(validate_text("Привет", 1, 6).is_ok());
    }

    // -------------------------------------------------------------------------
    // URLs
    // -------------------------------------------------------------------------

    #[test]
    fn accepts_common_urls() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://meet.google.com/abc-defg-hij").is_ok());
        assert!(validate_url("https://zoom.us/j/123?pwd=xyz").is_ok());
        assert!(validate_url("http://localhost:8080/room").is_ok());
        assert!(validate_url("http://127.0.0.1/x").is_ok());
    }

    #[test]
    fn rejects_bad_urls() {
        assert_eq!(validate_url("  "), Err(ValidationError::EmptyUrl));
        assert_eq!(validate_url("example.com"), Err(ValidationError::InvalidUrl));
        assert_eq!(validate_url("ftp://example.com"), Err(ValidationError::InvalidUrl));
        assert_eq!(validate_url("https://intranet"), Err(ValidationError::InvalidUrl));
        assert_eq!(
            validate_url("https://exa mple.com"),
            Err(ValidationError::InvalidUrl)
        );
    }

    // -------------------------------------------------------------------------
    // Dates
    // -------------------------------------------------------------------------

    #[test]
    fn parses_dotted_date_in_user_timezone() {
        let parsed = parse_datetime("25.12.2026 14:30", Tz::Europe__Moscow, now()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 12, 25, 11, 30, 0).unwrap());
    }

    #[test]
    fn parses_all_supported_formats() {
        let tz = Tz::UTC;
        let expected = Utc.with_ymd_and_hms(2026, 12, 25, 14, 30, 0).unwrap();
        for text in [
            "25.12.2026 14:30",
            "25.12.2026 14:30:00",
            "25/12/2026 14:30",
            "2026-12-25 14:30",
            "25.12.26 14:30",
        ] {
            assert_eq!(parse_datetime(text, tz, now()).unwrap(), expected, "{text}");
        }
    }

    #[test]
    fn rejects_past_dates() {
        assert_eq!(
            parse_datetime("01.01.2020 10:00", Tz::UTC, now()),
            Err(ValidationError::DateInPast)
        );
        assert_eq!(
            parse_datetime("01.06.2026 12:00", Tz::UTC, now()),
            Err(ValidationError::DateInPast)
        );
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(
            parse_datetime("tomorrow", Tz::UTC, now()),
            Err(ValidationError::InvalidDate)
        );
        assert_eq!(
            parse_datetime("32.01.2027 10:00", Tz::UTC, now()),
            Err(ValidationError::InvalidDate)
        );
    }

    // -------------------------------------------------------------------------
    // Notification times
    // -------------------------------------------------------------------------

    #[test]
    fn notification_times_are_sorted_and_deduplicated() {
        assert_eq!(
            parse_notification_times("1, 24, 0.5, 24, 3").unwrap(),
            vec![24.0, 3.0, 1.0, 0.5]
        );
    }

    #[test]
    fn notification_times_bounds() {
        assert_eq!(
            parse_notification_times("0"),
            Err(ValidationError::NonPositiveTime)
        );
        assert_eq!(
            parse_notification_times("-1"),
            Err(ValidationError::NonPositiveTime)
        );
        assert_eq!(
            parse_notification_times("169"),
            Err(ValidationError::TimeTooLarge { max: 168 })
        );
        assert!(parse_notification_times("168").is_ok());
    }

    #[test]
    fn notification_times_reject_garbage() {
        assert_eq!(
            parse_notification_times("a, b"),
            Err(ValidationError::InvalidNotificationTimes)
        );
        assert_eq!(
            parse_notification_times("1,,2"),
            Err(ValidationError::InvalidNotificationTimes)
        );
        assert_eq!(
            parse_notification_times("NaN"),
            Err(ValidationError::InvalidNotificationTimes)
        );
    }

    // -------------------------------------------------------------------------
    // Timezones, quiet hours, rating
    // -------------------------------------------------------------------------

    #[test]
    fn timezone_parsing() {
        assert_eq!(parse_timezone(" Asia/Yekaterinburg ").unwrap(), Tz::Asia__Yekaterinburg);
        assert_eq!(
            parse_timezone("Moscow"),
            Err(ValidationError::InvalidTimezone("Moscow".into()))
        );
    }

    #[test]
    fn quiet_hours_parsing() {
        let window = parse_quiet_hours("22:00 - 08:00").unwrap();
        assert_eq!(window.start, NaiveTime::from_hms_opt(22, 0, 0).unwrap());
        assert_eq!(window.end, NaiveTime::from_hms_opt(8, 0, 0).unwrap());

        assert_eq!(
            parse_quiet_hours("22:00"),
            Err(ValidationError::InvalidQuietHours)
        );
        assert_eq!(
            parse_quiet_hours("25:00-08:00"),
            Err(ValidationError::InvalidQuietHours)
        );
    }

    #[test]
    fn rating_range() {
        assert_eq!(validate_rating("5"), Ok(5));
        assert_eq!(validate_rating("0"), Err(ValidationError::InvalidRating));
        assert_eq!(validate_rating("6"), Err(ValidationError::InvalidRating));
        assert_eq!(validate_rating("x"), Err(ValidationError::InvalidRating));
    }
}
