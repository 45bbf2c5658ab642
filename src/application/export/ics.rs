//! iCalendar (RFC 5545) output for interviews.

use chrono::{DateTime, Duration, Utc};

use crate::domain::Interview;

pub const PRODID: &str = "-//Interview Bot//Interview Calendar//EN";

/// Length of a calendar event.
const EVENT_LENGTH_HOURS: i64 = 1;

/// Maximum octets per content line, excluding the CRLF.
const MAX_LINE_OCTETS: usize = 75;

/// Render a VCALENDAR with one VEVENT per interview.
#[must_use]
pub fn render_calendar(interviews: &[Interview], stamp: DateTime<Utc>) -> String {
    let mut cal = Calendar::default();
    cal.line("BEGIN", "VCALENDAR");
    cal.line("PRODID", PRODID);
    cal.line("VERSION", "2.0");
    cal.line("CALSCALE", "GREGORIAN");
    cal.line("METHOD", "PUBLISH");
    for interview in interviews {
        event(&mut cal, interview, stamp);
    }
    cal.line("END", "VCALENDAR");
    cal.out
}

fn event(cal: &mut Calendar, interview: &Interview, stamp: DateTime<Utc>) {
    let start = interview.interview_date;
    let end = start + Duration::hours(EVENT_LENGTH_HOURS);

    let mut description = vec![
        format!("Компания: {}", interview.company_name),
        format!("Позиция: {}", interview.position),
        format!("Рекрутер: {}", interview.recruiter_name),
        format!("Платформа: {}", interview.platform_name),
    ];
    if let Some(url) = &interview.platform_url {
        description.push(format!("Ссылка: {url}"));
    }

    cal.line("BEGIN", "VEVENT");
    cal.line("UID", &format!("interview-{}@interview-bot", interview.id));
    cal.line("DTSTAMP", &format_utc(stamp));
    cal.line("DTSTART", &format_utc(start));
    cal.line("DTEND", &format_utc(end));
    cal.line(
        "SUMMARY",
        &escape_text(&format!(
            "Интервью: {} - {}",
            interview.company_name, interview.position
        )),
    );
    cal.line("DESCRIPTION", &escape_text(&description.join("\n")));
    if let Some(url) = &interview.platform_url {
        cal.line("URL", url);
    }
    cal.line("LOCATION", &escape_text(&interview.platform_name));
    cal.line("END", "VEVENT");
}

#[derive(Default)]
struct Calendar {
    out: String,
}

impl Calendar {
    fn line(&mut self, name: &str, value: &str) {
        fold_into(&mut self.out, &format!("{name}:{value}"));
    }
}

/// UTC date-time in basic format, e.g. `20300101T100000Z`.
#[must_use]
pub fn format_utc(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escape a TEXT value.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Append `line` folded at 75 octets, never splitting a UTF-8 sequence.
///
/// Continuation lines start with a single space, which counts toward the
/// limit.
fn fold_into(out: &mut String, line: &str) {
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InterviewStatus, InterviewType};
    use chrono::TimeZone;

    fn interview() -> Interview {
        let at = Utc.with_ymd_and_hms(2030, 1, 15, 10, 0, 0).unwrap();
        Interview {
            id: 42,
            user_id: 1,
            recruiter_id: None,
            parent_interview_id: None,
            company_name: "Acme, Inc.".into(),
            position: "Rust; Backend".into(),
            vacancy_url: None,
            recruiter_name: "Anna".into(),
            interview_date: at,
            original_date: None,
            platform_name: "Zoom".into(),
            platform_url: Some("https://zoom.us/j/123".into()),
            camera_required: true,
            interview_type: InterviewType::Technical,
            status: InterviewStatus::Scheduled,
            preparation_notes: None,
            post_interview_notes: None,
            rating: None,
            checklist: Vec::new(),
            stage_number: 1,
            created_at: at,
            updated_at: at,
            completed_at: None,
        }
    }

    #[test]
    fn calendar_has_event_fields() {
        let stamp = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let ics = render_calendar(&[interview()], stamp);
        let unfolded = ics.replace("\r\n ", "");

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(unfolded.contains(&format!("PRODID:{PRODID}\r\n")));
        assert!(unfolded.contains("UID:interview-42@interview-bot\r\n"));
        assert!(unfolded.contains("DTSTAMP:20300101T000000Z\r\n"));
        assert!(unfolded.contains("DTSTART:20300115T100000Z\r\n"));
        assert!(unfolded.contains("DTEND:20300115T110000Z\r\n"));
        assert!(unfolded.contains("SUMMARY:Интервью: Acme\\, Inc. - Rust\\; Backend\r\n"));
        assert!(unfolded.contains("URL:https://zoom.us/j/123\r\n"));
        assert!(unfolded.contains("LOCATION:Zoom\r\n"));
        assert!(unfolded.contains("\\nСсылка: https://zoom.us/j/123"));
    }

    #[test]
    fn empty_calendar_is_still_valid() {
        let ics = render_calendar(&[], Utc::now());
        assert!(!ics.contains("VEVENT"));
        assert!(ics.contains("VERSION:2.0"));
    }

    #[test]
    fn long_lines_fold_on_char_boundaries() {
        let mut out = String::new();
        let line = format!("DESCRIPTION:{}", "Ж".repeat(100));
        fold_into(&mut out, &line);

        for physical in out.split("\r\n").filter(|l| !l.is_empty()) {
            assert!(physical.len() <= MAX_LINE_OCTETS, "{} octets", physical.len());
        }
        assert_eq!(out.replace("\r\n ", ""), format!("{line}\r\n"));
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(escape_text("a\\b;c,d\ne"), "a\\\\b\\;c\\,d\\ne");
    }
}
