mod support;

use chrono::{Duration, NaiveTime};
use interview_bot::application::notification::TickReport;
use interview_bot::application::BotSettings;
use interview_bot::domain::{InterviewStatus, QuietHours};

use support::{base_time, draft, in_hours, Harness, Sent};

const ALICE: i64 = 1001;
const BOB: i64 = 2002;

fn clock(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

async fn harness_with_interview(hours_ahead: f64) -> (Harness, i32) {
    let h = Harness::new();
    h.interviews.register(ALICE, None).await.unwrap();
    let interview = h
        .interviews
        .create_interview(ALICE, &draft("Acme", in_hours(hours_ahead)))
        .await
        .unwrap();
    (h, interview.id)
}

// ----------------------------------------------------------------------------
// Reminders
// ----------------------------------------------------------------------------

#[tokio::test]
async fn due_reminder_is_sent_once() {
    let (h, _) = harness_with_interview(24.0).await;

    let report = h.notifications.tick(base_time()).await.unwrap();
    assert_eq!(report.sent, 1);

    let texts = h.messenger.texts();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].0, ALICE);
    assert!(texts[0].1.contains("Напоминание о собеседовании"));
    assert!(texts[0].1.contains("Через 1 день"));
    assert!(texts[0].1.contains("Acme"));
    // 09:00 UTC the next day is 12:00 in Moscow.
    assert!(texts[0].1.contains("11.03.2030 12:00"));

    let again = h
        .notifications
        .tick(base_time() + Duration::seconds(30))
        .await
        .unwrap();
    assert_eq!(again, TickReport::default());
    assert_eq!(h.messenger.len(), 1);
}

#[tokio::test]
async fn nothing_is_sent_between_lead_times() {
    let (h, _) = harness_with_interview(20.0).await;
    let report = h.notifications.tick(base_time()).await.unwrap();
    assert_eq!(report, TickReport::default());
    assert_eq!(h.messenger.len(), 0);
}

#[tokio::test]
async fn fractional_lead_times_are_honoured() {
    let (h, _) = harness_with_interview(1.5).await;
    let report = h.notifications.tick(base_time()).await.unwrap();
    assert_eq!(report.sent, 1);
    assert!(h.messenger.texts()[0].1.contains("Через 1 ч."));
}

#[tokio::test]
async fn disabled_notifications_are_not_sent() {
    let (h, _) = harness_with_interview(24.0).await;
    assert!(!h.notifications.toggle(ALICE).await.unwrap());

    let report = h.notifications.tick(base_time()).await.unwrap();
    assert_eq!(report, TickReport::default());
    assert_eq!(h.messenger.len(), 0);
}

#[tokio::test]
async fn cancelled_interviews_get_no_reminders() {
    let (h, id) = harness_with_interview(24.0).await;
    h.interviews
        .change_status(ALICE, id, InterviewStatus::Cancelled, None, base_time())
        .await
        .unwrap();

    let report = h.notifications.tick(base_time()).await.unwrap();
    assert_eq!(report.sent, 0);
}

#[tokio::test]
async fn rescheduled_interviews_are_still_reminded() {
    let (h, id) = harness_with_interview(24.0).await;
    let changed = h
        .interviews
        .change_status(ALICE, id, InterviewStatus::Rescheduled, None, base_time())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(changed.status, InterviewStatus::Rescheduled);

    let report = h.notifications.tick(base_time()).await.unwrap();
    assert_eq!(report.sent, 1);
    assert!(h.messenger.texts()[0].1.contains("Acme"));
}

#[tokio::test]
async fn oversized_window_does_not_abort_the_pass() {
    let h = Harness::with_settings(BotSettings {
        reminder_window_secs: 100_000_000_000_000_000,
        ..BotSettings::default()
    });
    h.interviews.register(ALICE, None).await.unwrap();
    h.interviews
        .create_interview(ALICE, &draft("Acme", in_hours(24.0)))
        .await
        .unwrap();

    let report = h.notifications.tick(base_time()).await.unwrap();
    assert_eq!(report.sent, 0);
    assert_eq!(h.messenger.len(), 0);
}

#[tokio::test]
async fn custom_times_replace_defaults() {
    let (h, _) = harness_with_interview(2.0).await;
    let settings = h.notifications.set_times(ALICE, vec![2.0]).await.unwrap();
    assert_eq!(settings.notification_times, vec![2.0]);

    assert_eq!(h.notifications.tick(base_time()).await.unwrap().sent, 1);

    let reset = h.notifications.reset_times(ALICE).await.unwrap();
    assert_eq!(reset.notification_times, h.settings.notification_times);
}

#[tokio::test]
async fn quiet_hours_hold_reminders_back() {
    let (h, _) = harness_with_interview(24.0).await;
    // 12:00 local time in Moscow falls inside the window.
    h.notifications
        .set_quiet_hours(ALICE, Some(QuietHours::new(clock(11, 0), clock(13, 0))))
        .await
        .unwrap();

    let report = h.notifications.tick(base_time()).await.unwrap();
    assert_eq!(report.quiet, 1);
    assert_eq!(report.sent, 0);
    assert_eq!(h.messenger.len(), 0);

    let settings = h.notifications.set_quiet_hours(ALICE, None).await.unwrap();
    assert!(!settings.quiet_hours_enabled);
    assert!(settings.quiet_hours.is_some());
    assert_eq!(h.notifications.tick(base_time()).await.unwrap().sent, 1);
}

#[tokio::test]
async fn quiet_hours_use_the_users_timezone() {
    let (h, _) = harness_with_interview(24.0).await;
    // 09:00 UTC is 09:00 in UTC but 12:00 in Moscow.
    h.interviews.set_timezone(ALICE, chrono_tz::UTC).await.unwrap();
    h.notifications
        .set_quiet_hours(ALICE, Some(QuietHours::new(clock(11, 0), clock(13, 0))))
        .await
        .unwrap();

    assert_eq!(h.notifications.tick(base_time()).await.unwrap().sent, 1);
}

#[tokio::test]
async fn grouping_merges_reminders_into_one_message() {
    let h = Harness::new();
    h.interviews.register(ALICE, None).await.unwrap();
    for company in ["Acme", "Globex"] {
        h.interviews
            .create_interview(ALICE, &draft(company, in_hours(3.0)))
            .await
            .unwrap();
    }
    assert!(h.notifications.toggle_grouping(ALICE).await.unwrap());

    let report = h.notifications.tick(base_time()).await.unwrap();
    assert_eq!(report.sent, 2);

    let texts = h.messenger.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].1.contains("Напоминания о собеседованиях (2)"));
    assert!(texts[0].1.contains("Acme"));
    assert!(texts[0].1.contains("Globex"));
}

#[tokio::test]
async fn users_are_reminded_separately() {
    let h = Harness::new();
    for chat in [ALICE, BOB] {
        h.interviews.register(chat, None).await.unwrap();
        h.interviews
            .create_interview(chat, &draft("Acme", in_hours(6.0)))
            .await
            .unwrap();
    }

    assert_eq!(h.notifications.tick(base_time()).await.unwrap().sent, 2);
    let mut chats: Vec<_> = h.messenger.texts().into_iter().map(|(chat, _)| chat).collect();
    chats.sort_unstable();
    assert_eq!(chats, [ALICE, BOB]);
}

#[tokio::test]
async fn failed_delivery_is_retried_while_the_window_is_open() {
    let (h, _) = harness_with_interview(24.0).await;

    h.messenger.fail(true);
    let report = h.notifications.tick(base_time()).await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.sent, 0);

    h.messenger.fail(false);
    let report = h
        .notifications
        .tick(base_time() + Duration::seconds(30))
        .await
        .unwrap();
    assert_eq!(report.sent, 1);
    assert_eq!(h.messenger.len(), 1);
}

// ----------------------------------------------------------------------------
// Follow-ups
// ----------------------------------------------------------------------------

#[tokio::test]
async fn followup_is_sent_when_due() {
    let (h, id) = harness_with_interview(-1.0).await;
    h.interviews
        .change_status(ALICE, id, InterviewStatus::WaitingFeedback, None, base_time())
        .await
        .unwrap();

    let early = h.notifications.tick(base_time() + Duration::days(1)).await.unwrap();
    assert_eq!(early.followups, 0);

    let due_at = base_time() + Duration::days(h.settings.followup_days);
    let report = h.notifications.tick(due_at).await.unwrap();
    assert_eq!(report.followups, 1);

    let sent = h.messenger.sent();
    assert_eq!(sent.len(), 1);
    match &sent[0] {
        Sent::Text { chat_id, html } => {
            assert_eq!(*chat_id, ALICE);
            assert!(html.contains("Время узнать результат"));
            assert!(html.contains("Acme"));
        }
        other => panic!("expected text, got {other:?}"),
    }

    let later = h.notifications.tick(due_at + Duration::minutes(1)).await.unwrap();
    assert_eq!(later.followups, 0);
}

#[tokio::test]
async fn failed_followup_stays_pending() {
    let (h, id) = harness_with_interview(-1.0).await;
    h.interviews
        .change_status(ALICE, id, InterviewStatus::Completed, None, base_time())
        .await
        .unwrap();
    let due_at = base_time() + Duration::days(h.settings.followup_days);

    h.messenger.fail(true);
    assert_eq!(h.notifications.tick(due_at).await.unwrap().followups, 0);

    h.messenger.fail(false);
    assert_eq!(
        h.notifications
            .tick(due_at + Duration::minutes(1))
            .await
            .unwrap()
            .followups,
        1
    );
}
