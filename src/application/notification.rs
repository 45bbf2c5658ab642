//! Interview reminders and follow-ups.
//!
//! # Architecture
//!
//! ```text
//! Scheduler --(every minute)--> NotificationService::tick(now)
//!                                        |
//!                                        +-- upcoming interviews, grouped by owner
//!                                        +-- due lead times not yet delivered
//!                                        +-- quiet hours in the owner's timezone
//!                                        +-- Messenger::send_text
//!                                        +-- notification_logs (success or error)
//!                                        |
//!                                        +-- due follow-ups
//! ```
//!
//! A reminder for `(interview, lead time)` is due when the current time is
//! within the configured window of `interview_date - lead time`. It is sent
//! at most once successfully; failed attempts are logged and retried on the
//! next pass while the window is still open.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use super::html::{escape, yes_no};
use super::interview::DATE_DISPLAY_FORMAT;
use super::BotSettings;
use crate::domain::validate::normalize_times;
use crate::domain::{
    lead_time_label, FollowUp, Interview, NewNotificationLog, NotificationKind,
    NotificationSettings, QuietHours, User,
};
use crate::error::{ConfigError, Error, Result};
use crate::port::{Messenger, Repository};

/// Counters for one scheduler pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Reminders delivered.
    pub sent: usize,
    /// Reminders whose delivery failed.
    pub failed: usize,
    /// Due reminders held back by quiet hours.
    pub quiet: usize,
    /// Follow-ups delivered.
    pub followups: usize,
}

/// A reminder that should go out in this pass.
#[derive(Debug, Clone)]
struct DueReminder {
    interview: Interview,
    hours: f64,
}

/// Sends reminders and manages per-user reminder settings.
pub struct NotificationService<R, M> {
    repo: Arc<R>,
    messenger: Arc<M>,
    settings: BotSettings,
}

impl<R, M> Clone for NotificationService<R, M> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            messenger: Arc::clone(&self.messenger),
            settings: self.settings.clone(),
        }
    }
}

impl<R: Repository, M: Messenger + 'static> NotificationService<R, M> {
    pub fn new(repo: Arc<R>, messenger: Arc<M>, settings: BotSettings) -> Self {
        Self {
            repo,
            messenger,
            settings,
        }
    }

    /// Run one scheduler pass at `now`.
    ///
    /// Failures for one user or follow-up are logged and never abort the pass.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<TickReport> {
        let mut report = TickReport::default();

        let interviews = self.repo.upcoming_interviews(now).await?;
        let mut by_user: BTreeMap<i32, Vec<Interview>> = BTreeMap::new();
        for interview in interviews {
            by_user.entry(interview.user_id).or_default().push(interview);
        }

        for (user_id, interviews) in by_user {
            if let Err(e) = self
                .remind_user(user_id, interviews, now, &mut report)
                .await
            {
                warn!(user_id, error = %e, "Failed to process reminders");
            }
        }

        match self.repo.due_followups(now).await {
            Ok(followups) => {
                for followup in followups {
                    match self.send_followup(&followup, now).await {
                        Ok(true) => report.followups += 1,
                        Ok(false) => {}
                        Err(e) => {
                            warn!(followup_id = followup.id, error = %e, "Failed to send follow-up");
                        }
                    }
                }
            }
            Err(e) => warn!(error = %e, "Failed to load due follow-ups"),
        }

        if report != TickReport::default() {
            info!(
                sent = report.sent,
                failed = report.failed,
                quiet = report.quiet,
                followups = report.followups,
                "Notification pass finished"
            );
        }
        Ok(report)
    }

    async fn remind_user(
        &self,
        user_id: i32,
        interviews: Vec<Interview>,
        now: DateTime<Utc>,
        report: &mut TickReport,
    ) -> Result<()> {
        let Some(settings) = self.repo.notification_settings(user_id).await? else {
            return Ok(());
        };
        if !settings.enabled {
            return Ok(());
        }
        let Some(user) = self.repo.get_user(user_id).await? else {
            return Ok(());
        };

        let window = Duration::try_seconds(self.settings.reminder_window_secs).ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "window_secs",
                reason: format!("{} seconds is out of range", self.settings.reminder_window_secs),
            }
        })?;
        let mut due = Vec::new();
        for interview in interviews {
            for &hours in &settings.notification_times {
                let remind_at = interview.interview_date - lead_time(hours);
                if (now - remind_at).abs() > window {
                    continue;
                }
                if self.repo.was_notified(interview.id, hours).await? {
                    continue;
                }
                due.push(DueReminder {
                    interview: interview.clone(),
                    hours,
                });
            }
        }
        if due.is_empty() {
            return Ok(());
        }

        let tz = user.tz_or(self.settings.timezone);
        let local = now.with_timezone(&tz).time();
        if settings.is_quiet_at(local) {
            debug!(user_id, count = due.len(), "Reminders held back by quiet hours");
            report.quiet += due.len();
            return Ok(());
        }

        if settings.group_notifications && due.len() > 1 {
            let text = grouped_message(&due, tz);
            let outcome = self.messenger.send_text(user.telegram_id, &text).await;
            for reminder in &due {
                self.record(&user, reminder, now, &outcome, report).await?;
            }
        } else {
            for reminder in &due {
                let text = reminder_message(
                    &reminder.interview,
                    &lead_time_label(reminder.hours),
                    tz,
                );
                let outcome = self.messenger.send_text(user.telegram_id, &text).await;
                self.record(&user, reminder, now, &outcome, report).await?;
            }
        }
        Ok(())
    }

    async fn record(
        &self,
        user: &User,
        reminder: &DueReminder,
        now: DateTime<Utc>,
        outcome: &Result<()>,
        report: &mut TickReport,
    ) -> Result<()> {
        let error_message = match outcome {
            Ok(()) => {
                report.sent += 1;
                info!(
                    telegram_id = user.telegram_id,
                    interview_id = reminder.interview.id,
                    hours = reminder.hours,
                    "Reminder sent"
                );
                None
            }
            Err(e) => {
                report.failed += 1;
                warn!(
                    telegram_id = user.telegram_id,
                    interview_id = reminder.interview.id,
                    hours = reminder.hours,
                    error = %e,
                    "Reminder delivery failed"
                );
                Some(e.to_string())
            }
        };
        self.repo
            .log_notification(&NewNotificationLog {
                interview_id: reminder.interview.id,
                kind: NotificationKind::Interview,
                notification_time_hours: Some(reminder.hours),
                sent_at: now,
                success: outcome.is_ok(),
                error_message,
            })
            .await
    }

    /// Returns whether the follow-up was delivered.
    async fn send_followup(&self, followup: &FollowUp, now: DateTime<Utc>) -> Result<bool> {
        let Some(interview) = self.repo.get_interview(followup.interview_id).await? else {
            self.repo.mark_followup_sent(followup.id).await?;
            return Ok(false);
        };
        let Some(user) = self.repo.get_user(interview.user_id).await? else {
            self.repo.mark_followup_sent(followup.id).await?;
            return Ok(false);
        };

        let text = followup_text(followup);
        let outcome = self.messenger.send_text(user.telegram_id, &text).await;
        let delivered = outcome.is_ok();
        if delivered {
            self.repo.mark_followup_sent(followup.id).await?;
            info!(followup_id = followup.id, interview_id = interview.id, "Follow-up sent");
        }
        self.repo
            .log_notification(&NewNotificationLog {
                interview_id: interview.id,
                kind: NotificationKind::FollowUp,
                notification_time_hours: None,
                sent_at: now,
                success: delivered,
                error_message: outcome.err().map(|e| e.to_string()),
            })
            .await?;
        Ok(delivered)
    }

    // Settings

    async fn user_id(&self, telegram_id: i64) -> Result<i32> {
        self.repo
            .find_user(telegram_id)
            .await?
            .map(|u| u.id)
            .ok_or(Error::NotFound { entity: "user" })
    }

    /// The user's settings, created with defaults on first access.
    pub async fn settings(&self, telegram_id: i64) -> Result<NotificationSettings> {
        let user_id = self.user_id(telegram_id).await?;
        self.repo
            .get_or_create_settings(user_id, &self.settings.notification_times)
            .await
    }

    /// Default lead times.
    #[must_use]
    pub fn default_times(&self) -> &[f64] {
        &self.settings.notification_times
    }

    async fn update(
        &self,
        telegram_id: i64,
        apply: impl FnOnce(&mut NotificationSettings),
    ) -> Result<NotificationSettings> {
        let mut settings = self.settings(telegram_id).await?;
        apply(&mut settings);
        self.repo.save_settings(&settings).await?;
        debug!(telegram_id, "Notification settings saved");
        Ok(settings)
    }

    /// Switch reminders on or off. Returns the new state.
    pub async fn toggle(&self, telegram_id: i64) -> Result<bool> {
        let settings = self
            .update(telegram_id, |s| s.enabled = !s.enabled)
            .await?;
        Ok(settings.enabled)
    }

    pub async fn set_times(
        &self,
        telegram_id: i64,
        mut times: Vec<f64>,
    ) -> Result<NotificationSettings> {
        normalize_times(&mut times);
        self.update(telegram_id, |s| s.notification_times = times)
            .await
    }

    pub async fn reset_times(&self, telegram_id: i64) -> Result<NotificationSettings> {
        let defaults = self.settings.notification_times.clone();
        self.update(telegram_id, |s| s.notification_times = defaults)
            .await
    }

    /// Enable quiet hours with `window`, or disable them with `None`.
    ///
    /// Disabling keeps the last window so it can be shown again later.
    pub async fn set_quiet_hours(
        &self,
        telegram_id: i64,
        window: Option<QuietHours>,
    ) -> Result<NotificationSettings> {
        self.update(telegram_id, |s| match window {
            Some(window) => {
                s.quiet_hours_enabled = true;
                s.quiet_hours = Some(window);
            }
            None => s.quiet_hours_enabled = false,
        })
        .await
    }

    /// Switch message grouping on or off. Returns the new state.
    pub async fn toggle_grouping(&self, telegram_id: i64) -> Result<bool> {
        let settings = self
            .update(telegram_id, |s| {
                s.group_notifications = !s.group_notifications;
            })
            .await?;
        Ok(settings.group_notifications)
    }
}

fn lead_time(hours: f64) -> Duration {
    Duration::seconds((hours * 3600.0).round() as i64)
}

/// The reminder sent for one interview.
#[must_use]
pub fn reminder_message(interview: &Interview, lead_label: &str, tz: Tz) -> String {
    let mut lines = vec![
        "🔔 <b>Напоминание о собеседовании!</b>".to_string(),
        format!("⏰ Через {lead_label}\n"),
        format!("🏢 <b>Компания:</b> {}", escape(&interview.company_name)),
        format!("💼 <b>Позиция:</b> {}", escape(&interview.position)),
        format!("👤 <b>Рекрутер:</b> {}", escape(&interview.recruiter_name)),
        format!(
            "📅 <b>Дата и время:</b> {}",
            interview.local_date(tz).format(DATE_DISPLAY_FORMAT)
        ),
        format!("💻 <b>Платформа:</b> {}", escape(&interview.platform_name)),
    ];
    if let Some(url) = &interview.platform_url {
        lines.push(format!("🔗 <b>Ссылка:</b> {}", escape(url)));
    }
    lines.push(format!("📹 <b>Камера:</b> {}", yes_no(interview.camera_required)));
    lines.push(format!("📝 <b>Тип:</b> {}", interview.interview_type.label()));
    lines.join("\n")
}

fn grouped_message(due: &[DueReminder], tz: Tz) -> String {
    let mut text = format!(
        "🔔 <b>Напоминания о собеседованиях ({})</b>\n",
        due.len()
    );
    for reminder in due {
        let interview = &reminder.interview;
        text.push_str(&format!(
            "\n⏰ Через {}: <b>{}</b> - {}\n📅 {}\n💻 {}",
            lead_time_label(reminder.hours),
            escape(&interview.company_name),
            escape(&interview.position),
            interview.local_date(tz).format(DATE_DISPLAY_FORMAT),
            escape(&interview.platform_name),
        ));
        if let Some(url) = &interview.platform_url {
            text.push_str(&format!("\n🔗 {}", escape(url)));
        }
        text.push('\n');
    }
    text
}

fn followup_text(followup: &FollowUp) -> String {
    format!(
        "📬 <b>Время узнать результат!</b>\n\n{}",
        escape(&followup.message)
    )
}
