//! Interview tracking use cases.
//!
//! [`InterviewService`] resolves Telegram ids to stored users and scopes every
//! lookup to that user. It also manages the recruiter address book, templates
//! and the user's timezone, which the dialogue flows edit alongside interviews.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use tracing::{debug, info};

use super::html::{escape, yes_no};
use super::BotSettings;
use crate::domain::{
    Interview, InterviewDetails, InterviewDraft, InterviewStatus, InterviewTemplate, NewFollowUp,
    NewInterview, NewRecruiter, NewTemplate, NewUser, Recruiter, StatusChange,
    StatusHistoryEntry, User,
};
use crate::error::{ConfigError, Error, Result};
use crate::port::Repository;

/// `now` plus `days`, rejected when the sum leaves chrono's range.
fn followup_date(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
    Duration::try_days(days)
        .and_then(|delay| now.checked_add_signed(delay))
        .ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "default_followup_days",
                reason: format!("{days} days is out of range"),
            }
            .into()
        })
}

/// Date format used in every user-facing message.
pub const DATE_DISPLAY_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Interview, recruiter and template management for bot users.
pub struct InterviewService<R> {
    repo: Arc<R>,
    settings: BotSettings,
}

impl<R> Clone for InterviewService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            settings: self.settings.clone(),
        }
    }
}

impl<R: Repository> InterviewService<R> {
    pub fn new(repo: Arc<R>, settings: BotSettings) -> Self {
        Self { repo, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    /// Register a Telegram user, or refresh the username of a known one.
    ///
    /// Default notification settings are created alongside a new user.
    pub async fn register(&self, telegram_id: i64, username: Option<&str>) -> Result<User> {
        let user = self
            .repo
            .get_or_create_user(&NewUser {
                telegram_id,
                username: username.map(str::to_string),
                locale: self.settings.locale.clone(),
                timezone: self.settings.timezone.name().to_string(),
            })
            .await?;
        self.repo
            .get_or_create_settings(user.id, &self.settings.notification_times)
            .await?;
        debug!(telegram_id, user_id = user.id, "User registered");
        Ok(user)
    }

    /// The stored user for a Telegram id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the user never registered.
    pub async fn user(&self, telegram_id: i64) -> Result<User> {
        self.repo
            .find_user(telegram_id)
            .await?
            .ok_or(Error::NotFound { entity: "user" })
    }

    /// The user's timezone, or the configured default.
    #[must_use]
    pub fn timezone_of(&self, user: &User) -> Tz {
        user.tz_or(self.settings.timezone)
    }

    pub async fn set_timezone(&self, telegram_id: i64, tz: Tz) -> Result<()> {
        let user = self.user(telegram_id).await?;
        if !self.repo.update_timezone(user.id, tz.name()).await? {
            return Err(Error::NotFound { entity: "user" });
        }
        info!(telegram_id, timezone = tz.name(), "Timezone updated");
        Ok(())
    }

    /// Save a completed interview draft.
    ///
    /// # Errors
    ///
    /// Fails when the user is unknown or the draft is missing a field.
    pub async fn create_interview(
        &self,
        telegram_id: i64,
        draft: &InterviewDraft,
    ) -> Result<Interview> {
        let user = self.user(telegram_id).await?;
        let details = complete(draft)?;
        let interview = self
            .repo
            .create_interview(&NewInterview::new(user.id, details))
            .await?;
        info!(
            telegram_id,
            interview_id = interview.id,
            company = %interview.company_name,
            "Interview created"
        );
        Ok(interview)
    }

    /// Create an interview from a template.
    ///
    /// The template supplies platform, link, camera flag, type and checklist.
    /// The draft supplies the rest.
    pub async fn create_from_template(
        &self,
        telegram_id: i64,
        template_id: i32,
        draft: &InterviewDraft,
    ) -> Result<Interview> {
        let user = self.user(telegram_id).await?;
        let template = self
            .repo
            .find_template(user.id, template_id)
            .await?
            .ok_or(Error::NotFound { entity: "template" })?;

        let mut filled = draft.clone();
        filled.platform_name = Some(template.platform_name.clone());
        filled.platform_url = template.platform_url.clone();
        filled.camera_required = Some(template.camera_required);
        filled.interview_type = Some(template.interview_type);

        let mut new = NewInterview::new(user.id, complete(&filled)?);
        new.checklist = template.default_checklist;
        let interview = self.repo.create_interview(&new).await?;
        info!(
            telegram_id,
            interview_id = interview.id,
            template_id,
            "Interview created from template"
        );
        Ok(interview)
    }

    /// Interviews at or after `now`, earliest first.
    pub async fn upcoming(&self, telegram_id: i64, now: DateTime<Utc>) -> Result<Vec<Interview>> {
        let user = self.user(telegram_id).await?;
        self.repo.list_interviews(user.id, false, now).await
    }

    /// Every interview of the user, earliest first.
    pub async fn all(&self, telegram_id: i64) -> Result<Vec<Interview>> {
        let user = self.user(telegram_id).await?;
        self.repo.list_interviews(user.id, true, Utc::now()).await
    }

    pub async fn find(&self, telegram_id: i64, id: i32) -> Result<Option<Interview>> {
        let user = self.user(telegram_id).await?;
        self.repo.find_interview(user.id, id).await
    }

    pub async fn delete(&self, telegram_id: i64, id: i32) -> Result<bool> {
        let user = self.user(telegram_id).await?;
        let deleted = self.repo.delete_interview(user.id, id).await?;
        if deleted {
            info!(telegram_id, interview_id = id, "Interview deleted");
        }
        Ok(deleted)
    }

    /// Change an interview's status and record the transition.
    ///
    /// Moving to a status that waits for feedback schedules a follow-up
    /// reminder `followup_days` after `now`. Returns `None` when the interview
    /// is not the user's.
    pub async fn change_status(
        &self,
        telegram_id: i64,
        id: i32,
        status: InterviewStatus,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<Interview>> {
        let user = self.user(telegram_id).await?;
        let followup_at = if status.awaits_followup() {
            Some(followup_date(now, self.settings.followup_days)?)
        } else {
            None
        };
        let change = StatusChange { status, notes };
        let Some(interview) = self.repo.change_status(user.id, id, &change, now).await? else {
            return Ok(None);
        };
        info!(
            telegram_id,
            interview_id = id,
            status = status.code(),
            "Interview status changed"
        );

        if let Some(reminder_date) = followup_at {
            let followup = self
                .repo
                .create_followup(&NewFollowUp {
                    interview_id: interview.id,
                    reminder_date,
                    message: followup_message(&interview),
                })
                .await?;
            debug!(
                interview_id = id,
                followup_id = followup.id,
                due = %followup.reminder_date,
                "Follow-up scheduled"
            );
        }
        Ok(Some(interview))
    }

    /// An interview and its status transitions, oldest first.
    pub async fn history(
        &self,
        telegram_id: i64,
        id: i32,
    ) -> Result<Option<(Interview, Vec<StatusHistoryEntry>)>> {
        let Some(interview) = self.find(telegram_id, id).await? else {
            return Ok(None);
        };
        let history = self.repo.status_history(interview.id).await?;
        Ok(Some((interview, history)))
    }

    // Recruiters

    pub async fn add_recruiter(
        &self,
        telegram_id: i64,
        mut recruiter: NewRecruiter,
    ) -> Result<Recruiter> {
        let user = self.user(telegram_id).await?;
        recruiter.user_id = user.id;
        let created = self.repo.create_recruiter(&recruiter).await?;
        info!(telegram_id, recruiter_id = created.id, "Recruiter added");
        Ok(created)
    }

    pub async fn recruiters(&self, telegram_id: i64) -> Result<Vec<Recruiter>> {
        let user = self.user(telegram_id).await?;
        self.repo.list_recruiters(user.id).await
    }

    pub async fn recruiter(&self, telegram_id: i64, id: i32) -> Result<Option<Recruiter>> {
        let user = self.user(telegram_id).await?;
        self.repo.find_recruiter(user.id, id).await
    }

    pub async fn delete_recruiter(&self, telegram_id: i64, id: i32) -> Result<bool> {
        let user = self.user(telegram_id).await?;
        self.repo.delete_recruiter(user.id, id).await
    }

    // Templates

    pub async fn add_template(
        &self,
        telegram_id: i64,
        mut template: NewTemplate,
    ) -> Result<InterviewTemplate> {
        let user = self.user(telegram_id).await?;
        template.user_id = user.id;
        let created = self.repo.create_template(&template).await?;
        info!(telegram_id, template_id = created.id, "Template added");
        Ok(created)
    }

    pub async fn templates(&self, telegram_id: i64) -> Result<Vec<InterviewTemplate>> {
        let user = self.user(telegram_id).await?;
        self.repo.list_templates(user.id).await
    }

    pub async fn template(&self, telegram_id: i64, id: i32) -> Result<Option<InterviewTemplate>> {
        let user = self.user(telegram_id).await?;
        self.repo.find_template(user.id, id).await
    }

    pub async fn delete_template(&self, telegram_id: i64, id: i32) -> Result<bool> {
        let user = self.user(telegram_id).await?;
        self.repo.delete_template(user.id, id).await
    }
}

fn complete(draft: &InterviewDraft) -> Result<InterviewDetails> {
    draft
        .details()
        .ok_or_else(|| Error::Parse("interview draft is incomplete".to_string()))
}

fn followup_message(interview: &Interview) -> String {
    format!(
        "Напомнить о фидбеке: {} - {}",
        interview.company_name, interview.position
    )
}

/// HTML card describing an interview, with the date in `tz`.
#[must_use]
pub fn format_details(interview: &Interview, tz: Tz) -> String {
    let mut lines = vec![
        "📋 <b>Детали интервью</b>\n".to_string(),
        format!("🏢 <b>Компания:</b> {}", escape(&interview.company_name)),
        format!("💼 <b>Позиция:</b> {}", escape(&interview.position)),
    ];
    if let Some(url) = &interview.vacancy_url {
        lines.push(format!("🔗 <b>Вакансия:</b> {}", escape(url)));
    }
    lines.push(format!(
        "👤 <b>Рекрутер:</b> {}",
        escape(&interview.recruiter_name)
    ));
    lines.push(format!(
        "📅 <b>Дата и время:</b> {}",
        interview.local_date(tz).format(DATE_DISPLAY_FORMAT)
    ));
    lines.push(format!(
        "💻 <b>Платформа:</b> {}",
        escape(&interview.platform_name)
    ));
    if let Some(url) = &interview.platform_url {
        lines.push(format!("🔗 <b>Ссылка:</b> {}", escape(url)));
    }
    lines.push(format!("📹 <b>Камера:</b> {}", yes_no(interview.camera_required)));
    lines.push(format!("📝 <b>Тип:</b> {}", interview.interview_type.label()));
    lines.push(format!("📌 <b>Статус:</b> {}", interview.status.label()));
    lines.join("\n")
}

/// The confirmation card shown before an interview draft is saved.
#[must_use]
pub fn format_draft(details: &InterviewDetails, tz: Tz) -> String {
    let mut lines = vec![
        "📋 <b>Проверьте данные интервью:</b>\n".to_string(),
        format!("🏢 <b>Компания:</b> {}", escape(&details.company_name)),
        format!("💼 <b>Позиция:</b> {}", escape(&details.position)),
    ];
    if let Some(url) = &details.vacancy_url {
        lines.push(format!("🔗 <b>Вакансия:</b> {}", escape(url)));
    }
    lines.push(format!("👤 <b>Рекрутер:</b> {}", escape(&details.recruiter_name)));
    lines.push(format!(
        "📅 <b>Дата и время:</b> {}",
        details
            .interview_date
            .with_timezone(&tz)
            .format(DATE_DISPLAY_FORMAT)
    ));
    lines.push(format!("💻 <b>Платформа:</b> {}", escape(&details.platform_name)));
    if let Some(url) = &details.platform_url {
        lines.push(format!("🔗 <b>Ссылка:</b> {}", escape(url)));
    }
    lines.push(format!("📹 <b>Камера:</b> {}", yes_no(details.camera_required)));
    lines.push(format!("📝 <b>Тип:</b> {}", details.interview_type.label()));
    lines.join("\n")
}
