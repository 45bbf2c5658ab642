//! Adding, listing and managing interviews.

use chrono::{DateTime, Utc};

use super::state::{Dialogue, InterviewStep};
use super::{
    keyboard, press_a_button, retry, stale, Action, Conversation, Participant, Response, Screen,
};
use crate::application::html::escape;
use crate::application::interview::{format_details, format_draft, DATE_DISPLAY_FORMAT};
use crate::domain::validate::{parse_datetime, validate_name, validate_url};
use crate::domain::{format_hours, InterviewDraft, InterviewStatus};
use crate::error::{Error, Result};
use crate::port::{Messenger, Repository};

const DATE_PROMPT: &str = "📅 Введите дату и время интервью\n\
    (формат: ДД.ММ.ГГГГ ЧЧ:ММ, например: 25.12.2024 14:30):";

const CALENDAR_CAPTION: &str = "📅 <b>Интервью в формате календаря</b>\n\n\
    Откройте этот файл в Google Calendar, Apple Calendar или другом календарном приложении.";

/// Bullet list of reminder lead times: `• За 24 ч.`, `• За 30 мин.`
pub(super) fn lead_times_list(times: &[f64]) -> String {
    times
        .iter()
        .map(|hours| {
            if *hours >= 1.0 {
                format!("• За {} ч.", format_hours(*hours))
            } else {
                format!("• За {} мин.", (hours * 60.0).round() as i64)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl<R: Repository, M: Messenger + 'static> Conversation<R, M> {
    pub(super) fn start_add_interview(&self, who: Participant) -> Vec<Response> {
        self.dialogues.set(
            who,
            Dialogue::AddInterview {
                step: InterviewStep::Company,
                draft: InterviewDraft::default(),
            },
        );
        vec![Response::Edit(Screen::new(
            "🏢 <b>Добавление нового интервью</b>\n\nВведите название компании:",
            keyboard::cancel(),
        ))]
    }

    pub(super) async fn add_interview_text(
        &self,
        who: Participant,
        step: InterviewStep,
        mut draft: InterviewDraft,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Response>> {
        let tz = self.user_tz(who.user_id).await?;
        let advanced = match step {
            InterviewStep::Company => validate_name(text).map(|company| {
                let screen = Screen::new(
                    format!(
                        "✅ Компания: <b>{}</b>\n\n💼 Введите позицию/роль:",
                        escape(&company)
                    ),
                    keyboard::cancel(),
                );
                draft.company_name = Some(company);
                (InterviewStep::Position, screen)
            }),
            InterviewStep::Position => validate_name(text).map(|position| {
                let screen = Screen::new(
                    format!(
                        "✅ Позиция: <b>{}</b>\n\n🔗 Введите ссылку на вакансию:",
                        escape(&position)
                    ),
                    keyboard::skip(),
                );
                draft.position = Some(position);
                (InterviewStep::VacancyUrl, screen)
            }),
            InterviewStep::VacancyUrl => validate_url(text).map(|url| {
                draft.vacancy_url = Some(url);
                (
                    InterviewStep::Recruiter,
                    Screen::new(
                        "✅ Ссылка сохранена\n\n👤 Введите имя рекрутера:",
                        keyboard::cancel(),
                    ),
                )
            }),
            InterviewStep::Recruiter => validate_name(text).map(|name| {
                let screen = Screen::new(
                    format!("✅ Рекрутер: <b>{}</b>\n\n{DATE_PROMPT}", escape(&name)),
                    keyboard::cancel(),
                );
                draft.recruiter_name = Some(name);
                (InterviewStep::Date, screen)
            }),
            InterviewStep::Date => parse_datetime(text, tz, now).map(|at| {
                draft.interview_date = Some(at);
                (
                    InterviewStep::Platform,
                    Screen::new(
                        format!(
                            "✅ Дата: <b>{}</b>\n\n💻 Введите название платформы (например: Zoom, Google Meet, Teams):",
                            at.with_timezone(&tz).format(DATE_DISPLAY_FORMAT)
                        ),
                        keyboard::cancel(),
                    ),
                )
            }),
            InterviewStep::Platform => validate_name(text).map(|platform| {
                let screen = Screen::new(
                    format!(
                        "✅ Платформа: <b>{}</b>\n\n🔗 Введите ссылку на встречу:",
                        escape(&platform)
                    ),
                    keyboard::skip(),
                );
                draft.platform_name = Some(platform);
                (InterviewStep::PlatformUrl, screen)
            }),
            InterviewStep::PlatformUrl => validate_url(text).map(|url| {
                draft.platform_url = Some(url);
                (
                    InterviewStep::Camera,
                    Screen::new(
                        "✅ Ссылка сохранена\n\n📹 Требуется ли камера?",
                        keyboard::camera(),
                    ),
                )
            }),
            InterviewStep::Camera => return Ok(press_a_button(keyboard::camera())),
            InterviewStep::Type => return Ok(press_a_button(keyboard::interview_type())),
            InterviewStep::Confirm => return Ok(press_a_button(keyboard::confirm())),
        };

        match advanced {
            Ok((next, screen)) => {
                self.dialogues
                    .set(who, Dialogue::AddInterview { step: next, draft });
                Ok(vec![Response::Send(screen)])
            }
            Err(e) => {
                let keyboard = match step {
                    InterviewStep::VacancyUrl | InterviewStep::PlatformUrl => keyboard::skip(),
                    _ => keyboard::cancel(),
                };
                Ok(retry(&e, keyboard))
            }
        }
    }

    pub(super) async fn add_interview_action(
        &self,
        who: Participant,
        step: InterviewStep,
        mut draft: InterviewDraft,
        action: Action,
    ) -> Result<Vec<Response>> {
        let (next, screen) = match (step, action) {
            (InterviewStep::VacancyUrl, Action::Skip) => {
                draft.vacancy_url = None;
                (
                    InterviewStep::Recruiter,
                    Screen::new("👤 Введите имя рекрутера:", keyboard::cancel()),
                )
            }
            (InterviewStep::PlatformUrl, Action::Skip) => {
                draft.platform_url = None;
                (
                    InterviewStep::Camera,
                    Screen::new("📹 Требуется ли камера?", keyboard::camera()),
                )
            }
            (InterviewStep::Camera, Action::Camera(required)) => {
                draft.camera_required = Some(required);
                (
                    InterviewStep::Type,
                    Screen::new(
                        format!(
                            "✅ Камера: <b>{}</b>\n\n📝 Выберите тип интервью:",
                            if required { "Да" } else { "Нет" }
                        ),
                        keyboard::interview_type(),
                    ),
                )
            }
            (InterviewStep::Type, Action::Type(kind)) => {
                draft.interview_type = Some(kind);
                let details = draft
                    .details()
                    .ok_or_else(|| Error::Parse("interview draft is incomplete".into()))?;
                let tz = self.user_tz(who.user_id).await?;
                (
                    InterviewStep::Confirm,
                    Screen::new(format_draft(&details, tz), keyboard::confirm()),
                )
            }
            (InterviewStep::Confirm, Action::Confirm) => {
                return self.save_interview(who, &draft).await;
            }
            _ => return Ok(vec![stale()]),
        };

        self.dialogues
            .set(who, Dialogue::AddInterview { step: next, draft });
        Ok(vec![Response::Edit(screen)])
    }

    async fn save_interview(
        &self,
        who: Participant,
        draft: &InterviewDraft,
    ) -> Result<Vec<Response>> {
        self.interviews.create_interview(who.user_id, draft).await?;
        self.dialogues.reset(who);

        let settings = self.notifications.settings(who.user_id).await?;
        let reminders = if settings.enabled && !settings.notification_times.is_empty() {
            format!(
                "Вы будете получать уведомления:\n{}",
                lead_times_list(&settings.notification_times)
            )
        } else {
            "🔕 Уведомления сейчас выключены.".to_string()
        };
        Ok(vec![
            Response::Edit(Screen::new(
                format!(
                    "✅ <b>Интервью успешно добавлено!</b>\n\n{reminders}\n\n\
                    Настроить время уведомлений можно в меню настроек."
                ),
                keyboard::main_menu(),
            )),
            Response::toast("✅ Интервью добавлено!"),
        ])
    }

    pub(super) async fn show_interviews(
        &self,
        who: Participant,
        show_all: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<Response>> {
        let interviews = if show_all {
            self.interviews.all(who.user_id).await?
        } else {
            self.interviews.upcoming(who.user_id, now).await?
        };
        let tz = self.user_tz(who.user_id).await?;
        let keyboard = keyboard::interviews(&interviews, tz, show_all);

        let text = if interviews.is_empty() {
            "📋 <b>Список интервью пуст</b>\n\nДобавьте первое интервью, чтобы начать!".to_string()
        } else {
            let title = if show_all {
                "🗂 <b>Все ваши интервью</b>"
            } else {
                "📋 <b>Ваши предстоящие интервью</b>"
            };
            format!(
                "{title} ({}):\n\nВыберите интервью для просмотра:",
                interviews.len()
            )
        };
        Ok(vec![Response::Edit(Screen::new(text, keyboard))])
    }

    pub(super) async fn view_interview(&self, who: Participant, id: i32) -> Result<Vec<Response>> {
        let Some(interview) = self.interviews.find(who.user_id, id).await? else {
            return Ok(vec![Response::alert("❌ Интервью не найдено")]);
        };
        let tz = self.user_tz(who.user_id).await?;
        Ok(vec![Response::Edit(Screen::new(
            format_details(&interview, tz),
            keyboard::interview_detail(id),
        ))])
    }

    pub(super) async fn delete_interview(
        &self,
        who: Participant,
        id: i32,
    ) -> Result<Vec<Response>> {
        if !self.interviews.delete(who.user_id, id).await? {
            return Ok(vec![Response::alert("❌ Ошибка при удалении")]);
        }
        Ok(vec![
            Response::Edit(Screen::new(
                "✅ Интервью успешно удалено!",
                keyboard::main_menu(),
            )),
            Response::toast("✅ Удалено"),
        ])
    }

    pub(super) async fn pick_status(&self, who: Participant, id: i32) -> Result<Vec<Response>> {
        let Some(interview) = self.interviews.find(who.user_id, id).await? else {
            return Ok(vec![Response::alert("❌ Интервью не найдено")]);
        };
        Ok(vec![Response::Edit(Screen::new(
            format!(
                "📌 <b>Изменение статуса</b>\n\n🏢 {} - {}\nТекущий статус: <b>{}</b>\n\nВыберите новый статус:",
                escape(&interview.company_name),
                escape(&interview.position),
                interview.status.label()
            ),
            keyboard::status_picker(id, interview.status),
        ))])
    }

    pub(super) async fn set_status(
        &self,
        who: Participant,
        id: i32,
        status: InterviewStatus,
        now: DateTime<Utc>,
    ) -> Result<Vec<Response>> {
        let changed = self
            .interviews
            .change_status(who.user_id, id, status, None, now)
            .await?;
        if changed.is_none() {
            return Ok(vec![Response::alert("❌ Интервью не найдено")]);
        }

        let mut text = format!("✅ Статус изменен на: <b>{}</b>", status.label());
        if status.awaits_followup() {
            text.push_str(&format!(
                "\n\n📬 Напомню узнать результат через {} дн.",
                self.settings().followup_days
            ));
        }
        Ok(vec![
            Response::Edit(Screen::new(text, keyboard::back_to_interview(id))),
            Response::toast("✅ Статус обновлен"),
        ])
    }

    pub(super) async fn show_history(&self, who: Participant, id: i32) -> Result<Vec<Response>> {
        let Some((interview, history)) = self.interviews.history(who.user_id, id).await? else {
            return Ok(vec![Response::alert("❌ Интервью не найдено")]);
        };
        let tz = self.user_tz(who.user_id).await?;

        let mut lines = vec![
            "🕓 <b>История статусов</b>\n".to_string(),
            format!(
                "🏢 {} - {}\n",
                escape(&interview.company_name),
                escape(&interview.position)
            ),
        ];
        if history.is_empty() {
            lines.push("Статус еще не менялся.".to_string());
        }
        for entry in &history {
            let at = entry.changed_at.with_timezone(&tz).format(DATE_DISPLAY_FORMAT);
            match entry.old_status {
                Some(old) => lines.push(format!(
                    "• {at}: {} ➡️ {}",
                    old.label(),
                    entry.new_status.label()
                )),
                None => lines.push(format!("• {at}: {}", entry.new_status.label())),
            }
            if let Some(notes) = &entry.notes {
                lines.push(format!("   📝 {}", escape(notes)));
            }
        }

        Ok(vec![Response::Edit(Screen::new(
            lines.join("\n"),
            keyboard::back_to_interview(id),
        ))])
    }

    pub(super) async fn export_interview(
        &self,
        who: Participant,
        id: i32,
        now: DateTime<Utc>,
    ) -> Result<Vec<Response>> {
        let ids = [id];
        let Some(path) = self.exports.export_ics(who.user_id, Some(&ids[..]), now).await? else {
            return Ok(vec![Response::alert("❌ Интервью не найдено")]);
        };
        Ok(vec![
            Response::toast("⏳ Создаю файл..."),
            Response::Document {
                path,
                caption: CALENDAR_CAPTION.to_string(),
                temporary: true,
            },
        ])
    }
}
