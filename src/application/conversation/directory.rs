//! Recruiter contacts and interview templates.

use chrono::{DateTime, Utc};

use super::state::{Dialogue, RecruiterStep, TemplateDraft, TemplateStep, TemplateUseStep};
use super::{
    keyboard, press_a_button, retry, stale, Action, Conversation, Keyboard, Origin, Participant,
    Response, Screen,
};
use crate::application::html::{escape, yes_no};
use crate::application::interview::DATE_DISPLAY_FORMAT;
use crate::domain::validate::{parse_datetime, validate_name, validate_url};
use crate::domain::{InterviewDraft, InterviewTemplate, NewRecruiter, NewTemplate, Recruiter};
use crate::error::{Error, Result};
use crate::port::{Messenger, Repository};

fn recruiter_card(recruiter: &Recruiter) -> String {
    let mut lines = vec![format!("👤 <b>{}</b>\n", escape(&recruiter.name))];
    if let Some(company) = &recruiter.company_name {
        lines.push(format!("🏢 <b>Компания:</b> {}", escape(company)));
    }
    if let Some(email) = &recruiter.email {
        lines.push(format!("📧 <b>Email:</b> {}", escape(email)));
    }
    if let Some(phone) = &recruiter.phone {
        lines.push(format!("📞 <b>Телефон:</b> {}", escape(phone)));
    }
    if let Some(telegram) = &recruiter.telegram {
        lines.push(format!("💬 <b>Telegram:</b> {}", escape(telegram)));
    }
    if let Some(notes) = &recruiter.notes {
        lines.push(format!("\n📝 <b>Заметки:</b>\n{}", escape(notes)));
    }
    lines.join("\n")
}

fn template_card(template: &InterviewTemplate) -> String {
    let mut lines = vec![
        format!("📝 <b>{}</b>\n", escape(&template.name)),
        format!("💻 <b>Платформа:</b> {}", escape(&template.platform_name)),
    ];
    if let Some(url) = &template.platform_url {
        lines.push(format!("🔗 <b>Ссылка:</b> {}", escape(url)));
    }
    lines.push(format!("📹 <b>Камера:</b> {}", yes_no(template.camera_required)));
    lines.push(format!("📋 <b>Тип:</b> {}", template.interview_type.label()));
    if !template.default_checklist.is_empty() {
        lines.push("\n✅ <b>Чек-лист:</b>".to_string());
        for item in &template.default_checklist {
            lines.push(format!("• {}", escape(&item.text)));
        }
    }
    lines.join("\n")
}

/// Prompt for the optional recruiter field asked at `step`.
fn recruiter_prompt(step: RecruiterStep) -> &'static str {
    match step {
        RecruiterStep::Name => "Введите имя рекрутера:",
        RecruiterStep::Company => "🏢 Введите название компании:",
        RecruiterStep::Email => "📧 Введите email рекрутера:",
        RecruiterStep::Phone => "📞 Введите номер телефона:",
        RecruiterStep::Telegram => "💬 Введите Telegram username:",
        RecruiterStep::Notes => "📝 Введите заметки о рекрутере:",
    }
}

fn next_recruiter_step(step: RecruiterStep) -> Option<RecruiterStep> {
    match step {
        RecruiterStep::Name => Some(RecruiterStep::Company),
        RecruiterStep::Company => Some(RecruiterStep::Email),
        RecruiterStep::Email => Some(RecruiterStep::Phone),
        RecruiterStep::Phone => Some(RecruiterStep::Telegram),
        RecruiterStep::Telegram => Some(RecruiterStep::Notes),
        RecruiterStep::Notes => None,
    }
}

fn optional(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

impl<R: Repository, M: Messenger + 'static> Conversation<R, M> {
    // Recruiters

    pub(super) async fn show_recruiters(&self, who: Participant) -> Result<Vec<Response>> {
        let recruiters = self.interviews.recruiters(who.user_id).await?;
        let text = if recruiters.is_empty() {
            "👥 <b>Список рекрутеров пуст</b>\n\nДобавьте рекрутеров для быстрого доступа к контактам"
                .to_string()
        } else {
            format!(
                "👥 <b>Ваши рекрутеры</b> ({}):\n\nВыберите рекрутера для просмотра контактов:",
                recruiters.len()
            )
        };
        Ok(vec![Response::Edit(Screen::new(
            text,
            keyboard::recruiters(&recruiters),
        ))])
    }

    pub(super) async fn view_recruiter(&self, who: Participant, id: i32) -> Result<Vec<Response>> {
        let Some(recruiter) = self.interviews.recruiter(who.user_id, id).await? else {
            return Ok(vec![Response::alert("❌ Рекрутер не найден")]);
        };
        Ok(vec![Response::Edit(Screen::new(
            recruiter_card(&recruiter),
            keyboard::recruiter_detail(id),
        ))])
    }

    pub(super) async fn delete_recruiter(
        &self,
        who: Participant,
        id: i32,
    ) -> Result<Vec<Response>> {
        if !self.interviews.delete_recruiter(who.user_id, id).await? {
            return Ok(vec![Response::alert("❌ Ошибка при удалении")]);
        }
        Ok(vec![
            Response::Edit(Screen::new("✅ Рекрутер удален", keyboard::main_menu())),
            Response::toast("✅ Удалено"),
        ])
    }

    pub(super) fn start_add_recruiter(&self, who: Participant) -> Vec<Response> {
        self.dialogues.set(
            who,
            Dialogue::AddRecruiter {
                step: RecruiterStep::Name,
                draft: NewRecruiter::default(),
            },
        );
        vec![Response::Edit(Screen::new(
            format!(
                "➕ <b>Добавление рекрутера</b>\n\n{}",
                recruiter_prompt(RecruiterStep::Name)
            ),
            keyboard::cancel(),
        ))]
    }

    pub(super) async fn add_recruiter_text(
        &self,
        who: Participant,
        step: RecruiterStep,
        mut draft: NewRecruiter,
        text: &str,
    ) -> Result<Vec<Response>> {
        let mut header = String::new();
        match step {
            RecruiterStep::Name => match validate_name(text) {
                Ok(name) => {
                    header = format!("✅ Имя: <b>{}</b>\n\n", escape(&name));
                    draft.name = name;
                }
                Err(e) => return Ok(retry(&e, keyboard::cancel())),
            },
            RecruiterStep::Notes => draft.notes = optional(text),
            other => {
                let value = match validate_name(text) {
                    Ok(value) => value,
                    Err(e) => return Ok(retry(&e, keyboard::skip())),
                };
                match other {
                    RecruiterStep::Company => draft.company_name = Some(value),
                    RecruiterStep::Email => draft.email = Some(value),
                    RecruiterStep::Phone => draft.phone = Some(value),
                    _ => draft.telegram = Some(value),
                }
            }
        }
        self.advance_recruiter(who, step, draft, Origin::Message, &header)
            .await
    }

    pub(super) async fn add_recruiter_action(
        &self,
        who: Participant,
        step: RecruiterStep,
        draft: NewRecruiter,
        action: Action,
    ) -> Result<Vec<Response>> {
        if action != Action::Skip || step == RecruiterStep::Name {
            return Ok(vec![stale()]);
        }
        self.advance_recruiter(who, step, draft, Origin::Button, "")
            .await
    }

    /// Move past `step`, saving the recruiter after the last field.
    async fn advance_recruiter(
        &self,
        who: Participant,
        step: RecruiterStep,
        draft: NewRecruiter,
        origin: Origin,
        header: &str,
    ) -> Result<Vec<Response>> {
        let Some(next) = next_recruiter_step(step) else {
            let recruiter = self.interviews.add_recruiter(who.user_id, draft).await?;
            self.dialogues.reset(who);
            return Ok(vec![origin.show(Screen::new(
                format!(
                    "✅ Рекрутер <b>{}</b> успешно добавлен!",
                    escape(&recruiter.name)
                ),
                keyboard::main_menu(),
            ))]);
        };
        self.dialogues
            .set(who, Dialogue::AddRecruiter { step: next, draft });
        Ok(vec![origin.show(Screen::new(
            format!("{header}{}", recruiter_prompt(next)),
            keyboard::skip(),
        ))])
    }

    // Templates

    pub(super) async fn show_templates(&self, who: Participant) -> Result<Vec<Response>> {
        let templates = self.interviews.templates(who.user_id).await?;
        let text = if templates.is_empty() {
            "📝 <b>Список шаблонов пуст</b>\n\nСоздайте шаблоны для быстрого добавления интервью"
                .to_string()
        } else {
            format!(
                "📝 <b>Ваши шаблоны</b> ({}):\n\nВыберите шаблон:",
                templates.len()
            )
        };
        Ok(vec![Response::Edit(Screen::new(
            text,
            keyboard::templates(&templates),
        ))])
    }

    pub(super) async fn view_template(&self, who: Participant, id: i32) -> Result<Vec<Response>> {
        let Some(template) = self.interviews.template(who.user_id, id).await? else {
            return Ok(vec![Response::alert("❌ Шаблон не найден")]);
        };
        Ok(vec![Response::Edit(Screen::new(
            template_card(&template),
            keyboard::template_detail(id),
        ))])
    }

    pub(super) async fn delete_template(&self, who: Participant, id: i32) -> Result<Vec<Response>> {
        if !self.interviews.delete_template(who.user_id, id).await? {
            return Ok(vec![Response::alert("❌ Ошибка при удалении")]);
        }
        Ok(vec![
            Response::Edit(Screen::new("✅ Шаблон удален", keyboard::main_menu())),
            Response::toast("✅ Удалено"),
        ])
    }

    pub(super) fn start_add_template(&self, who: Participant) -> Vec<Response> {
        self.dialogues.set(
            who,
            Dialogue::AddTemplate {
                step: TemplateStep::Name,
                draft: TemplateDraft::default(),
            },
        );
        vec![Response::Edit(Screen::new(
            "➕ <b>Создание шаблона</b>\n\nВведите название шаблона:",
            keyboard::cancel(),
        ))]
    }

    pub(super) fn add_template_text(
        &self,
        who: Participant,
        step: TemplateStep,
        mut draft: TemplateDraft,
        text: &str,
    ) -> Vec<Response> {
        let advanced = match step {
            TemplateStep::Name => validate_name(text).map(|name| {
                let screen = Screen::new(
                    format!(
                        "✅ Название: <b>{}</b>\n\n💻 Введите название платформы:",
                        escape(&name)
                    ),
                    keyboard::cancel(),
                );
                draft.name = Some(name);
                (TemplateStep::Platform, screen)
            }),
            TemplateStep::Platform => validate_name(text).map(|platform| {
                let screen = Screen::new(
                    format!(
                        "✅ Платформа: <b>{}</b>\n\n🔗 Введите ссылку (или пропустите):",
                        escape(&platform)
                    ),
                    keyboard::skip(),
                );
                draft.platform_name = Some(platform);
                (TemplateStep::PlatformUrl, screen)
            }),
            TemplateStep::PlatformUrl => validate_url(text).map(|url| {
                draft.platform_url = Some(url);
                (
                    TemplateStep::Camera,
                    Screen::new(
                        "✅ Ссылка сохранена\n\n📹 Требуется ли камера?",
                        keyboard::camera(),
                    ),
                )
            }),
            TemplateStep::Camera => return press_a_button(keyboard::camera()),
            TemplateStep::Type => return press_a_button(keyboard::interview_type()),
        };

        match advanced {
            Ok((next, screen)) => {
                self.dialogues
                    .set(who, Dialogue::AddTemplate { step: next, draft });
                vec![Response::Send(screen)]
            }
            Err(e) => {
                let keyboard: Keyboard = if step == TemplateStep::PlatformUrl {
                    keyboard::skip()
                } else {
                    keyboard::cancel()
                };
                retry(&e, keyboard)
            }
        }
    }

    pub(super) async fn add_template_action(
        &self,
        who: Participant,
        step: TemplateStep,
        mut draft: TemplateDraft,
        action: Action,
    ) -> Result<Vec<Response>> {
        let (next, screen) = match (step, action) {
            (TemplateStep::PlatformUrl, Action::Skip) => {
                draft.platform_url = None;
                (
                    TemplateStep::Camera,
                    Screen::new("📹 Требуется ли камера?", keyboard::camera()),
                )
            }
            (TemplateStep::Camera, Action::Camera(required)) => {
                draft.camera_required = Some(required);
                (
                    TemplateStep::Type,
                    Screen::new("📝 Выберите тип интервью:", keyboard::interview_type()),
                )
            }
            (TemplateStep::Type, Action::Type(kind)) => {
                draft.interview_type = Some(kind);
                return self.save_template(who, draft).await;
            }
            _ => return Ok(vec![stale()]),
        };
        self.dialogues
            .set(who, Dialogue::AddTemplate { step: next, draft });
        Ok(vec![Response::Edit(screen)])
    }

    async fn save_template(&self, who: Participant, draft: TemplateDraft) -> Result<Vec<Response>> {
        let incomplete = || Error::Parse("template draft is incomplete".into());
        let template = NewTemplate {
            user_id: 0,
            name: draft.name.ok_or_else(incomplete)?,
            platform_name: draft.platform_name.ok_or_else(incomplete)?,
            platform_url: draft.platform_url,
            camera_required: draft.camera_required.ok_or_else(incomplete)?,
            interview_type: draft.interview_type.ok_or_else(incomplete)?,
            default_checklist: Vec::new(),
        };
        let template = self.interviews.add_template(who.user_id, template).await?;
        self.dialogues.reset(who);
        Ok(vec![
            Response::Edit(Screen::new(
                format!(
                    "✅ Шаблон <b>{}</b> успешно создан!",
                    escape(&template.name)
                ),
                keyboard::main_menu(),
            )),
            Response::toast("✅ Шаблон создан"),
        ])
    }

    // Interviews from templates

    pub(super) async fn start_use_template(
        &self,
        who: Participant,
        id: i32,
    ) -> Result<Vec<Response>> {
        let Some(template) = self.interviews.template(who.user_id, id).await? else {
            return Ok(vec![Response::alert("❌ Шаблон не найден")]);
        };
        self.dialogues.set(
            who,
            Dialogue::UseTemplate {
                template_id: id,
                step: TemplateUseStep::Company,
                draft: InterviewDraft::default(),
            },
        );
        Ok(vec![Response::Edit(Screen::new(
            format!(
                "📝 <b>Использование шаблона: {}</b>\n\n🏢 Введите название компании:",
                escape(&template.name)
            ),
            keyboard::cancel(),
        ))])
    }

    pub(super) async fn use_template_text(
        &self,
        who: Participant,
        template_id: i32,
        step: TemplateUseStep,
        mut draft: InterviewDraft,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Response>> {
        let tz = self.user_tz(who.user_id).await?;
        let advanced = match step {
            TemplateUseStep::Company => validate_name(text).map(|company| {
                let screen = Screen::new(
                    format!(
                        "✅ Компания: <b>{}</b>\n\n💼 Введите позицию:",
                        escape(&company)
                    ),
                    keyboard::cancel(),
                );
                draft.company_name = Some(company);
                (TemplateUseStep::Position, screen)
            }),
            TemplateUseStep::Position => validate_name(text).map(|position| {
                let screen = Screen::new(
                    format!(
                        "✅ Позиция: <b>{}</b>\n\n👤 Введите имя рекрутера:",
                        escape(&position)
                    ),
                    keyboard::cancel(),
                );
                draft.position = Some(position);
                (TemplateUseStep::Recruiter, screen)
            }),
            TemplateUseStep::Recruiter => validate_name(text).map(|name| {
                let screen = Screen::new(
                    format!(
                        "✅ Рекрутер: <b>{}</b>\n\n📅 Введите дату и время интервью\n\
                        (формат: ДД.ММ.ГГГГ ЧЧ:ММ, например: 25.12.2024 14:30):",
                        escape(&name)
                    ),
                    keyboard::cancel(),
                );
                draft.recruiter_name = Some(name);
                (TemplateUseStep::Date, screen)
            }),
            TemplateUseStep::Date => parse_datetime(text, tz, now).map(|at| {
                draft.interview_date = Some(at);
                (
                    TemplateUseStep::VacancyUrl,
                    Screen::new(
                        format!(
                            "✅ Дата: <b>{}</b>\n\n🔗 Введите ссылку на вакансию (или пропустите):",
                            at.with_timezone(&tz).format(DATE_DISPLAY_FORMAT)
                        ),
                        keyboard::skip(),
                    ),
                )
            }),
            TemplateUseStep::VacancyUrl => {
                // An unusable link is dropped rather than asked for again.
                draft.vacancy_url = validate_url(text).ok();
                return self
                    .create_from_template(who, template_id, &draft, Origin::Message)
                    .await;
            }
        };

        match advanced {
            Ok((next, screen)) => {
                self.dialogues.set(
                    who,
                    Dialogue::UseTemplate {
                        template_id,
                        step: next,
                        draft,
                    },
                );
                Ok(vec![Response::Send(screen)])
            }
            Err(e) => Ok(retry(&e, keyboard::cancel())),
        }
    }

    pub(super) async fn use_template_action(
        &self,
        who: Participant,
        template_id: i32,
        step: TemplateUseStep,
        mut draft: InterviewDraft,
        action: Action,
    ) -> Result<Vec<Response>> {
        if step != TemplateUseStep::VacancyUrl || action != Action::Skip {
            return Ok(vec![stale()]);
        }
        draft.vacancy_url = None;
        self.create_from_template(who, template_id, &draft, Origin::Button)
            .await
    }

    async fn create_from_template(
        &self,
        who: Participant,
        template_id: i32,
        draft: &InterviewDraft,
        origin: Origin,
    ) -> Result<Vec<Response>> {
        self.interviews
            .create_from_template(who.user_id, template_id, draft)
            .await?;
        self.dialogues.reset(who);
        Ok(vec![origin.show(Screen::new(
            "✅ <b>Интервью создано из шаблона!</b>",
            keyboard::main_menu(),
        ))])
    }
}
