//! Dialogue state machine behind the bot.
//!
//! [`Conversation::handle`] takes one update and returns the responses to
//! deliver. It never talks to Telegram itself, so every flow can be driven
//! from tests with plain values.
//!
//! ```text
//! Incoming ──► register user ──► Command ──► menu / help / cancel
//!                              ├─► Text ────► current Dialogue step
//!                              └─► Action ──► step button (skip, camera, type, confirm)
//!                                          └► navigation (resets the dialogue)
//! ```

pub mod action;
pub mod command;
pub mod keyboard;
pub mod screen;
pub mod state;

mod directory;
mod export;
mod interview;
mod settings;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

pub use action::Action;
pub use command::Command;
pub use screen::{Button, Incoming, Input, Keyboard, Participant, Response, Screen};
pub use state::{Dialogue, DialogueStorage};

use self::command::command_help;
use super::export::ExportService;
use super::interview::InterviewService;
use super::notification::NotificationService;
use super::BotSettings;
use crate::domain::ValidationError;
use crate::error::Result;
use crate::port::{Messenger, Repository};

const WELCOME: &str = "👋 <b>Добро пожаловать в бот для управления собеседованиями!</b>\n\n\
    Я помогу вам:\n\
    • 📝 Сохранять информацию о предстоящих интервью\n\
    • 🔔 Получать своевременные напоминания\n\
    • 📋 Управлять списком собеседований\n\n\
    Выберите действие:";

const MAIN_MENU: &str = "📱 <b>Главное меню</b>\n\nВыберите действие:";

const CANCELLED: &str = "❌ Действие отменено.\n\n📱 <b>Главное меню</b>\n\nВыберите действие:";

const FAILURE: &str = "❌ Произошла ошибка. Попробуйте еще раз.";

/// Where an update came from. Button presses edit the message they belong
/// to, text messages get a new reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Message,
    Button,
}

impl Origin {
    fn of(input: &Input) -> Self {
        match input {
            Input::Action(_) => Self::Button,
            Input::Command(_) | Input::Text(_) => Self::Message,
        }
    }

    fn show(self, screen: Screen) -> Response {
        match self {
            Self::Message => Response::Send(screen),
            Self::Button => Response::Edit(screen),
        }
    }
}

fn main_menu_screen() -> Screen {
    Screen::new(MAIN_MENU, keyboard::main_menu())
}

/// Re-prompt after rejected input.
fn retry(err: &ValidationError, keyboard: Keyboard) -> Vec<Response> {
    vec![Response::Send(Screen::new(
        format!("❌ Ошибка: {err}\n\nПопробуйте снова:"),
        keyboard,
    ))]
}

/// A button from a finished or abandoned dialogue.
fn stale() -> Response {
    Response::alert("⚠️ Эта кнопка больше не активна")
}

/// Text sent while the dialogue expects a button press.
fn press_a_button(keyboard: Keyboard) -> Vec<Response> {
    vec![Response::Send(Screen::new(
        "👆 Выберите вариант с помощью кнопок.",
        keyboard,
    ))]
}

/// The chat-facing side of the bot.
pub struct Conversation<R, M> {
    interviews: InterviewService<R>,
    notifications: NotificationService<R, M>,
    exports: ExportService<R>,
    dialogues: Arc<DialogueStorage>,
}

impl<R, M> Clone for Conversation<R, M> {
    fn clone(&self) -> Self {
        Self {
            interviews: self.interviews.clone(),
            notifications: self.notifications.clone(),
            exports: self.exports.clone(),
            dialogues: Arc::clone(&self.dialogues),
        }
    }
}

impl<R: Repository, M: Messenger + 'static> Conversation<R, M> {
    pub fn new(
        interviews: InterviewService<R>,
        notifications: NotificationService<R, M>,
        exports: ExportService<R>,
        dialogues: Arc<DialogueStorage>,
    ) -> Self {
        Self {
            interviews,
            notifications,
            exports,
            dialogues,
        }
    }

    #[must_use]
    pub fn dialogues(&self) -> &DialogueStorage {
        &self.dialogues
    }

    fn settings(&self) -> &BotSettings {
        self.interviews.settings()
    }

    async fn user_tz(&self, telegram_id: i64) -> Result<Tz> {
        let user = self.interviews.user(telegram_id).await?;
        Ok(self.interviews.timezone_of(&user))
    }

    /// Handle one update.
    ///
    /// Failures are logged, the chat's dialogue is reset and the user gets a
    /// generic error with the main menu.
    pub async fn handle(&self, incoming: Incoming, now: DateTime<Utc>) -> Vec<Response> {
        let who = incoming.participant();
        let origin = Origin::of(&incoming.input);
        match self.dispatch(incoming, now).await {
            Ok(responses) => responses,
            Err(e) => {
                warn!(
                    chat_id = who.chat_id,
                    user_id = who.user_id,
                    error = %e,
                    "Failed to handle update"
                );
                self.dialogues.reset(who);
                vec![origin.show(Screen::new(FAILURE, keyboard::main_menu()))]
            }
        }
    }

    async fn dispatch(&self, incoming: Incoming, now: DateTime<Utc>) -> Result<Vec<Response>> {
        let who = incoming.participant();
        self.interviews
            .register(who.user_id, incoming.username.as_deref())
            .await?;

        match incoming.input {
            Input::Command(command) => Ok(self.on_command(who, command)),
            Input::Text(text) => self.on_text(who, &text, now).await,
            Input::Action(action) => self.on_action(who, action, now).await,
        }
    }

    fn on_command(&self, who: Participant, command: Command) -> Vec<Response> {
        debug!(user_id = who.user_id, ?command, "Command received");
        match command {
            Command::Start => {
                self.dialogues.reset(who);
                vec![Response::Send(Screen::new(WELCOME, keyboard::main_menu()))]
            }
            Command::Menu => {
                self.dialogues.reset(who);
                vec![Response::Send(main_menu_screen())]
            }
            Command::Help => vec![Response::Send(Screen::new(
                command_help(),
                keyboard::main_menu(),
            ))],
            Command::Cancel => {
                self.dialogues.reset(who);
                vec![Response::Send(Screen::new(CANCELLED, keyboard::main_menu()))]
            }
        }
    }

    async fn on_text(
        &self,
        who: Participant,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Response>> {
        match self.dialogues.get(who) {
            Dialogue::Idle => Ok(vec![Response::Send(Screen::new(
                "🤔 Не понимаю это сообщение.\n\nВоспользуйтесь меню:",
                keyboard::main_menu(),
            ))]),
            Dialogue::AddInterview { step, draft } => {
                self.add_interview_text(who, step, draft, text, now)
                    .await
            }
            Dialogue::UseTemplate {
                template_id,
                step,
                draft,
            } => {
                self.use_template_text(who, template_id, step, draft, text, now)
                    .await
            }
            Dialogue::AddRecruiter { step, draft } => {
                self.add_recruiter_text(who, step, draft, text).await
            }
            Dialogue::AddTemplate { step, draft } => {
                Ok(self.add_template_text(who, step, draft, text))
            }
            Dialogue::NotificationTimes => self.notification_times_text(who, text).await,
            Dialogue::QuietHours => self.quiet_hours_text(who, text).await,
            Dialogue::Timezone => self.timezone_text(who, text).await,
        }
    }

    async fn on_action(
        &self,
        who: Participant,
        action: Action,
        now: DateTime<Utc>,
    ) -> Result<Vec<Response>> {
        debug!(user_id = who.user_id, %action, "Button pressed");
        match action {
            Action::Skip | Action::Camera(_) | Action::Type(_) | Action::Confirm => {
                self.on_step_action(who, action).await
            }
            navigation => {
                self.dialogues.reset(who);
                self.navigate(who, navigation, now).await
            }
        }
    }

    /// Buttons that answer the current dialogue step.
    async fn on_step_action(&self, who: Participant, action: Action) -> Result<Vec<Response>> {
        match self.dialogues.get(who) {
            Dialogue::AddInterview { step, draft } => {
                self.add_interview_action(who, step, draft, action)
                    .await
            }
            Dialogue::UseTemplate {
                template_id,
                step,
                draft,
            } => {
                self.use_template_action(who, template_id, step, draft, action)
                    .await
            }
            Dialogue::AddRecruiter { step, draft } => {
                self.add_recruiter_action(who, step, draft, action)
                    .await
            }
            Dialogue::AddTemplate { step, draft } => {
                self.add_template_action(who, step, draft, action)
                    .await
            }
            Dialogue::Idle
            | Dialogue::NotificationTimes
            | Dialogue::QuietHours
            | Dialogue::Timezone => Ok(vec![stale()]),
        }
    }

    async fn navigate(
        &self,
        who: Participant,
        action: Action,
        now: DateTime<Utc>,
    ) -> Result<Vec<Response>> {
        match action {
            Action::MainMenu => Ok(vec![Response::Edit(main_menu_screen())]),
            Action::Cancel => Ok(vec![Response::Edit(Screen::new(
                CANCELLED,
                keyboard::main_menu(),
            ))]),

            Action::AddInterview => Ok(self.start_add_interview(who)),
            Action::MyInterviews => self.show_interviews(who, false, now).await,
            Action::AllInterviews => self.show_interviews(who, true, now).await,
            Action::ViewInterview(id) => self.view_interview(who, id).await,
            Action::DeleteInterview(id) => self.delete_interview(who, id).await,
            Action::ChangeStatus(id) => self.pick_status(who, id).await,
            Action::SetStatus(id, status) => self.set_status(who, id, status, now).await,
            Action::History(id) => self.show_history(who, id).await,
            Action::ExportInterview(id) => self.export_interview(who, id, now).await,

            Action::NotificationSettings => self.show_notification_settings(who).await,
            Action::ToggleNotifications => self.toggle_notifications(who).await,
            Action::ChangeNotificationTimes => Ok(self.start_notification_times(who)),
            Action::ResetNotificationTimes => self.reset_notification_times(who).await,
            Action::QuietHoursSettings => self.show_quiet_hours(who).await,
            Action::QuietHoursEnable => self.enable_quiet_hours(who).await,
            Action::QuietHoursDisable => self.disable_quiet_hours(who).await,
            Action::QuietHoursSetTime => Ok(self.start_quiet_hours(who)),
            Action::ToggleGrouping => self.toggle_grouping(who).await,

            Action::Recruiters => self.show_recruiters(who).await,
            Action::ViewRecruiter(id) => self.view_recruiter(who, id).await,
            Action::AddRecruiter => Ok(self.start_add_recruiter(who)),
            Action::DeleteRecruiter(id) => self.delete_recruiter(who, id).await,

            Action::Templates => self.show_templates(who).await,
            Action::ViewTemplate(id) => self.view_template(who, id).await,
            Action::AddTemplate => Ok(self.start_add_template(who)),
            Action::UseTemplate(id) => self.start_use_template(who, id).await,
            Action::DeleteTemplate(id) => self.delete_template(who, id).await,

            Action::Settings => self.show_settings(who).await,
            Action::TimezoneMenu => Ok(Self::show_timezones()),
            Action::SetTimezone(name) => self.set_timezone(who, &name).await,
            Action::TimezoneManual => Ok(self.start_manual_timezone(who)),

            Action::ExportMenu => Ok(self.show_export_menu(who)),
            Action::ExportIcs => self.export_ics(who, now).await,
            Action::ExportJson => self.export_json(who, now).await,
            Action::CreateBackup => self.create_backup(who, now).await,

            Action::Skip | Action::Camera(_) | Action::Type(_) | Action::Confirm => {
                Ok(vec![stale()])
            }
        }
    }
}
