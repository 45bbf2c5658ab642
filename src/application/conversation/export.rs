//! Export menu, file exports and manual backups.

use chrono::{DateTime, Utc};
use tracing::info;

use super::{keyboard, Conversation, Participant, Response, Screen};
use crate::application::html::escape;
use crate::error::Result;
use crate::port::{Messenger, Repository};

const ICS_CAPTION: &str = "📅 <b>Ваши интервью в формате календаря</b>\n\n\
    Откройте этот файл в Google Calendar, Apple Calendar или другом календарном приложении.";

const JSON_CAPTION: &str = "📄 <b>Экспорт всех данных в JSON</b>\n\n\
    Этот файл содержит все ваши интервью и можно использовать для резервного копирования.";

impl<R: Repository, M: Messenger + 'static> Conversation<R, M> {
    pub(super) fn show_export_menu(&self, who: Participant) -> Vec<Response> {
        vec![Response::Edit(Screen::new(
            "📤 <b>Экспорт данных</b>\n\nВыберите формат экспорта:",
            keyboard::export_menu(self.settings().is_admin(who.user_id)),
        ))]
    }

    pub(super) async fn export_ics(
        &self,
        who: Participant,
        now: DateTime<Utc>,
    ) -> Result<Vec<Response>> {
        let Some(path) = self.exports.export_ics(who.user_id, None, now).await? else {
            return Ok(vec![
                Response::toast("⏳ Создаю файл..."),
                Response::Edit(Screen::new(
                    "❌ Нет интервью для экспорта",
                    keyboard::main_menu(),
                )),
            ]);
        };
        Ok(vec![
            Response::toast("⏳ Создаю файл..."),
            Response::Document {
                path,
                caption: ICS_CAPTION.to_string(),
                temporary: true,
            },
            Response::Edit(Screen::new(
                "✅ Файл календаря отправлен!",
                keyboard::main_menu(),
            )),
        ])
    }

    pub(super) async fn export_json(
        &self,
        who: Participant,
        now: DateTime<Utc>,
    ) -> Result<Vec<Response>> {
        let path = self.exports.export_json(who.user_id, now).await?;
        Ok(vec![
            Response::toast("⏳ Создаю файл..."),
            Response::Document {
                path,
                caption: JSON_CAPTION.to_string(),
                temporary: true,
            },
            Response::Edit(Screen::new("✅ JSON файл отправлен!", keyboard::main_menu())),
        ])
    }

    pub(super) async fn create_backup(
        &self,
        who: Participant,
        now: DateTime<Utc>,
    ) -> Result<Vec<Response>> {
        if !self.settings().is_admin(who.user_id) {
            return Ok(vec![Response::alert("❌ Доступно только администраторам")]);
        }
        let screen = match self.exports.create_backup(now).await? {
            Some(path) => {
                info!(user_id = who.user_id, path = %path.display(), "Manual backup requested");
                Screen::new(
                    format!(
                        "✅ <b>Резервная копия создана!</b>\n\n📁 Путь: <code>{}</code>",
                        escape(&path.display().to_string())
                    ),
                    keyboard::main_menu(),
                )
            }
            None => Screen::new(
                "❌ Ошибка при создании резервной копии",
                keyboard::main_menu(),
            ),
        };
        Ok(vec![
            Response::toast("⏳ Создаю резервную копию..."),
            Response::Edit(screen),
        ])
    }
}
