//! Reminder preferences and the user's timezone.

use super::state::Dialogue;
use super::{keyboard, retry, Conversation, Participant, Response, Screen};
use crate::application::html::{escape, yes_no};
use crate::domain::validate::{parse_notification_times, parse_quiet_hours, parse_timezone};
use crate::domain::{format_hours_list, NotificationSettings, QuietHours};
use crate::error::Result;
use crate::port::{Messenger, Repository};

fn notification_settings_text(settings: &NotificationSettings) -> String {
    let status = if settings.enabled {
        "🔔 Включены"
    } else {
        "🔕 Выключены"
    };
    let mut lines = vec![
        "⚙️ <b>Настройки уведомлений</b>\n".to_string(),
        format!("<b>Статус:</b> {status}"),
        format!(
            "<b>Время уведомлений:</b> {}",
            format_hours_list(&settings.notification_times)
        ),
    ];
    if let Some(window) = settings.active_quiet_hours() {
        lines.push(format!("<b>Тихие часы:</b> {window}"));
    }
    lines.push(format!(
        "<b>Группировка:</b> {}",
        yes_no(settings.group_notifications)
    ));
    lines.push(
        "\n<i>Уведомления будут отправляться за указанное время до начала интервью.</i>"
            .to_string(),
    );
    lines.join("\n")
}

fn notification_settings_screen(settings: &NotificationSettings) -> Screen {
    Screen::new(
        notification_settings_text(settings),
        keyboard::notification_settings(settings),
    )
}

impl<R: Repository, M: Messenger + 'static> Conversation<R, M> {
    pub(super) async fn show_notification_settings(
        &self,
        who: Participant,
    ) -> Result<Vec<Response>> {
        let settings = self.notifications.settings(who.user_id).await?;
        Ok(vec![Response::Edit(notification_settings_screen(&settings))])
    }

    /// Show an alert, then refresh the settings screen.
    async fn settings_changed(&self, who: Participant, alert: String) -> Result<Vec<Response>> {
        let settings = self.notifications.settings(who.user_id).await?;
        Ok(vec![
            Response::alert(alert),
            Response::Edit(notification_settings_screen(&settings)),
        ])
    }

    pub(super) async fn toggle_notifications(&self, who: Participant) -> Result<Vec<Response>> {
        let enabled = self.notifications.toggle(who.user_id).await?;
        let status = if enabled { "включены" } else { "выключены" };
        self.settings_changed(who, format!("✅ Уведомления {status}"))
            .await
    }

    pub(super) fn start_notification_times(&self, who: Participant) -> Vec<Response> {
        self.dialogues.set(who, Dialogue::NotificationTimes);
        vec![Response::Edit(Screen::new(
            "⏰ <b>Настройка времени уведомлений</b>\n\n\
            Введите время уведомлений в часах через запятую.\n\
            Например: <code>24, 12, 6, 3, 1.5, 0.5</code>\n\n\
            <i>Можно использовать дробные числа (например, 0.5 = 30 минут)</i>",
            keyboard::cancel(),
        ))]
    }

    pub(super) async fn notification_times_text(
        &self,
        who: Participant,
        text: &str,
    ) -> Result<Vec<Response>> {
        let times = match parse_notification_times(text) {
            Ok(times) => times,
            Err(e) => return Ok(retry(&e, keyboard::cancel())),
        };
        let settings = self.notifications.set_times(who.user_id, times).await?;
        self.dialogues.reset(who);
        Ok(vec![Response::Send(Screen::new(
            format!(
                "✅ <b>Время уведомлений обновлено!</b>\n\nНовые значения: {}",
                format_hours_list(&settings.notification_times)
            ),
            keyboard::main_menu(),
        ))])
    }

    pub(super) async fn reset_notification_times(&self, who: Participant) -> Result<Vec<Response>> {
        self.notifications.reset_times(who.user_id).await?;
        self.settings_changed(who, "✅ Настройки сброшены на стандартные".into())
            .await
    }

    pub(super) async fn show_quiet_hours(&self, who: Participant) -> Result<Vec<Response>> {
        let settings = self.notifications.settings(who.user_id).await?;
        let current = match settings.active_quiet_hours() {
            Some(window) => format!("<b>Сейчас:</b> {window}"),
            None => "<b>Сейчас:</b> выключены".to_string(),
        };
        Ok(vec![Response::Edit(Screen::new(
            format!(
                "🔕 <b>Настройка тихих часов</b>\n\n\
                В тихие часы уведомления отправляться не будут.\n\
                Это полезно, чтобы не получать уведомления ночью.\n\n{current}"
            ),
            keyboard::quiet_hours(),
        ))])
    }

    pub(super) async fn enable_quiet_hours(&self, who: Participant) -> Result<Vec<Response>> {
        let window = QuietHours::default_window();
        self.notifications
            .set_quiet_hours(who.user_id, Some(window))
            .await?;
        self.settings_changed(who, format!("✅ Тихие часы включены ({window})"))
            .await
    }

    pub(super) async fn disable_quiet_hours(&self, who: Participant) -> Result<Vec<Response>> {
        self.notifications.set_quiet_hours(who.user_id, None).await?;
        self.settings_changed(who, "✅ Тихие часы выключены".into())
            .await
    }

    pub(super) fn start_quiet_hours(&self, who: Participant) -> Vec<Response> {
        self.dialogues.set(who, Dialogue::QuietHours);
        vec![Response::Edit(Screen::new(
            "🕐 <b>Настройка времени тихих часов</b>\n\n\
            Введите время начала и конца через дефис.\n\
            Формат: ЧЧ:ММ-ЧЧ:ММ\n\n\
            Например: <code>22:00-08:00</code>",
            keyboard::cancel(),
        ))]
    }

    pub(super) async fn quiet_hours_text(
        &self,
        who: Participant,
        text: &str,
    ) -> Result<Vec<Response>> {
        let Ok(window) = parse_quiet_hours(text) else {
            return Ok(vec![Response::Send(Screen::new(
                "❌ Ошибка: Неверный формат времени\n\n\
                Используйте формат: ЧЧ:ММ-ЧЧ:ММ\n\
                Например: 22:00-08:00",
                keyboard::cancel(),
            ))]);
        };
        self.notifications
            .set_quiet_hours(who.user_id, Some(window))
            .await?;
        self.dialogues.reset(who);
        Ok(vec![Response::Send(Screen::new(
            format!(
                "✅ <b>Тихие часы настроены!</b>\n\n⏰ С {} до {}",
                window.start.format("%H:%M"),
                window.end.format("%H:%M")
            ),
            keyboard::main_menu(),
        ))])
    }

    pub(super) async fn toggle_grouping(&self, who: Participant) -> Result<Vec<Response>> {
        let grouped = self.notifications.toggle_grouping(who.user_id).await?;
        let status = if grouped { "включена" } else { "выключена" };
        self.settings_changed(who, format!("✅ Группировка уведомлений {status}"))
            .await
    }

    // Timezone

    pub(super) async fn show_settings(&self, who: Participant) -> Result<Vec<Response>> {
        let user = self.interviews.user(who.user_id).await?;
        Ok(vec![Response::Edit(Screen::new(
            format!(
                "⚙️ <b>Настройки</b>\n\n🌍 <b>Часовой пояс:</b> {}\n🗣 <b>Язык:</b> {}",
                escape(&user.timezone),
                escape(&user.locale.to_uppercase())
            ),
            keyboard::settings(),
        ))])
    }

    pub(super) fn show_timezones() -> Vec<Response> {
        vec![Response::Edit(Screen::new(
            "🌍 <b>Выбор часового пояса</b>\n\nВыберите ваш часовой пояс из списка или введите вручную:",
            keyboard::timezones(),
        ))]
    }

    pub(super) async fn set_timezone(&self, who: Participant, name: &str) -> Result<Vec<Response>> {
        let tz = match parse_timezone(name) {
            Ok(tz) => tz,
            Err(e) => return Ok(vec![Response::alert(format!("❌ {e}"))]),
        };
        self.interviews.set_timezone(who.user_id, tz).await?;
        Ok(vec![
            Response::Edit(Screen::new(
                format!(
                    "✅ Часовой пояс изменен на: <b>{}</b>\n\n\
                    Теперь все даты и время будут отображаться в вашем часовом поясе.",
                    tz.name()
                ),
                keyboard::settings(),
            )),
            Response::toast(format!("✅ Установлен {}", tz.name())),
        ])
    }

    pub(super) fn start_manual_timezone(&self, who: Participant) -> Vec<Response> {
        self.dialogues.set(who, Dialogue::Timezone);
        vec![Response::Edit(Screen::new(
            "🌍 <b>Ввод часового пояса вручную</b>\n\n\
            Введите название часового пояса в формате: <code>Регион/Город</code>\n\n\
            Примеры:\n\
            • <code>Europe/Kaliningrad</code>\n\
            • <code>Asia/Yekaterinburg</code>",
            keyboard::cancel(),
        ))]
    }

    pub(super) async fn timezone_text(
        &self,
        who: Participant,
        text: &str,
    ) -> Result<Vec<Response>> {
        let tz = match parse_timezone(text) {
            Ok(tz) => tz,
            Err(e) => {
                return Ok(vec![Response::Send(Screen::new(
                    format!("❌ {}\n\nПопробуйте снова:", escape(&e.to_string())),
                    keyboard::cancel(),
                ))])
            }
        };
        self.interviews.set_timezone(who.user_id, tz).await?;
        self.dialogues.reset(who);
        Ok(vec![Response::Send(Screen::new(
            format!("✅ Часовой пояс установлен: <b>{}</b>", tz.name()),
            keyboard::settings(),
        ))])
    }
}
