//! Inline keyboards for every screen.

use chrono_tz::Tz;

use super::action::Action;
use super::screen::{Button, Keyboard};
use crate::application::interview::DATE_DISPLAY_FORMAT;
use crate::domain::user::POPULAR_TIMEZONES;
use crate::domain::{
    Interview, InterviewStatus, InterviewTemplate, InterviewType, NotificationSettings, Recruiter,
};

const BACK_TO_MENU: &str = "↩️ Главное меню";
const BACK: &str = "↩️ Назад";

pub fn main_menu() -> Keyboard {
    Keyboard::new()
        .button("➕ Добавить интервью", Action::AddInterview)
        .button("📋 Мои интервью", Action::MyInterviews)
        .row(vec![
            Button::new("📝 Шаблоны", Action::Templates),
            Button::new("👥 Рекрутеры", Action::Recruiters),
        ])
        .row(vec![
            Button::new("📤 Экспорт", Action::ExportMenu),
            Button::new("⚙️ Настройки", Action::Settings),
        ])
}

pub fn cancel() -> Keyboard {
    Keyboard::new().button("❌ Отмена", Action::Cancel)
}

pub fn skip() -> Keyboard {
    Keyboard::new()
        .button("⏭ Пропустить", Action::Skip)
        .button("❌ Отмена", Action::Cancel)
}

pub fn camera() -> Keyboard {
    Keyboard::new()
        .row(vec![
            Button::new("✅ Да", Action::Camera(true)),
            Button::new("❌ Нет", Action::Camera(false)),
        ])
        .button("↩️ Отмена", Action::Cancel)
}

pub fn interview_type() -> Keyboard {
    InterviewType::ALL
        .into_iter()
        .fold(Keyboard::new(), |kb, kind| {
            kb.button(kind.label(), Action::Type(kind))
        })
        .button("↩️ Отмена", Action::Cancel)
}

pub fn confirm() -> Keyboard {
    Keyboard::new().row(vec![
        Button::new("✅ Подтвердить", Action::Confirm),
        Button::new("❌ Отмена", Action::Cancel),
    ])
}

/// One button per interview, labelled with company, position and local date.
pub fn interviews(interviews: &[Interview], tz: Tz, show_all: bool) -> Keyboard {
    let mut keyboard = interviews.iter().fold(Keyboard::new(), |kb, interview| {
        kb.button(
            format!(
                "{} - {} ({})",
                interview.company_name,
                interview.position,
                interview.local_date(tz).format(DATE_DISPLAY_FORMAT)
            ),
            Action::ViewInterview(interview.id),
        )
    });
    keyboard = if show_all {
        keyboard.button("📅 Только предстоящие", Action::MyInterviews)
    } else {
        keyboard.button("🗂 Все интервью", Action::AllInterviews)
    };
    keyboard.button(BACK_TO_MENU, Action::MainMenu)
}

pub fn interview_detail(id: i32) -> Keyboard {
    Keyboard::new()
        .row(vec![
            Button::new("📌 Изменить статус", Action::ChangeStatus(id)),
            Button::new("🕓 История", Action::History(id)),
        ])
        .button("📅 В календарь", Action::ExportInterview(id))
        .button("🗑 Удалить", Action::DeleteInterview(id))
        .button(BACK, Action::MyInterviews)
}

/// Every status except the current one.
pub fn status_picker(id: i32, current: InterviewStatus) -> Keyboard {
    InterviewStatus::ALL
        .into_iter()
        .filter(|status| *status != current)
        .fold(Keyboard::new(), |kb, status| {
            kb.button(status.label(), Action::SetStatus(id, status))
        })
        .button(BACK, Action::ViewInterview(id))
}

pub fn back_to_interview(id: i32) -> Keyboard {
    Keyboard::new().button(BACK, Action::ViewInterview(id))
}

pub fn notification_settings(settings: &NotificationSettings) -> Keyboard {
    let toggle = if settings.enabled {
        "🔕 Выключить уведомления"
    } else {
        "🔔 Включить уведомления"
    };
    let grouping = if settings.group_notifications {
        "📦 Группировка: вкл"
    } else {
        "📦 Группировка: выкл"
    };
    Keyboard::new()
        .button(toggle, Action::ToggleNotifications)
        .button("⏰ Изменить время уведомлений", Action::ChangeNotificationTimes)
        .button("🔄 Сбросить на стандартные", Action::ResetNotificationTimes)
        .button("🌙 Тихие часы", Action::QuietHoursSettings)
        .button(grouping, Action::ToggleGrouping)
        .button(BACK_TO_MENU, Action::MainMenu)
}

pub fn quiet_hours() -> Keyboard {
    Keyboard::new()
        .button("✅ Включить (22:00 - 08:00)", Action::QuietHoursEnable)
        .button("🕐 Указать время", Action::QuietHoursSetTime)
        .button("🔔 Выключить", Action::QuietHoursDisable)
        .button(BACK, Action::NotificationSettings)
}

pub fn recruiters(recruiters: &[Recruiter]) -> Keyboard {
    recruiters
        .iter()
        .fold(Keyboard::new(), |kb, recruiter| {
            let label = match &recruiter.company_name {
                Some(company) => format!("{} ({company})", recruiter.name),
                None => recruiter.name.clone(),
            };
            kb.button(label, Action::ViewRecruiter(recruiter.id))
        })
        .button("➕ Добавить рекрутера", Action::AddRecruiter)
        .button(BACK_TO_MENU, Action::MainMenu)
}

pub fn recruiter_detail(id: i32) -> Keyboard {
    Keyboard::new()
        .button("🗑 Удалить", Action::DeleteRecruiter(id))
        .button(BACK, Action::Recruiters)
}

pub fn templates(templates: &[InterviewTemplate]) -> Keyboard {
    templates
        .iter()
        .fold(Keyboard::new(), |kb, template| {
            kb.button(template.name.clone(), Action::ViewTemplate(template.id))
        })
        .button("➕ Создать шаблон", Action::AddTemplate)
        .button(BACK_TO_MENU, Action::MainMenu)
}

pub fn template_detail(id: i32) -> Keyboard {
    Keyboard::new()
        .button("🚀 Использовать", Action::UseTemplate(id))
        .button("🗑 Удалить", Action::DeleteTemplate(id))
        .button(BACK, Action::Templates)
}

pub fn settings() -> Keyboard {
    Keyboard::new()
        .button("🌍 Часовой пояс", Action::TimezoneMenu)
        .button("🔔 Уведомления", Action::NotificationSettings)
        .button(BACK_TO_MENU, Action::MainMenu)
}

pub fn timezones() -> Keyboard {
    POPULAR_TIMEZONES
        .iter()
        .fold(Keyboard::new(), |kb, (name, label)| {
            kb.button(*label, Action::SetTimezone((*name).to_string()))
        })
        .button("✍️ Ввести вручную", Action::TimezoneManual)
        .button(BACK, Action::Settings)
}

/// The backup button is only offered to admins.
pub fn export_menu(is_admin: bool) -> Keyboard {
    let keyboard = Keyboard::new()
        .button("📅 Календарь (ICS)", Action::ExportIcs)
        .button("📄 JSON", Action::ExportJson);
    let keyboard = if is_admin {
        keyboard.button("💾 Резервная копия", Action::CreateBackup)
    } else {
        keyboard
    };
    keyboard.button(BACK_TO_MENU, Action::MainMenu)
}
