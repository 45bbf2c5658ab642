//! Validation errors for user-supplied input.
//!
//! The display text of every variant is shown to the user verbatim, so the
//! messages are written in the bot's language rather than for logs.

use thiserror::Error;

/// Input rejected by one of the validators in [`crate::domain::validate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Текст должен содержать минимум {min} символов")]
    TooShort { min: usize },

    #[error("Текст не должен превышать {max} символов")]
    TooLong { max: usize },

    #[error("URL не может быть пустым")]
    EmptyUrl,

    #[error("Некорректный формат URL. Пример: https://example.com")]
    InvalidUrl,

    #[error("Дата интервью должна быть в будущем")]
    DateInPast,

    #[error(
        "Некорректный формат даты. Используйте формат: ДД.ММ.ГГГГ ЧЧ:ММ (например, 25.12.2024 14:30)"
    )]
    InvalidDate,

    #[error("Некорректный формат. Используйте числа через запятую, например: 24, 12, 6, 3, 1.5, 0.5")]
    InvalidNotificationTimes,

    #[error("Время уведомления должно быть положительным числом")]
    NonPositiveTime,

    #[error("Время уведомления не должно превышать {max} часов (1 неделя)")]
    TimeTooLarge { max: u32 },

    #[error("Неизвестный часовой пояс: {0}. Используйте формат Регион/Город, например Europe/Moscow")]
    InvalidTimezone(String),

    #[error("Используйте формат ЧЧ:ММ-ЧЧ:ММ, например 22:00-08:00")]
    InvalidQuietHours,

    #[error("Оценка должна быть числом от 1 до 5")]
    InvalidRating,
}
