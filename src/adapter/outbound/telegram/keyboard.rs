//! Conversion of conversation keyboards into Telegram markup.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::application::conversation::Keyboard;

/// Inline markup with one callback button per [`Button`](crate::application::conversation::Button).
#[must_use]
pub fn inline_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.action.encode()))
            .collect::<Vec<_>>()
    }))
}
