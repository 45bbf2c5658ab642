//! Telegram bot configuration.

use serde::Deserialize;

/// Telegram bot configuration.
///
/// The token is read from `BOT_TOKEN` only and never from the file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    #[serde(skip)]
    pub bot_token: Option<String>,
    /// Webhook delivery is not supported; the bot always long-polls.
    pub webhook_enabled: bool,
    pub webhook_url: String,
}
