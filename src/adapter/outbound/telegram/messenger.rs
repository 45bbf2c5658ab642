//! [`Messenger`] on top of a teloxide [`Bot`].

use std::path::Path;

use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};
use tracing::debug;

use crate::error::Result;
use crate::port::Messenger;

/// Sends HTML messages and documents through the Bot API.
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    #[must_use]
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

impl Messenger for TelegramMessenger {
    async fn send_text(&self, chat_id: i64, html: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat_id), html)
            .parse_mode(ParseMode::Html)
            .await?;
        debug!(chat_id, "Message sent");
        Ok(())
    }

    async fn send_document(&self, chat_id: i64, path: &Path, caption: Option<&str>) -> Result<()> {
        let request = self
            .bot
            .send_document(ChatId(chat_id), InputFile::file(path.to_path_buf()))
            .parse_mode(ParseMode::Html);
        match caption {
            Some(caption) => request.caption(caption).await?,
            None => request.await?,
        };
        debug!(chat_id, path = %path.display(), "Document sent");
        Ok(())
    }
}
