//! Long-polling dispatcher and response delivery.
//!
//! ```text
//! Telegram ──► Dispatcher ──► message branch ──┐
//!                          └► callback branch ─┴─► Conversation::handle ──► deliver
//! ```
//!
//! Callback queries are always answered, with the first toast when the
//! conversation produced one. Edits that Telegram rejects fall back to a new
//! message.

use std::sync::Arc;

use chrono::Utc;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, InputFile, MessageId, ParseMode};
use teloxide::{ApiError, RequestError};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::keyboard::inline_markup;
use crate::application::conversation::command::bot_commands;
use crate::application::conversation::{
    Action, Conversation, Incoming, Input, Response, Screen,
};
use crate::port::{Messenger, Repository};

/// Register bot commands with Telegram for the "/" menu.
pub async fn register_bot_commands(bot: &Bot) -> Result<(), RequestError> {
    let commands: Vec<BotCommand> = bot_commands()
        .into_iter()
        .map(|(cmd, desc)| BotCommand::new(cmd, desc))
        .collect();

    bot.set_my_commands(commands).await?;
    info!("Registered bot commands with Telegram");
    Ok(())
}

/// Poll for updates until `shutdown` flips to `true`.
pub async fn run<R, M>(
    bot: Bot,
    conversation: Conversation<R, M>,
    mut shutdown: watch::Receiver<bool>,
) where
    R: Repository,
    M: Messenger + 'static,
{
    if let Err(e) = register_bot_commands(&bot).await {
        warn!(error = %e, "Failed to register bot commands with Telegram");
    }

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message::<R, M>))
        .branch(Update::filter_callback_query().endpoint(on_callback::<R, M>));

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![Arc::new(conversation)])
        .default_handler(|_update| async {})
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error while handling a Telegram update",
        ))
        .build();

    let token = dispatcher.shutdown_token();
    tokio::spawn(async move {
        loop {
            match shutdown.changed().await {
                Ok(()) if !*shutdown.borrow() => continue,
                _ => break,
            }
        }
        if let Ok(done) = token.shutdown() {
            done.await;
        }
    });

    info!("Telegram polling started");
    dispatcher.dispatch().await;
    info!("Telegram polling stopped");
}

/// Text messages. Updates without a sender (channel posts) are ignored.
pub async fn on_message<R, M>(
    bot: Bot,
    msg: Message,
    conversation: Arc<Conversation<R, M>>,
) -> ResponseResult<()>
where
    R: Repository,
    M: Messenger + 'static,
{
    let (Some(text), Some(from)) = (msg.text(), msg.from.as_ref()) else {
        return Ok(());
    };
    let sender = ChatId::from(from.id).0;
    let incoming = Incoming::new(msg.chat.id.0, sender, Input::from_text(text))
        .with_username(from.username.clone());

    let responses = conversation.handle(incoming, Utc::now()).await;
    deliver(&bot, msg.chat.id, None, responses).await;
    Ok(())
}

/// Inline button presses.
pub async fn on_callback<R, M>(
    bot: Bot,
    query: CallbackQuery,
    conversation: Arc<Conversation<R, M>>,
) -> ResponseResult<()>
where
    R: Repository,
    M: Messenger + 'static,
{
    let (chat_id, message_id) = match &query.message {
        Some(message) => (message.chat().id, Some(message.id())),
        None => (ChatId::from(query.from.id), None),
    };

    let Some(action) = query.data.as_deref().and_then(Action::parse) else {
        debug!(data = ?query.data, "Unknown callback data");
        bot.answer_callback_query(query.id.clone()).await?;
        return Ok(());
    };

    let sender = ChatId::from(query.from.id).0;
    let incoming = Incoming::new(chat_id.0, sender, Input::Action(action))
        .with_username(query.from.username.clone());
    let responses = conversation.handle(incoming, Utc::now()).await;

    let toast = responses.iter().find_map(|response| match response {
        Response::Toast { text, alert } => Some((text.clone(), *alert)),
        _ => None,
    });
    let answer = bot.answer_callback_query(query.id.clone());
    let answered = match toast {
        Some((text, alert)) => answer.text(text).show_alert(alert).await,
        None => answer.await,
    };
    // The update is already handled; delivery still has to happen.
    if let Err(e) = answered {
        warn!(chat_id = chat_id.0, error = %e, "Failed to answer callback query");
    }

    deliver(&bot, chat_id, message_id, responses).await;
    Ok(())
}

/// Carry out the responses in order. Failures are logged and do not stop
/// the remaining responses.
pub async fn deliver(
    bot: &Bot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    responses: Vec<Response>,
) {
    for response in responses {
        match response {
            Response::Send(screen) => {
                if let Err(e) = send(bot, chat_id, &screen).await {
                    error!(chat_id = chat_id.0, error = %e, "Failed to send message");
                }
            }
            Response::Edit(screen) => edit_or_send(bot, chat_id, message_id, &screen).await,
            Response::Toast { .. } => {}
            Response::Document {
                path,
                caption,
                temporary,
            } => {
                let sent = bot
                    .send_document(chat_id, InputFile::file(path.clone()))
                    .caption(caption)
                    .parse_mode(ParseMode::Html)
                    .await;
                if let Err(e) = sent {
                    error!(chat_id = chat_id.0, error = %e, "Failed to send document");
                    let notice = Screen::plain(format!("❌ Ошибка при отправке файла: {e}"));
                    if let Err(e) = send(bot, chat_id, &notice).await {
                        error!(chat_id = chat_id.0, error = %e, "Failed to report document error");
                    }
                }
                if temporary {
                    if let Err(e) = tokio::fs::remove_file(&path).await {
                        warn!(path = %path.display(), error = %e, "Failed to remove export file");
                    }
                }
            }
        }
    }
}

async fn send(bot: &Bot, chat_id: ChatId, screen: &Screen) -> Result<(), RequestError> {
    let request = bot
        .send_message(chat_id, &screen.text)
        .parse_mode(ParseMode::Html);
    match &screen.keyboard {
        Some(keyboard) => request.reply_markup(inline_markup(keyboard)).await?,
        None => request.await?,
    };
    Ok(())
}

async fn edit_or_send(bot: &Bot, chat_id: ChatId, message_id: Option<MessageId>, screen: &Screen) {
    if let Some(message_id) = message_id {
        let request = bot
            .edit_message_text(chat_id, message_id, &screen.text)
            .parse_mode(ParseMode::Html);
        let edited = match &screen.keyboard {
            Some(keyboard) => request.reply_markup(inline_markup(keyboard)).await,
            None => request.await,
        };
        match edited {
            Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => return,
            Err(e) => debug!(chat_id = chat_id.0, error = %e, "Edit failed, sending instead"),
        }
    }
    if let Err(e) = send(bot, chat_id, screen).await {
        error!(chat_id = chat_id.0, error = %e, "Failed to send message");
    }
}
