//! Slash command parsing.

/// Supported bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Menu,
    Help,
    Cancel,
}

/// Parse error for command messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    NotACommand,
    UnknownCommand(String),
}

impl std::fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotACommand => write!(f, "message is not a command"),
            Self::UnknownCommand(cmd) => write!(f, "unknown command `{cmd}`"),
        }
    }
}

impl std::error::Error for CommandParseError {}

/// Parse a message into a bot command.
///
/// Arguments after the command are ignored and a `@bot_name` suffix is
/// stripped.
pub fn parse_command(text: &str) -> Result<Command, CommandParseError> {
    let Some(raw_command) = text.split_whitespace().next() else {
        return Err(CommandParseError::NotACommand);
    };
    if !raw_command.starts_with('/') {
        return Err(CommandParseError::NotACommand);
    }

    let command = raw_command
        .split_once('@')
        .map_or(raw_command, |(head, _)| head);

    match command {
        "/start" => Ok(Command::Start),
        "/menu" => Ok(Command::Menu),
        "/help" => Ok(Command::Help),
        "/cancel" => Ok(Command::Cancel),
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

/// Help text returned by `/help`.
#[must_use]
pub const fn command_help() -> &'static str {
    "📖 <b>Команды</b>\n\n\
    /start - 👋 Начать работу и показать меню\n\
    /menu - 📱 Главное меню\n\
    /cancel - ❌ Отменить текущее действие\n\
    /help - 📖 Список команд\n\n\
    Остальные действия доступны через кнопки меню."
}

/// Bot commands for Telegram menu registration.
///
/// Returns tuples of (command, description) for `set_my_commands`.
#[must_use]
pub fn bot_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("start", "Начать работу"),
        ("menu", "Главное меню"),
        ("cancel", "Отменить текущее действие"),
        ("help", "Список команд"),
    ]
}
