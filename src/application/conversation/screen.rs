//! Transport-neutral output of the conversation.
//!
//! The Telegram adapter turns these into API calls. Tests inspect them
//! directly.

use std::path::PathBuf;

use super::action::Action;
use super::command::{parse_command, Command, CommandParseError};

/// An inline button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: Action,
}

impl Button {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Rows of inline buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row with a single button.
    #[must_use]
    pub fn button(mut self, label: impl Into<String>, action: Action) -> Self {
        self.rows.push(vec![Button::new(label, action)]);
        self
    }

    /// Append a row of buttons.
    #[must_use]
    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        if !buttons.is_empty() {
            self.rows.push(buttons);
        }
        self
    }

    /// Every action reachable from this keyboard, in display order.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.rows.iter().flatten().map(|b| &b.action)
    }

    #[must_use]
    pub fn contains(&self, action: &Action) -> bool {
        self.actions().any(|a| a == action)
    }
}

/// HTML text with an optional keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Screen {
    pub fn new(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }
}

/// One thing to do in reply to an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Send a new message.
    Send(Screen),
    /// Replace the message the pressed button belongs to.
    Edit(Screen),
    /// Answer the callback query with a notification.
    Toast { text: String, alert: bool },
    /// Upload a file. Temporary files are removed after delivery.
    Document {
        path: PathBuf,
        caption: String,
        temporary: bool,
    },
}

impl Response {
    pub fn toast(text: impl Into<String>) -> Self {
        Self::Toast {
            text: text.into(),
            alert: false,
        }
    }

    pub fn alert(text: impl Into<String>) -> Self {
        Self::Toast {
            text: text.into(),
            alert: true,
        }
    }

    /// The screen carried by a send or edit.
    #[must_use]
    pub fn screen(&self) -> Option<&Screen> {
        match self {
            Self::Send(screen) | Self::Edit(screen) => Some(screen),
            _ => None,
        }
    }
}

/// What the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Text(String),
    Action(Action),
}

impl Input {
    /// Classify a text message. Unknown commands show the help.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        match parse_command(text) {
            Ok(command) => Self::Command(command),
            Err(CommandParseError::UnknownCommand(_)) => Self::Command(Command::Help),
            Err(CommandParseError::NotACommand) => Self::Text(text.to_string()),
        }
    }
}

/// The chat an update arrived in and the Telegram user who sent it.
///
/// Data belongs to the user and replies go to the chat. In a private chat
/// both ids are the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Participant {
    pub chat_id: i64,
    pub user_id: i64,
}

impl Participant {
    #[must_use]
    pub const fn new(chat_id: i64, user_id: i64) -> Self {
        Self { chat_id, user_id }
    }

    /// A one-to-one chat with `user_id`.
    #[must_use]
    pub const fn private(user_id: i64) -> Self {
        Self::new(user_id, user_id)
    }
}

/// An update addressed to the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incoming {
    pub chat_id: i64,
    /// Telegram id of the sender.
    pub user_id: i64,
    pub username: Option<String>,
    pub input: Input,
}

impl Incoming {
    pub fn new(chat_id: i64, user_id: i64, input: Input) -> Self {
        Self {
            chat_id,
            user_id,
            username: None,
            input,
        }
    }

    #[must_use]
    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    #[must_use]
    pub const fn participant(&self) -> Participant {
        Participant::new(self.chat_id, self.user_id)
    }
}
