//! Telegram adapter.
//!
//! [`TelegramMessenger`] implements the [`Messenger`](crate::port::Messenger)
//! port for background jobs. [`runtime`] runs the long-polling dispatcher
//! that feeds updates into the conversation and delivers its responses.

pub mod keyboard;
pub mod messenger;
pub mod runtime;

pub use messenger::TelegramMessenger;
