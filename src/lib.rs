//! interview-bot - a Telegram bot that tracks job interviews.
//!
//! Users record interviews through a guided dialogue, get reminders before
//! each one, track status changes and export their data as calendar or JSON
//! files. Admins get periodic SQLite backups.
//!
//! # Architecture
//!
//! - [`domain`] - Interview, user and notification types, validation
//! - [`port`] - Store and messenger traits
//! - [`application`] - Services, the conversation state machine, the scheduler
//! - [`adapter`] - SQLite, Telegram, the health server and the CLI
//! - [`infrastructure`] - Configuration and runtime wiring
//! - [`error`] - Error types for the crate

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;
