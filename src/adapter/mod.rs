//! Adapters: the CLI and health server on the inbound side, SQLite and
//! Telegram on the outbound side.

pub mod inbound;
pub mod outbound;
