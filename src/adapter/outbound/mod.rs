//! Outbound adapters implementing the ports.

pub mod sqlite;
pub mod telegram;
