//! Infrastructure configuration modules.

pub mod backup;
pub mod logging;
pub mod notification;
pub mod settings;
pub mod storage;
pub mod telegram;
pub mod web;

pub use settings::Config;
