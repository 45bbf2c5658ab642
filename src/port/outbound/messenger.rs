//! Messenger port for messages that are not replies to an update.
//!
//! Background jobs (reminders, backups) use this to reach users directly.

use std::future::Future;
use std::path::Path;

use crate::error::Result;

/// Delivers messages to a chat.
///
/// Text is HTML formatted; callers escape user-supplied values.
pub trait Messenger: Send + Sync {
    /// Send an HTML message to a chat.
    fn send_text(&self, chat_id: i64, html: &str) -> impl Future<Output = Result<()>> + Send;

    /// Upload a file to a chat with an optional caption.
    fn send_document(
        &self,
        chat_id: i64,
        path: &Path,
        caption: Option<&str>,
    ) -> impl Future<Output = Result<()>> + Send;
}
