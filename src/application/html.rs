//! Helpers for Telegram HTML message text.

/// Escape text for Telegram's HTML parse mode.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a boolean as the bot's yes/no marker.
#[must_use]
pub const fn yes_no(value: bool) -> &'static str {
    if value {
        "✅ Да"
    } else {
        "❌ Нет"
    }
}
