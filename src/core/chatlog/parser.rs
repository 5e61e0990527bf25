//! Parser for chat log lines.
//!
//! Turns each line of the log into a feed entry: chat lines become list items
//! carrying their message text, everything else (headers, separators) is kept
//! as an `Other` entry so feed indices still line up with log lines.

use lazy_static::lazy_static;
use regex::Regex;

use super::feed::FeedEntry;

lazy_static! {
    // Pattern: [ 2026.10.17 11:26:33 ] System > WARNING - You will be logged out ...
    static ref CHAT_LINE: Regex =
        Regex::new(r"^\s*\[\s*[^\]]*\]\s*(?P<speaker>[^>]+?)\s*>(?P<text>.*)$").expect("Invalid chat line regex");
}

/// A parsed chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub speaker: String,
    /// Message text exactly as logged (may carry surrounding whitespace).
    pub text: String,
}

/// Parse a single line. Returns `None` for anything that is not a chat message.
pub fn parse_line(line: &str) -> Option<ChatLine> {
    // Strip BOM and line endings
    let line = line.trim_start_matches('\u{feff}').trim_end_matches(&['\r', '\n'][..]);
    let caps = CHAT_LINE.captures(line)?;

    Some(ChatLine {
        speaker: caps.name("speaker")?.as_str().trim().to_string(),
        text: caps.name("text")?.as_str().to_string(),
    })
}

/// Convert one log line into a feed entry.
pub fn to_entry(line: &str) -> FeedEntry {
    match parse_line(line) {
        Some(chat) => FeedEntry::message(chat.text),
        None => FeedEntry::other(),
    }
}

pub fn to_entries(lines: &[String]) -> Vec<FeedEntry> {
    lines.iter().map(|line| to_entry(line)).collect()
}
