// Alert model types.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Feed messages that raise an alert as soon as they appear.
pub const ALERT_MESSAGES: &[&str] = &["WARNING - You will be logged out in 1 minute due to inactivity"];

/// Message used when the idle counter crosses its threshold.
pub const IDLE_MESSAGE: &str = "is Idle!";

/// Returns the alert message if `text` matches one exactly (case-sensitive).
pub fn match_alert_message(text: &str) -> Option<&'static str> {
    ALERT_MESSAGES.iter().copied().find(|m| *m == text)
}

/// What raised an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSource {
    /// The idle counter crossed its threshold.
    IdleTimeout,
    /// A watched message showed up in the chat feed.
    FeedMessage,
}

/// Sound played for every alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AlertSound {
    /// Built-in tone.
    #[default]
    Chime,
    /// User supplied audio file.
    File(PathBuf),
}

impl AlertSound {
    pub fn from_setting(path: Option<&PathBuf>) -> Self {
        match path {
            Some(p) => Self::File(p.clone()),
            None => Self::Chime,
        }
    }
}

/// Record of a dispatched alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub source: AlertSource,
    pub character: String,
    pub message: String,
    pub fired_at: DateTime<Local>,
}

impl AlertEvent {
    /// Text shown in the desktop notification.
    pub fn notification_text(&self) -> String {
        format!("{} - {}", self.character, self.message)
    }
}
