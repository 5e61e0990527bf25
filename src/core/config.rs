use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

pub const DEFAULT_VOLUME: u8 = 50;
pub const MAX_VOLUME: u8 = 100;
pub const DEFAULT_ACTIVATION_TICKS: u32 = 20;

/// User settings. Persisted in settings.json.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Master switch for the idle check.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Alert volume, 0-100.
    #[serde(default = "default_volume")]
    pub volume: u8,
    /// Idle ticks that must be exceeded before alerting.
    #[serde(default = "default_activation_ticks")]
    pub activation_ticks: u32,
    #[serde(default)]
    pub notification: bool,
    #[serde(default)]
    pub idle_overlay: bool,
    /// Chat log to watch for the inactivity warning.
    #[serde(default)]
    pub chatlog_path: Option<PathBuf>,
    /// Replaces the built-in alert tone when set.
    #[serde(default)]
    pub sound_file: Option<PathBuf>,
}

fn default_enabled() -> bool {
    true
}

fn default_volume() -> u8 {
    DEFAULT_VOLUME
}

fn default_activation_ticks() -> u32 {
    DEFAULT_ACTIVATION_TICKS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: DEFAULT_VOLUME,
            activation_ticks: DEFAULT_ACTIVATION_TICKS,
            notification: false,
            idle_overlay: false,
            chatlog_path: None,
            sound_file: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("unknown setting: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: serde_json::Value },
}

impl Settings {
    /// Playback volume in the 0.0-1.0 range.
    pub fn volume_fraction(&self) -> f32 {
        f32::from(self.volume.min(MAX_VOLUME)) / 100.0
    }

    /// Pull hand-edited values back into the ranges `apply` enforces.
    pub fn normalize(&mut self) {
        self.volume = self.volume.min(MAX_VOLUME);
        self.activation_ticks = self.activation_ticks.max(1);
    }

    /// Apply a single change coming from the settings UI.
    ///
    /// Volume is clamped to 0-100 and the activation threshold to at least 1.
    pub fn apply(&mut self, key: &str, value: &serde_json::Value) -> Result<(), SettingsError> {
        let invalid = || SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.clone(),
        };

        match key {
            "enable" | "enabled" => self.enabled = value.as_bool().ok_or_else(invalid)?,
            "volume" => {
                let raw = value.as_f64().ok_or_else(invalid)?;
                self.volume = raw.round().clamp(0.0, f64::from(MAX_VOLUME)) as u8;
            }
            "activationTicks" | "activation_ticks" => {
                let raw = value.as_u64().ok_or_else(invalid)?;
                self.activation_ticks = u32::try_from(raw).unwrap_or(u32::MAX).max(1);
            }
            "notification" => self.notification = value.as_bool().ok_or_else(invalid)?,
            "idleOverlay" | "idle_overlay" => self.idle_overlay = value.as_bool().ok_or_else(invalid)?,
            "chatlog_path" => self.chatlog_path = optional_path(value).ok_or_else(invalid)?,
            "sound_file" => self.sound_file = optional_path(value).ok_or_else(invalid)?,
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

fn optional_path(value: &serde_json::Value) -> Option<Option<PathBuf>> {
    match value {
        serde_json::Value::Null => Some(None),
        serde_json::Value::String(s) if s.trim().is_empty() => Some(None),
        serde_json::Value::String(s) => Some(Some(PathBuf::from(s))),
        _ => None,
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(app_config_dir: PathBuf) -> Self {
        Self {
            config_path: app_config_dir.join("settings.json"),
        }
    }

    pub fn load(&self) -> Settings {
        if self.config_path.exists() {
            if let Ok(content) = fs::read_to_string(&self.config_path) {
                match serde_json::from_str::<Settings>(&content) {
                    Ok(mut settings) => {
                        settings.normalize();
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring unreadable {:?}: {}", self.config_path, e),
                }
            }
        }
        Settings::default()
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)
    }
}
