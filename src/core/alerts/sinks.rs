// Output sinks for alerts: sound, desktop notification and on-screen overlay.
//
// Every sink reports failure through `SinkError`; the dispatcher swallows it.

use std::fs::File;
use std::io::{self, BufReader};
use std::process::Command;
use std::thread;
use std::time::Duration;

use super::model::AlertSound;

const APP_NAME: &str = "Idle Alert";

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("{0} is not available")]
    Unavailable(&'static str),
    #[error("sound file not found: {0}")]
    MissingSound(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub trait SoundPlayer {
    /// Start playing `sound` at `volume` (0.0-1.0). Must not block.
    fn play(&mut self, sound: &AlertSound, volume: f32) -> Result<(), SinkError>;
}

pub trait Notifier {
    fn notify(&mut self, text: &str) -> Result<(), SinkError>;
}

pub trait Overlay {
    /// Make the overlay visible. Showing it again while visible is a no-op.
    fn show(&mut self, text: &str) -> Result<(), SinkError>;
    fn hide(&mut self) -> Result<(), SinkError>;
    fn is_visible(&self) -> bool;
}

/// Plays alerts through the default audio device with rodio.
///
/// Each sound gets its own short-lived thread so playback never blocks the
/// tick loop.
#[derive(Debug, Default)]
pub struct RodioPlayer;

impl RodioPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl SoundPlayer for RodioPlayer {
    fn play(&mut self, sound: &AlertSound, volume: f32) -> Result<(), SinkError> {
        if let AlertSound::File(path) = sound {
            if !path.is_file() {
                return Err(SinkError::MissingSound(path.display().to_string()));
            }
        }

        let sound = sound.clone();
        let volume = volume.clamp(0.0, 1.0);
        thread::Builder::new()
            .name("alert-sound".to_string())
            .spawn(move || {
                if let Err(e) = play_blocking(&sound, volume) {
                    log::debug!("Alert sound failed: {}", e);
                }
            })?;
        Ok(())
    }
}

fn play_blocking(sound: &AlertSound, volume: f32) -> Result<(), String> {
    use rodio::source::SineWave;
    use rodio::{Decoder, OutputStreamBuilder, Sink, Source};

    let stream = OutputStreamBuilder::open_default_stream().map_err(|e| e.to_string())?;
    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);

    match sound {
        AlertSound::File(path) => {
            let file = File::open(path).map_err(|e| e.to_string())?;
            let source = Decoder::new(BufReader::new(file)).map_err(|e| e.to_string())?;
            sink.append(source);
        }
        AlertSound::Chime => {
            // Two short beeps.
            for freq in [880.0, 1320.0] {
                let beep = SineWave::new(freq)
                    .take_duration(Duration::from_millis(180))
                    .amplify(0.3);
                sink.append(beep);
            }
        }
    }

    sink.sleep_until_end();
    Ok(())
}

/// Sends a desktop notification through the platform's command line tool.
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }

    #[cfg(target_os = "linux")]
    fn command(text: &str) -> Option<Command> {
        let mut cmd = Command::new("notify-send");
        cmd.arg(APP_NAME).arg(text);
        Some(cmd)
    }

    #[cfg(target_os = "macos")]
    fn command(text: &str) -> Option<Command> {
        let mut cmd = Command::new("osascript");
        cmd.arg("-e").arg(format!(
            "display notification {:?} with title {:?}",
            text, APP_NAME
        ));
        Some(cmd)
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    fn command(_text: &str) -> Option<Command> {
        None
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&mut self, text: &str) -> Result<(), SinkError> {
        let mut cmd = Self::command(text).ok_or(SinkError::Unavailable("desktop notification"))?;
        let mut child = cmd.spawn()?;
        // Reap in the background so the caller never waits on the notification daemon.
        thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

/// Terminal stand-in for the on-screen idle overlay.
///
/// Prints a banner when it becomes visible and a line when dismissed.
#[derive(Debug, Default)]
pub struct IdleOverlay {
    visible: bool,
}

impl IdleOverlay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Overlay for IdleOverlay {
    fn show(&mut self, text: &str) -> Result<(), SinkError> {
        if !self.visible {
            self.visible = true;
            log::warn!("==================== {} ====================", text);
        }
        Ok(())
    }

    fn hide(&mut self) -> Result<(), SinkError> {
        if self.visible {
            self.visible = false;
            log::info!("Idle overlay dismissed");
        }
        Ok(())
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_overlay_show_is_reentrant() {
        let mut overlay = IdleOverlay::new();
        assert!(!overlay.is_visible());

        overlay.show("Felix - is Idle!").unwrap();
        overlay.show("Felix - is Idle!").unwrap();
        assert!(overlay.is_visible());

        overlay.hide().unwrap();
        assert!(!overlay.is_visible());
        overlay.hide().unwrap();
        assert!(!overlay.is_visible());
    }

    #[test]
    fn test_missing_sound_file_is_an_error() {
        let mut player = RodioPlayer::new();
        let sound = AlertSound::File(PathBuf::from("/definitely/not/here.mp3"));
        assert!(matches!(player.play(&sound, 0.5), Err(SinkError::MissingSound(_))));
    }
}
