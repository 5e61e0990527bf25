// Alert dispatcher - fans one alert out to the sound, notification and overlay sinks.

use chrono::Local;

use super::model::{AlertEvent, AlertSound, AlertSource};
use super::sinks::{Notifier, Overlay, SoundPlayer};
use crate::core::config::Settings;

pub struct AlertDispatcher {
    sound: Box<dyn SoundPlayer>,
    notifier: Box<dyn Notifier>,
    overlay: Box<dyn Overlay>,
}

impl AlertDispatcher {
    pub fn new(
        sound: Box<dyn SoundPlayer>,
        notifier: Box<dyn Notifier>,
        overlay: Box<dyn Overlay>,
    ) -> Self {
        Self {
            sound,
            notifier,
            overlay,
        }
    }

    /// Raise an alert for `character`.
    ///
    /// Without a character there is nothing to put in the notification, so the
    /// whole dispatch is skipped and `None` is returned. Sink failures never
    /// propagate.
    pub fn dispatch(
        &mut self,
        settings: &Settings,
        character: Option<&str>,
        source: AlertSource,
        message: &str,
    ) -> Option<AlertEvent> {
        let character = character?;

        let event = AlertEvent {
            source,
            character: character.to_string(),
            message: message.to_string(),
            fired_at: Local::now(),
        };
        let text = event.notification_text();

        if settings.notification {
            if let Err(e) = self.notifier.notify(&text) {
                log::debug!("Notification not delivered: {}", e);
            }
        }

        if settings.idle_overlay {
            if let Err(e) = self.overlay.show(&text) {
                log::debug!("Overlay not shown: {}", e);
            }
        }

        let sound = AlertSound::from_setting(settings.sound_file.as_ref());
        if let Err(e) = self.sound.play(&sound, settings.volume_fraction()) {
            log::debug!("Alert sound not played: {}", e);
        }

        log::info!("Alert ({:?}) at {}: {}", event.source, event.fired_at.format("%H:%M:%S"), text);
        Some(event)
    }

    /// Take the overlay down if it is up.
    pub fn dismiss_overlay(&mut self) {
        if self.overlay.is_visible() {
            if let Err(e) = self.overlay.hide() {
                log::debug!("Overlay not hidden: {}", e);
            }
        }
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay.is_visible()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::recording_dispatcher;
    use super::*;
    use crate::core::alerts::model::IDLE_MESSAGE;

    fn settings(notification: bool, idle_overlay: bool, volume: u8) -> Settings {
        Settings {
            notification,
            idle_overlay,
            volume,
            ..Settings::default()
        }
    }

    #[test]
    fn test_dispatch_all_sinks() {
        let (mut dispatcher, log) = recording_dispatcher(false);

        let event = dispatcher
            .dispatch(&settings(true, true, 50), Some("Felix"), AlertSource::IdleTimeout, IDLE_MESSAGE)
            .expect("Should dispatch");
        assert_eq!(event.character, "Felix");

        let log = log.borrow();
        assert_eq!(log.notifications, vec!["Felix - is Idle!".to_string()]);
        assert_eq!(log.overlay_shows, 1);
        assert!(log.overlay_visible);
        assert_eq!(log.sounds.len(), 1);
        assert_eq!(log.sounds[0].0, AlertSound::Chime);
        assert!((log.sounds[0].1 - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_sound_plays_with_toggles_off() {
        let (mut dispatcher, log) = recording_dispatcher(false);

        dispatcher.dispatch(&settings(false, false, 30), Some("Felix"), AlertSource::IdleTimeout, IDLE_MESSAGE);

        let log = log.borrow();
        assert!(log.notifications.is_empty());
        assert_eq!(log.overlay_shows, 0);
        assert_eq!(log.sounds.len(), 1);
        assert!((log.sounds[0].1 - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_missing_character_has_no_side_effects() {
        let (mut dispatcher, log) = recording_dispatcher(false);

        let event = dispatcher.dispatch(&settings(true, true, 50), None, AlertSource::FeedMessage, "anything");
        assert!(event.is_none());

        let log = log.borrow();
        assert!(log.sounds.is_empty());
        assert!(log.notifications.is_empty());
        assert_eq!(log.overlay_shows, 0);
    }

    #[test]
    fn test_sink_failures_are_swallowed() {
        let (mut dispatcher, log) = recording_dispatcher(true);

        let event = dispatcher.dispatch(&settings(true, true, 50), Some("Felix"), AlertSource::IdleTimeout, IDLE_MESSAGE);
        assert!(event.is_some(), "Failed sinks must not abort the alert");
        assert_eq!(log.borrow().overlay_shows, 1);
    }

    #[test]
    fn test_custom_sound_file() {
        let (mut dispatcher, log) = recording_dispatcher(false);
        let mut s = settings(false, false, 100);
        s.sound_file = Some("/tmp/idle.mp3".into());

        dispatcher.dispatch(&s, Some("Felix"), AlertSource::IdleTimeout, IDLE_MESSAGE);
        assert_eq!(log.borrow().sounds[0].0, AlertSound::File("/tmp/idle.mp3".into()));
    }

    #[test]
    fn test_dismiss_overlay() {
        let (mut dispatcher, log) = recording_dispatcher(false);
        dispatcher.dispatch(&settings(false, true, 50), Some("Felix"), AlertSource::IdleTimeout, IDLE_MESSAGE);
        dispatcher.dispatch(&settings(false, true, 50), Some("Felix"), AlertSource::IdleTimeout, IDLE_MESSAGE);
        assert!(dispatcher.overlay_visible());
        assert_eq!(log.borrow().overlay_shows, 2);

        dispatcher.dismiss_overlay();
        assert!(!dispatcher.overlay_visible());
    }
}
