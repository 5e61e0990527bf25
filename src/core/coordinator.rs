use super::alerts::dispatcher::AlertDispatcher;
use super::alerts::model::{AlertEvent, AlertSource, IDLE_MESSAGE};
use super::chatlog::feed::FeedRoot;
use super::chatlog::watcher::{self, FeedSubscription};
use super::config::Settings;
use super::idle::{classify_snapshot, IdleCounter, IdlePhase, Verdict};
use super::model::PlayerAccessor;

/// Ties the idle tracker and the chat feed watcher to the alert sinks.
///
/// Both entry points ([`IdleAlert::on_game_tick`] and
/// [`IdleAlert::on_feed_alert`]) are meant to be called from the same task.
pub struct IdleAlert {
    settings: Settings,
    counter: IdleCounter,
    dispatcher: AlertDispatcher,
    subscription: Option<FeedSubscription>,
    running: bool,
}

impl IdleAlert {
    pub fn new(settings: Settings, dispatcher: AlertDispatcher) -> Self {
        Self {
            settings,
            counter: IdleCounter::new(),
            dispatcher,
            subscription: None,
            running: false,
        }
    }

    /// Start tracking and watch `feed` for the inactivity warning.
    ///
    /// `on_match` receives each matched message; it should hand it back to
    /// [`IdleAlert::on_feed_alert`] on the tick task. Without a feed the idle
    /// check still runs.
    pub fn start<F>(&mut self, feed: Option<FeedRoot>, on_match: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.counter.reset();
        self.watch_feed(feed, on_match);
        self.running = true;
        log::info!(
            "Started (activation ticks: {}, feed watch: {})",
            self.settings.activation_ticks,
            self.subscription.is_some()
        );
    }

    /// Replace the watched feed, leaving the idle count alone.
    pub fn watch_feed<F>(&mut self, feed: Option<FeedRoot>, on_match: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        if let Some(old) = self.subscription.take() {
            old.dispose();
        }
        self.subscription = watcher::subscribe(feed, on_match);
    }

    /// Stop tracking. The feed subscription is gone before this returns.
    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.dispose();
        }
        self.dispatcher.dismiss_overlay();
        self.running = false;
        log::info!("Stopped");
    }

    /// Run the idle check for one game tick. Returns the alert if one fired.
    pub fn on_game_tick(&mut self, host: &dyn PlayerAccessor) -> Option<AlertEvent> {
        if !self.running || !self.settings.enabled {
            return None;
        }
        let player = host.main_player()?;

        let remembered = self.counter.last_action();
        let verdict = classify_snapshot(player, remembered);
        let before = self.counter.phase();
        self.counter.tick(verdict);

        // Player input shows up as a fresh action: take the overlay down.
        // Only carrying on with the very same action leaves it up.
        if let Verdict::ResetCounter { last_action } = verdict {
            let carrying_on = before == IdlePhase::Acting && last_action == remembered;
            if !last_action.is_idle() && !carrying_on {
                self.dispatcher.dismiss_overlay();
            }
        }

        if self.counter.check_threshold(self.settings.activation_ticks) {
            return self.dispatcher.dispatch(
                &self.settings,
                Some(&player.name),
                AlertSource::IdleTimeout,
                IDLE_MESSAGE,
            );
        }
        None
    }

    /// Raise the alert for a matched feed message.
    pub fn on_feed_alert(&mut self, host: &dyn PlayerAccessor, message: &str) -> Option<AlertEvent> {
        if !self.running {
            return None;
        }
        let character = host.main_player().map(|p| p.name.as_str());
        self.dispatcher
            .dispatch(&self.settings, character, AlertSource::FeedMessage, message)
    }

    /// Swap in new settings. Counting carries on with the new threshold.
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn idle_ticks(&self) -> u32 {
        self.counter.idle_ticks()
    }

    pub fn phase(&self) -> IdlePhase {
        self.counter.phase()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_watching_feed(&self) -> bool {
        self.subscription.as_ref().is_some_and(FeedSubscription::is_active)
    }

    pub fn overlay_visible(&self) -> bool {
        self.dispatcher.overlay_visible()
    }
}

impl Drop for IdleAlert {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.dispose();
        }
    }
}
