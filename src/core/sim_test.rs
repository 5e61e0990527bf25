// End-to-end tick simulations through the coordinator with recording sinks.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use super::alerts::dispatcher::testing::{recording_dispatcher, Log};
use super::alerts::model::{AlertSource, ALERT_MESSAGES};
use super::chatlog::feed::{self, FeedEntry};
use super::config::Settings;
use super::coordinator::IdleAlert;
use super::idle::IdlePhase;
use super::model::{ActionState, PlayerSnapshot, IGNORED_STATES};

fn snapshot(state: ActionState, is_moving: bool, has_target: bool) -> Option<PlayerSnapshot> {
    Some(PlayerSnapshot {
        name: "Felix".to_string(),
        state,
        is_moving,
        has_target,
    })
}

fn working() -> Option<PlayerSnapshot> {
    snapshot(ActionState::Woodcutting, false, true)
}

fn idle() -> Option<PlayerSnapshot> {
    snapshot(ActionState::Idle, false, false)
}

fn core_with(activation_ticks: u32) -> (IdleAlert, Log) {
    let (dispatcher, log) = recording_dispatcher(false);
    let settings = Settings {
        activation_ticks,
        ..Settings::default()
    };
    let mut core = IdleAlert::new(settings, dispatcher);
    core.start(None, |_| {});
    (core, log)
}

#[test]
fn sim_alert_after_activation_plus_one_idle_ticks() {
    for activation in [1_u32, 3, 20] {
        let (mut core, log) = core_with(activation);
        core.on_game_tick(&working());

        for tick in 1..=activation {
            assert!(core.on_game_tick(&idle()).is_none(), "fired early at tick {}", tick);
            assert_eq!(core.idle_ticks(), tick);
        }

        let event = core.on_game_tick(&idle()).expect("Should fire on tick N+1");
        assert_eq!(event.source, AlertSource::IdleTimeout);
        assert_eq!(event.message, "is Idle!");
        assert_eq!(core.idle_ticks(), 0);
        assert_eq!(core.phase(), IdlePhase::Resting);
        assert_eq!(log.borrow().sounds.len(), 1);
    }
}

#[test]
fn sim_one_alert_per_episode() {
    let (mut core, log) = core_with(2);
    core.on_game_tick(&working());

    let fired = (0..50).filter(|_| core.on_game_tick(&idle()).is_some()).count();
    assert_eq!(fired, 1);
    assert_eq!(log.borrow().sounds.len(), 1);

    // A new action starts a new episode.
    core.on_game_tick(&working());
    let fired = (0..50).filter(|_| core.on_game_tick(&idle()).is_some()).count();
    assert_eq!(fired, 1);
}

#[test]
fn sim_ignored_states_are_transparent() {
    let (mut core, log) = core_with(3);
    core.on_game_tick(&working());
    core.on_game_tick(&idle());
    core.on_game_tick(&idle());
    assert_eq!(core.idle_ticks(), 2);

    for state in IGNORED_STATES {
        for (moving, target) in [(false, false), (true, false), (false, true)] {
            assert!(core.on_game_tick(&snapshot(*state, moving, target)).is_none());
            assert_eq!(core.idle_ticks(), 2, "{:?} changed the counter", state);
        }
    }
    assert!(log.borrow().sounds.is_empty());

    // The remembered action survived: idling resumes where it left off.
    core.on_game_tick(&idle());
    assert!(core.on_game_tick(&idle()).is_some());
}

#[test]
fn sim_only_ignored_states_never_alert() {
    let (mut core, log) = core_with(0);
    for i in 0..100 {
        let state = IGNORED_STATES[i % IGNORED_STATES.len()];
        assert!(core.on_game_tick(&snapshot(state, i % 2 == 0, false)).is_none());
        assert_eq!(core.idle_ticks(), 0);
    }
    assert!(log.borrow().sounds.is_empty());
}

#[test]
fn sim_walking_idle_resets_everything() {
    let (mut core, log) = core_with(5);
    core.on_game_tick(&working());
    for _ in 0..4 {
        core.on_game_tick(&idle());
    }
    assert_eq!(core.idle_ticks(), 4);

    core.on_game_tick(&snapshot(ActionState::Idle, true, false));
    assert_eq!(core.idle_ticks(), 0);
    assert_eq!(core.phase(), IdlePhase::Resting);

    // Standing still afterwards is rest, not idling after an action.
    for _ in 0..20 {
        assert!(core.on_game_tick(&idle()).is_none());
    }
    assert!(log.borrow().sounds.is_empty());
}

#[test]
fn sim_target_keeps_counter_at_zero() {
    let (mut core, _log) = core_with(1);
    core.on_game_tick(&working());
    for _ in 0..10 {
        assert!(core.on_game_tick(&snapshot(ActionState::Idle, false, true)).is_none());
        assert_eq!(core.idle_ticks(), 0);
    }
    assert_eq!(core.phase(), IdlePhase::Acting);
}

#[test]
fn sim_threshold_change_applies_mid_episode() {
    let (mut core, _log) = core_with(20);
    core.on_game_tick(&working());
    for _ in 0..5 {
        core.on_game_tick(&idle());
    }

    let mut settings = core.settings().clone();
    settings.activation_ticks = 5;
    core.update_settings(settings);

    assert!(core.on_game_tick(&idle()).is_some());
}

#[tokio::test]
async fn sim_feed_warning_dispatches_once_and_stops_cleanly() {
    let (dispatcher, log) = recording_dispatcher(false);
    let settings = Settings {
        notification: false,
        idle_overlay: false,
        volume: 40,
        ..Settings::default()
    };
    let mut core = IdleAlert::new(settings, dispatcher);

    let (mut feed, root) = feed::channel();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    core.start(Some(root), move |m| {
        let _ = tx.send(m.to_string());
    });
    assert!(core.is_watching_feed());

    let warning = ALERT_MESSAGES[0];
    feed.append(vec![
        FeedEntry::message(format!("  {}\n", warning)),
        FeedEntry::message(warning.to_lowercase()),
        FeedEntry::other(),
    ]);

    let host = working();
    let message = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("Warning should arrive")
        .expect("Channel open");
    assert!(core.on_feed_alert(&host, &message).is_some());

    {
        let log = log.borrow();
        assert_eq!(log.sounds.len(), 1);
        assert!((log.sounds[0].1 - 0.4).abs() < 1e-6);
        assert!(log.notifications.is_empty());
        assert_eq!(log.overlay_shows, 0);
    }

    core.stop();
    assert!(!core.is_watching_feed());
    feed.append(vec![FeedEntry::message(warning)]);
    tokio::time::sleep(Duration::from_millis(50)).await;

    while let Ok(message) = rx.try_recv() {
        assert!(core.on_feed_alert(&host, &message).is_none());
    }
    assert_eq!(log.borrow().sounds.len(), 1, "No dispatch after stop");
}
