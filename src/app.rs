use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

use crate::core::{
    alerts::{
        dispatcher::AlertDispatcher,
        sinks::{DesktopNotifier, IdleOverlay, RodioPlayer},
    },
    config::{ConfigManager, Settings},
    coordinator::IdleAlert,
    model::{HostMessage, PlayerSnapshot},
    tracker::TrackedChatlog,
};

const CHATLOG_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A feed match, tagged with the chat log watch that produced it.
#[derive(Debug)]
struct FeedAlert {
    generation: u64,
    message: String,
}

impl FeedAlert {
    fn is_from(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

/// Open the configured chat log and point the core's feed watch at it.
///
/// Matches are sent to `alert_tx` tagged with `generation`, so the main loop
/// can drop anything still queued from a watch that has since been replaced.
fn watch_chatlog(
    core: &mut IdleAlert,
    path: Option<&Path>,
    generation: u64,
    alert_tx: &mpsc::UnboundedSender<FeedAlert>,
) -> Option<TrackedChatlog> {
    let (tracked, root) = match TrackedChatlog::open_optional(path) {
        Some((tracked, root)) => (Some(tracked), Some(root)),
        None => (None, None),
    };
    let tx = alert_tx.clone();
    let on_match = move |message: &str| {
        let _ = tx.send(FeedAlert {
            generation,
            message: message.to_string(),
        });
    };

    if core.is_running() {
        core.watch_feed(root, on_match);
    } else {
        core.start(root, on_match);
    }
    tracked
}

/// Apply a keyed setting change, persist it and hand it to the core.
///
/// Returns true when the chat log path changed.
fn apply_setting(
    core: &mut IdleAlert,
    config_manager: &ConfigManager,
    key: &str,
    value: &serde_json::Value,
) -> bool {
    let mut settings: Settings = core.settings().clone();
    if let Err(e) = settings.apply(key, value) {
        log::warn!("Ignoring setting change: {}", e);
        return false;
    }
    if let Err(e) = config_manager.save(&settings) {
        log::warn!("Failed to save settings: {}", e);
    }

    let chatlog_changed = settings.chatlog_path != core.settings().chatlog_path;
    log::info!("Setting {} updated", key);
    core.update_settings(settings);
    chatlog_changed
}

/// Run the idle alert against a host speaking the JSON-lines protocol on stdin.
///
/// Returns when the host sends `stop`, closes stdin, or on Ctrl+C.
pub async fn run(config_dir: PathBuf) -> io::Result<()> {
    let dispatcher = AlertDispatcher::new(
        Box::new(RodioPlayer::new()),
        Box::new(DesktopNotifier::new()),
        Box::new(IdleOverlay::new()),
    );
    serve(ConfigManager::new(config_dir), dispatcher, tokio::io::stdin()).await
}

async fn serve<R>(config_manager: ConfigManager, dispatcher: AlertDispatcher, input: R) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let settings = config_manager.load();
    let initial_chatlog = settings.chatlog_path.clone();
    let mut core = IdleAlert::new(settings, dispatcher);

    let (alert_tx, mut alert_rx) = mpsc::unbounded_channel::<FeedAlert>();
    let mut generation: u64 = 0;
    let mut chatlog = watch_chatlog(&mut core, initial_chatlog.as_deref(), generation, &alert_tx);

    let mut latest: Option<PlayerSnapshot> = None;
    // Raw segments rather than `lines()`: a line that is not UTF-8 is just a
    // malformed message, not the end of the session.
    let mut lines = BufReader::new(input).split(b'\n');
    let mut poll = tokio::time::interval(CHATLOG_POLL_INTERVAL);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            segment = lines.next_segment() => {
                let Some(bytes) = segment? else {
                    log::info!("Host closed the input stream");
                    break;
                };
                let line = String::from_utf8_lossy(&bytes);
                if line.trim().is_empty() {
                    continue;
                }
                match HostMessage::parse(&line) {
                    Ok(HostMessage::Tick { player }) => {
                        latest = player;
                        core.on_game_tick(&latest);
                    }
                    Ok(HostMessage::Setting { key, value }) => {
                        if apply_setting(&mut core, &config_manager, &key, &value) {
                            let path = core.settings().chatlog_path.clone();
                            generation += 1;
                            chatlog = watch_chatlog(&mut core, path.as_deref(), generation, &alert_tx);
                        }
                    }
                    Ok(HostMessage::Stop) => break,
                    Err(e) => log::warn!("Ignoring malformed host message: {}", e),
                }
            }
            Some(alert) = alert_rx.recv() => {
                if alert.is_from(generation) {
                    core.on_feed_alert(&latest, &alert.message);
                } else {
                    log::debug!("Dropping match from a replaced chat log: {}", alert.message);
                }
            }
            _ = poll.tick(), if chatlog.is_some() => {
                if let Some(tracked) = chatlog.as_mut() {
                    if let Err(e) = tracked.poll() {
                        log::warn!("Error reading chat log {:?}: {}", tracked.path(), e);
                    }
                }
            }
            _ = &mut shutdown => {
                log::info!("Interrupted");
                break;
            }
        }
    }

    core.stop();
    Ok(())
}
