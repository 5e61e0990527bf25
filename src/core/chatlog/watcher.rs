//! Watches the chat feed for the inactivity warning.
//!
//! [`FeedWatcher`] does the matching and remembers how far into the feed it
//! has read. [`subscribe`] runs one on a background task for as long as the
//! returned [`FeedSubscription`] lives.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

use super::feed::{EntryRole, FeedBatch, FeedRoot};
use crate::core::alerts::model::match_alert_message;

/// Matches newly appended feed entries against the alert messages.
#[derive(Debug, Default)]
pub struct FeedWatcher {
    /// Index of the first entry not processed yet.
    next_index: usize,
}

impl FeedWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the alert messages found in entries of `batch` not seen before.
    pub fn process(&mut self, batch: &FeedBatch) -> Vec<&'static str> {
        let mut matches = Vec::new();

        for (offset, entry) in batch.entries.iter().enumerate() {
            let index = batch.first_index + offset;
            if index < self.next_index {
                continue;
            }
            self.next_index = index + 1;

            if entry.role != EntryRole::ListItem {
                continue;
            }
            let Some(text) = entry.message_text.as_deref() else {
                continue;
            };
            if let Some(message) = match_alert_message(text.trim()) {
                matches.push(message);
            }
        }

        matches
    }

    pub fn seen(&self) -> usize {
        self.next_index
    }
}

/// Handle to a running feed subscription.
///
/// Dropping it has the same effect as [`FeedSubscription::dispose`].
#[derive(Debug)]
pub struct FeedSubscription {
    /// Held across every callback; `false` once disposed.
    open: Arc<Mutex<bool>>,
    task: JoinHandle<()>,
}

/// Start watching `root`, calling `callback` with each matched message.
///
/// Returns `None` when there is no feed to watch or no tokio runtime to run
/// the watcher on.
pub fn subscribe<F>(root: Option<FeedRoot>, mut callback: F) -> Option<FeedSubscription>
where
    F: FnMut(&str) + Send + 'static,
{
    let Some(mut root) = root else {
        log::debug!("No chat feed available, inactivity warnings will not be watched");
        return None;
    };
    let runtime = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(e) => {
            log::debug!("Cannot watch chat feed: {}", e);
            return None;
        }
    };

    let open = Arc::new(Mutex::new(true));
    let task_open = Arc::clone(&open);

    let task = runtime.spawn(async move {
        let mut watcher = FeedWatcher::new();
        while let Some(batch) = root.next_batch().await {
            for message in watcher.process(&batch) {
                let open = task_open.lock().unwrap_or_else(PoisonError::into_inner);
                if !*open {
                    return;
                }
                callback(message);
            }
        }
        log::debug!("Chat feed closed after {} entries", watcher.seen());
    });

    Some(FeedSubscription { open, task })
}

impl FeedSubscription {
    /// Stop watching. No callback runs after this returns.
    pub fn dispose(self) {
        self.close();
    }

    pub fn is_active(&self) -> bool {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner) && !self.task.is_finished()
    }

    fn close(&self) {
        // Waits for an in-flight callback to finish before flipping the flag.
        *self.open.lock().unwrap_or_else(PoisonError::into_inner) = false;
        self.task.abort();
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.close();
    }
}
