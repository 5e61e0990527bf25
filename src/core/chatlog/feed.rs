//! Append-only chat feed.
//!
//! The producer side ([`Feed`]) appends batches of entries; the consumer side
//! ([`FeedRoot`]) is what a subscription listens on. Every batch carries the
//! index of its first entry so consumers can tell new entries from old ones.

use tokio::sync::mpsc;

/// Structural role of a feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRole {
    /// A chat list item. Only these can carry alert text.
    ListItem,
    /// Headers, separators, anything else.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub role: EntryRole,
    /// Content of the nested message-text region, untrimmed.
    pub message_text: Option<String>,
}

impl FeedEntry {
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            role: EntryRole::ListItem,
            message_text: Some(text.into()),
        }
    }

    pub fn other() -> Self {
        Self {
            role: EntryRole::Other,
            message_text: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedBatch {
    /// Position of `entries[0]` in the whole feed.
    pub first_index: usize,
    pub entries: Vec<FeedEntry>,
}

/// Producer half of the feed.
#[derive(Debug)]
pub struct Feed {
    tx: mpsc::UnboundedSender<FeedBatch>,
    len: usize,
}

/// Consumer half of the feed, handed to [`super::watcher::subscribe`].
#[derive(Debug)]
pub struct FeedRoot {
    rx: mpsc::UnboundedReceiver<FeedBatch>,
}

/// Create a connected feed.
pub fn channel() -> (Feed, FeedRoot) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Feed { tx, len: 0 }, FeedRoot { rx })
}

impl Feed {
    /// Append entries as one batch.
    ///
    /// Returns false once nobody is listening any more. Entries still count
    /// towards the feed length either way.
    pub fn append(&mut self, entries: Vec<FeedEntry>) -> bool {
        if entries.is_empty() {
            return !self.tx.is_closed();
        }
        let batch = FeedBatch {
            first_index: self.len,
            entries,
        };
        self.len += batch.entries.len();
        self.tx.send(batch).is_ok()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl FeedRoot {
    /// Wait for the next batch. `None` once the producer is gone.
    pub async fn next_batch(&mut self) -> Option<FeedBatch> {
        self.rx.recv().await
    }
}
