use std::io;
use std::path::Path;

use super::chatlog::feed::{self, Feed, FeedRoot};
use super::chatlog::parser;
use super::log_io;

/// A chat log being tailed into a feed.
pub struct TrackedChatlog {
    tailer: log_io::LogTailer,
    feed: Feed,
}

impl TrackedChatlog {
    /// Start tailing `path`. The returned root is what the feed watcher subscribes to.
    pub fn open(path: impl AsRef<Path>) -> io::Result<(Self, FeedRoot)> {
        let tailer = log_io::LogTailer::open(path)?;
        let (feed, root) = feed::channel();
        Ok((Self { tailer, feed }, root))
    }

    /// Like [`TrackedChatlog::open`], but a missing or unreadable log just means no feed.
    pub fn open_optional(path: Option<&Path>) -> Option<(Self, FeedRoot)> {
        let path = path?;
        match Self::open(path) {
            Ok(tracked) => {
                log::info!("Watching chat log {:?}", path);
                Some(tracked)
            }
            Err(e) => {
                log::debug!("Chat log {:?} not available: {}", path, e);
                None
            }
        }
    }

    /// Read newly written lines and append them to the feed.
    /// Returns how many entries were appended.
    pub fn poll(&mut self) -> io::Result<usize> {
        let lines = self.tailer.read_new_lines()?;
        if lines.is_empty() {
            return Ok(0);
        }
        let entries = parser::to_entries(&lines);
        let count = entries.len();
        if !self.feed.append(entries) {
            log::debug!("Chat feed for {:?} has no subscriber", self.tailer.path());
        }
        Ok(count)
    }

    pub fn path(&self) -> &Path {
        self.tailer.path()
    }
}
