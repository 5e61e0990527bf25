//! Chat feed plumbing.
//!
//! This module turns a chat log into an append-only feed and watches that
//! feed for the inactivity warning.

pub mod feed;
pub mod parser;
pub mod watcher;
