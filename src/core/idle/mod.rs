//! Idle detection for the main player.
//!
//! - classifier.rs: turns a tick sample into a verdict
//! - counter.rs: accumulates verdicts and decides when the player went idle

pub mod classifier;
pub mod counter;

pub use classifier::{classify, classify_snapshot, Verdict};
pub use counter::{IdleCounter, IdlePhase};
