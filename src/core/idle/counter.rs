use super::classifier::Verdict;
use crate::core::model::ActionState;

/// Derived position of the tracker in the idle cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdlePhase {
    /// No action since the last rest or alert.
    Resting,
    /// Doing something; the counter is at zero.
    Acting,
    /// Finished an action and accumulating idle ticks.
    CountingIdle,
}

/// Tick accumulator for the current idle episode.
#[derive(Debug, Clone, Default)]
pub struct IdleCounter {
    idle_ticks: u32,
    last_action: ActionState,
}

impl IdleCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one tick's verdict. Returns the counter afterwards.
    pub fn tick(&mut self, verdict: Verdict) -> u32 {
        let before = self.phase();

        match verdict {
            Verdict::Ignore => return self.idle_ticks,
            Verdict::ResetToIdle => {
                self.last_action = ActionState::Idle;
                self.idle_ticks = 0;
            }
            Verdict::Tick { last_action } => {
                self.last_action = last_action;
                self.idle_ticks = self.idle_ticks.saturating_add(1);
                log::debug!("idle ticks: {}", self.idle_ticks);
            }
            Verdict::ResetCounter { last_action } => {
                self.last_action = last_action;
                self.idle_ticks = 0;
            }
        }

        let after = self.phase();
        if before != after {
            log::debug!("idle phase {:?} -> {:?} (last action {:?})", before, after, self.last_action);
        }
        self.idle_ticks
    }

    /// True exactly once per crossing of `activation_ticks` (strictly greater).
    ///
    /// Firing starts a new episode: the counter drops to zero and the
    /// remembered action goes back to idle, so the same stretch of idling
    /// cannot fire again.
    pub fn check_threshold(&mut self, activation_ticks: u32) -> bool {
        if self.idle_ticks > activation_ticks {
            self.reset();
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.idle_ticks = 0;
        self.last_action = ActionState::Idle;
    }

    pub fn idle_ticks(&self) -> u32 {
        self.idle_ticks
    }

    pub fn last_action(&self) -> ActionState {
        self.last_action
    }

    pub fn phase(&self) -> IdlePhase {
        if self.last_action.is_idle() {
            IdlePhase::Resting
        } else if self.idle_ticks > 0 {
            IdlePhase::CountingIdle
        } else {
            IdlePhase::Acting
        }
    }
}
