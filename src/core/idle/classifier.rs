// Per-tick classification of the player's state for idle counting.
//
// Raw `Idle` also shows up for a tick or two between inputs, so only an idle
// reached after a real action (and not while walking with nothing targeted)
// is allowed to accumulate.

use crate::core::model::{ActionState, PlayerSnapshot};

/// What a single tick does to the idle tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Non-interruptible state: leave everything untouched.
    Ignore,
    /// Walking around with nothing targeted: genuine rest, forget the last action.
    ResetToIdle,
    /// Sitting idle after finishing `last_action`.
    Tick { last_action: ActionState },
    /// Busy (or targeting something): zero the counter, remember `last_action`.
    ResetCounter { last_action: ActionState },
}

/// Classify one tick.
///
/// `remembered` is the last non-idle action seen before this tick.
pub fn classify(
    current: ActionState,
    is_moving: bool,
    has_target: bool,
    remembered: ActionState,
) -> Verdict {
    if current.is_ignored() {
        return Verdict::Ignore;
    }

    if is_moving && !has_target && current.is_idle() {
        return Verdict::ResetToIdle;
    }

    let last_action = if current.is_idle() { remembered } else { current };

    if current.is_idle() && !last_action.is_idle() && !has_target {
        Verdict::Tick { last_action }
    } else {
        Verdict::ResetCounter { last_action }
    }
}

/// Convenience wrapper over [`classify`] for a host snapshot.
pub fn classify_snapshot(player: &PlayerSnapshot, remembered: ActionState) -> Verdict {
    classify(player.state, player.is_moving, player.has_target, remembered)
}
