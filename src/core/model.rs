use serde::{Deserialize, Serialize};

/// What the character is doing this tick, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    #[default]
    Idle,
    Moving,
    Banking,
    ClimbSameMapLevel,
    GoThroughDoor,
    PlayerLoggingOut,
    PlayerDead,
    Stunned,
    Trading,
    Fishing,
    Mining,
    Woodcutting,
    Harvesting,
    Cooking,
    Smelting,
    Smithing,
    Crafting,
    Potioning,
    MeleeCombat,
    RangeCombat,
    MagicCombat,
    Shopping,
    /// Any host state without a named variant, keyed by its numeric id.
    Other(u16),
}

/// States that never touch the idle counter or the remembered action.
pub const IGNORED_STATES: &[ActionState] = &[
    ActionState::Banking,
    ActionState::ClimbSameMapLevel,
    ActionState::GoThroughDoor,
    ActionState::PlayerLoggingOut,
    ActionState::PlayerDead,
    ActionState::Stunned,
    ActionState::Trading,
];

impl ActionState {
    pub fn is_ignored(self) -> bool {
        IGNORED_STATES.contains(&self)
    }

    pub fn is_idle(self) -> bool {
        self == Self::Idle
    }
}

/// One sample of the main player, taken by the host once per game tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub name: String,
    #[serde(default)]
    pub state: ActionState,
    #[serde(default)]
    pub is_moving: bool,
    #[serde(default)]
    pub has_target: bool,
}

/// Read-only view of the host's main player.
///
/// `None` means the character is not loaded (login screen, zoning, ...).
pub trait PlayerAccessor {
    fn main_player(&self) -> Option<&PlayerSnapshot>;
}

impl PlayerAccessor for Option<PlayerSnapshot> {
    fn main_player(&self) -> Option<&PlayerSnapshot> {
        self.as_ref()
    }
}

impl PlayerAccessor for PlayerSnapshot {
    fn main_player(&self) -> Option<&PlayerSnapshot> {
        Some(self)
    }
}

/// Messages the host writes to us, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    /// A game tick elapsed.
    Tick {
        #[serde(default)]
        player: Option<PlayerSnapshot>,
    },
    /// The user changed a setting.
    Setting {
        key: String,
        value: serde_json::Value,
    },
    Stop,
}

impl HostMessage {
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }
}
