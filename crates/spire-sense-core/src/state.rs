//! Listener state shared by the detector, the menu check and the wait engine.
//!
//! All of it lives in one [`ListenerState`] value owned by whoever drives the
//! tick loop. Nothing here is global.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::host::{GameHost, RoomPhase, Screen};

/// What the dungeon looked like at the last declared command boundary.
///
/// Only replaced when a boundary is declared, with one exception: the
/// out-of-combat debounce stores the new screen fields a tick early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// `None` until the first boundary of a run.
    pub screen: Option<Screen>,
    pub screen_up: bool,
    pub phase: Option<RoomPhase>,
    pub grid_confirm_up: bool,
    pub gold: i32,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::initial(Self::INITIAL_GOLD)
    }
}

impl Snapshot {
    /// Gold a fresh run starts with.
    pub const INITIAL_GOLD: i32 = 99;

    pub fn initial(gold: i32) -> Self {
        Self {
            screen: None,
            screen_up: false,
            phase: None,
            grid_confirm_up: false,
            gold,
        }
    }

    /// Read every tracked field from the host.
    pub fn capture(host: &impl GameHost) -> Self {
        Self {
            screen: Some(host.screen()),
            screen_up: host.is_screen_up(),
            phase: host.room_phase(),
            grid_confirm_up: host.grid_confirm_up(),
            gold: host.player_gold(),
        }
    }

    /// Whether screen identity, screen visibility or room phase differ.
    pub fn screen_differs(&self, screen: Screen, screen_up: bool, phase: Option<RoomPhase>) -> bool {
        self.screen != Some(screen) || self.screen_up != screen_up || self.phase != phase
    }
}

/// A condition the controller can ask the listener to wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitCondition {
    /// Not waiting for anything
    None,
    /// Waiting for `in_dungeon == target`
    InGame,
    /// Waiting for `in_combat == target`
    InCombat,
    /// Waiting for the main menu
    MainMenu,
    /// Waiting for fades, screen swaps and wait timers to settle
    VisualStable,
}

impl WaitCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::InGame => "in_game",
            Self::InCombat => "in_combat",
            Self::MainMenu => "main_menu",
            Self::VisualStable => "visual_stable",
        }
    }
}

impl std::fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WaitCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "in_game" | "in-game" | "ingame" => Ok(Self::InGame),
            "in_combat" | "in-combat" | "incombat" => Ok(Self::InCombat),
            "main_menu" | "main-menu" | "menu" => Ok(Self::MainMenu),
            "visual_stable" | "visual-stable" | "visual" => Ok(Self::VisualStable),
            _ => Err(format!(
                "Unknown wait condition '{}'. Use: in_game, in_combat, main_menu, visual_stable",
                s
            )),
        }
    }
}

/// The condition currently armed, with its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArmedWait {
    #[default]
    None,
    InGame { target: bool },
    InCombat { target: bool },
    MainMenu,
    VisualStable { started_at: Instant },
}

impl ArmedWait {
    pub fn condition(&self) -> WaitCondition {
        match self {
            Self::None => WaitCondition::None,
            Self::InGame { .. } => WaitCondition::InGame,
            Self::InCombat { .. } => WaitCondition::InCombat,
            Self::MainMenu => WaitCondition::MainMenu,
            Self::VisualStable { .. } => WaitCondition::VisualStable,
        }
    }

    pub fn is_armed(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Every flag the listener keeps between ticks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListenerState {
    pub snapshot: Snapshot,
    /// Something outside a controller command changed the game
    pub external_change: bool,
    /// Set between turn start and turn end signals
    pub my_turn: bool,
    /// Detection suspended until resumed
    pub blocked: bool,
    /// Ready to receive the next controller command
    pub waiting_for_command: bool,
    /// The main menu has already been reported since leaving the dungeon
    pub presented_out_of_game_state: bool,
    /// Out-of-combat screen change seen; declare on the next quiet tick
    pub wait_one_update: bool,
    /// Ticks left before a boundary is forced; zero when disarmed
    pub timeout: u32,
    pub wait: ArmedWait,
    pub last_error: Option<String>,
    /// Report ready once even if nothing changed
    pub force_ready_on_next_send: bool,
}

impl ListenerState {
    pub fn new(initial_gold: i32) -> Self {
        Self {
            snapshot: Snapshot::initial(initial_gold),
            ..Self::default()
        }
    }
}
