//! Read-only view of the running game.
//!
//! The detector never owns game objects. Everything it needs is queried
//! once per tick through [`GameHost`], which the embedding layer implements
//! on top of the live dungeon. [`GameFrame`] is a plain-data implementation
//! used for recorded scenarios and tests.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which overlay the dungeon is currently presenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Screen {
    #[default]
    None,
    MasterDeckView,
    GameDeckView,
    DiscardView,
    ExhaustView,
    Settings,
    InputSettings,
    Map,
    Ftue,
    CombatReward,
    CardReward,
    BossReward,
    HandSelect,
    Grid,
    Shop,
    Transform,
    Death,
    Victory,
    Unlock,
    NeowUnlock,
    DoorUnlock,
    Credits,
    NoInteract,
}

impl Screen {
    /// Overlays during which no input is accepted at all.
    pub fn is_non_interactive(&self) -> bool {
        matches!(self, Self::DoorUnlock | Self::NoInteract)
    }
}

/// Coarse mode of the current room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomPhase {
    Combat,
    Event,
    Complete,
    Incomplete,
}

/// What sort of room the player is standing in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum RoomKind {
    /// `?` rooms driven by an event script
    Event,
    /// The opening room with Neow
    Neow,
    /// Post-boss victory room; `heart` marks the Act 4 variant that runs an event
    Victory { heart: bool },
    #[default]
    Other,
}

impl RoomKind {
    /// Rooms whose state is driven by an event with its own wait timer.
    pub fn runs_event(&self) -> bool {
        matches!(self, Self::Event | Self::Neow | Self::Victory { heart: true })
    }

    /// Event and Neow rooms only; the heart victory room is not included.
    pub fn is_event_like(&self) -> bool {
        matches!(self, Self::Event | Self::Neow)
    }
}

/// Snapshot of the current room.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomView {
    #[serde(default)]
    pub kind: RoomKind,
    pub phase: RoomPhase,
    /// Wait timer of the room's event, if the room has one.
    #[serde(default)]
    pub event_wait_timer: Option<f32>,
}

impl RoomView {
    pub fn new(kind: RoomKind, phase: RoomPhase) -> Self {
        Self {
            kind,
            phase,
            event_wait_timer: None,
        }
    }

    pub fn with_event_wait_timer(mut self, timer: f32) -> Self {
        self.event_wait_timer = Some(timer);
        self
    }

    pub fn in_combat(&self) -> bool {
        self.phase == RoomPhase::Combat
    }
}

/// Phase of the action manager that resolves queued effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionPhase {
    #[default]
    WaitingOnUser,
    ExecutingActions,
}

/// Queue state of the action manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionManagerView {
    pub phase: ActionPhase,
    pub pre_turn_actions: usize,
    pub actions: usize,
    pub card_queue: usize,
}

impl ActionManagerView {
    /// Waiting on the user with nothing queued or in flight.
    ///
    /// Pre-turn actions are not considered here.
    pub fn is_waiting_on_user(&self) -> bool {
        self.phase == ActionPhase::WaitingOnUser && self.actions == 0 && self.card_queue == 0
    }

    /// Like [`is_waiting_on_user`](Self::is_waiting_on_user), and the pre-turn queue is empty too.
    pub fn is_idle(&self) -> bool {
        self.is_waiting_on_user() && self.pre_turn_actions == 0
    }
}

/// Top-level application mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameMode {
    CharSelect,
    Gameplay,
    DungeonTransition,
    Splash,
}

/// Queries the detector makes against the running game each tick.
pub trait GameHost {
    /// Whether a run is in progress (the player is inside a dungeon).
    fn in_dungeon(&self) -> bool;

    fn screen(&self) -> Screen;

    fn is_screen_up(&self) -> bool;

    fn room(&self) -> Option<RoomView>;

    /// Shared room wait timer (`AbstractRoom.waitTimer`).
    fn room_wait_timer(&self) -> f32;

    fn is_fading_in(&self) -> bool;

    fn is_fading_out(&self) -> bool;

    /// Internal dungeon fade timer.
    ///
    /// Not every host can read it; the default reports it as unavailable and
    /// callers skip the check.
    fn fade_timer(&self) -> Result<f32> {
        Err(Error::CapabilityUnavailable("fade_timer"))
    }

    fn screen_swap(&self) -> bool;

    fn action_manager(&self) -> ActionManagerView;

    fn player_gold(&self) -> i32;

    fn end_turn_queued(&self) -> bool;

    fn monsters_basically_dead(&self) -> bool;

    /// Whether the grid select screen's confirm overlay is up.
    fn grid_confirm_up(&self) -> bool;

    /// `None` while the game is still booting.
    fn game_mode(&self) -> Option<GameMode>;

    fn main_menu_present(&self) -> bool;

    fn loading_save(&self) -> bool;

    fn screen_timer(&self) -> f32;

    fn is_fading(&self) -> bool {
        self.is_fading_in() || self.is_fading_out()
    }

    fn room_phase(&self) -> Option<RoomPhase> {
        self.room().map(|room| room.phase)
    }

    fn in_combat(&self) -> bool {
        self.room_phase() == Some(RoomPhase::Combat)
    }
}

/// One tick's worth of observed game state as plain data.
///
/// Missing fields deserialize to their idle defaults, so recorded scenarios
/// only need to spell out what differs from a quiet menu.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameFrame {
    pub in_dungeon: bool,
    pub screen: Screen,
    pub screen_up: bool,
    pub room: Option<RoomView>,
    pub room_wait_timer: f32,
    pub fading_in: bool,
    pub fading_out: bool,
    /// `None` when the fade timer cannot be read.
    pub fade_timer: Option<f32>,
    pub screen_swap: bool,
    pub action_manager: ActionManagerView,
    pub gold: i32,
    pub end_turn_queued: bool,
    pub monsters_basically_dead: bool,
    pub grid_confirm_up: bool,
    pub game_mode: Option<GameMode>,
    pub main_menu_present: bool,
    pub loading_save: bool,
    pub screen_timer: f32,
}

impl GameFrame {
    /// Character select with the main menu loaded.
    pub fn main_menu() -> Self {
        Self {
            game_mode: Some(GameMode::CharSelect),
            main_menu_present: true,
            ..Self::default()
        }
    }

    /// Inside a dungeon, standing in a room of the given kind and phase.
    pub fn in_room(kind: RoomKind, phase: RoomPhase) -> Self {
        Self {
            in_dungeon: true,
            room: Some(RoomView::new(kind, phase)),
            game_mode: Some(GameMode::Gameplay),
            gold: 99,
            fade_timer: Some(0.0),
            ..Self::default()
        }
    }

    /// Inside a combat room.
    pub fn combat() -> Self {
        Self::in_room(RoomKind::Other, RoomPhase::Combat)
    }

    pub fn with_screen(mut self, screen: Screen, up: bool) -> Self {
        self.screen = screen;
        self.screen_up = up;
        self
    }
}

impl GameHost for GameFrame {
    fn in_dungeon(&self) -> bool {
        self.in_dungeon
    }

    fn screen(&self) -> Screen {
        self.screen
    }

    fn is_screen_up(&self) -> bool {
        self.screen_up
    }

    fn room(&self) -> Option<RoomView> {
        self.room
    }

    fn room_wait_timer(&self) -> f32 {
        self.room_wait_timer
    }

    fn is_fading_in(&self) -> bool {
        self.fading_in
    }

    fn is_fading_out(&self) -> bool {
        self.fading_out
    }

    fn fade_timer(&self) -> Result<f32> {
        self.fade_timer
            .ok_or(Error::CapabilityUnavailable("fade_timer"))
    }

    fn screen_swap(&self) -> bool {
        self.screen_swap
    }

    fn action_manager(&self) -> ActionManagerView {
        self.action_manager
    }

    fn player_gold(&self) -> i32 {
        self.gold
    }

    fn end_turn_queued(&self) -> bool {
        self.end_turn_queued
    }

    fn monsters_basically_dead(&self) -> bool {
        self.monsters_basically_dead
    }

    fn grid_confirm_up(&self) -> bool {
        self.grid_confirm_up
    }

    fn game_mode(&self) -> Option<GameMode> {
        self.game_mode
    }

    fn main_menu_present(&self) -> bool {
        self.main_menu_present
    }

    fn loading_save(&self) -> bool {
        self.loading_save
    }

    fn screen_timer(&self) -> f32 {
        self.screen_timer
    }
}
