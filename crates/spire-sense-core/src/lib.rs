//! # spire-sense-core
//!
//! Decides, tick by tick, when a running Slay the Spire game has settled
//! enough to be snapshotted and handed to an external controller.
//!
//! The game state never stops moving: fades, queued actions, screens that
//! open in two waves and event timers all look like change without the game
//! being ready for input. This crate observes that state through a read-only
//! [`GameHost`] and reports a command boundary only once it is stable.
//!
//! ## Modules
//!
//! - [`host`] - Read-only game surface and the plain-data [`GameFrame`]
//! - [`state`] - Change snapshot and listener flags
//! - [`detector`] - Dungeon stability detection
//! - [`menu`] - Main menu entry check
//! - [`wait`] - One-shot wait conditions
//! - [`visual`] - Visual stability predicate
//! - [`listener`] - Controller-facing facade and tick driver
//! - [`shared`] - Single-lock access for a controller thread
//! - [`relay`] - Subprocess stderr relay
//! - [`clock`] - Time sources for the visual-stability timeout
//! - [`config`] - Listener tunables
//! - [`error`] - Error types and Result alias
//!
//! ## Example
//!
//! ```no_run
//! use spire_sense_core::{GameFrame, GameStateListener, WaitCondition};
//!
//! let mut listener = GameStateListener::new();
//! listener.set_wait_condition(WaitCondition::InGame, true);
//!
//! // Called from the game's update hook with the live state.
//! let frame = GameFrame::combat();
//! if listener.update(&frame).should_send() && listener.is_waiting_for_command() {
//!     let error = listener.get_and_clear_error();
//!     println!("send state (error: {:?})", error);
//! }
//! ```

pub mod clock;
pub mod config;
pub mod detector;
pub mod error;
pub mod host;
pub mod listener;
pub mod menu;
pub mod relay;
pub mod shared;
pub mod state;
pub mod visual;
pub mod wait;

// Error types
pub use error::{Error, Result};

// Host surface
pub use host::{
    ActionManagerView, ActionPhase, GameFrame, GameHost, GameMode, RoomKind, RoomPhase, RoomView,
    Screen,
};

// Listener state
pub use state::{ArmedWait, ListenerState, Snapshot, WaitCondition};

// Listener facade
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ListenerConfig;
pub use listener::{GameStateListener, TickOutcome};
pub use shared::{ReadinessReport, SharedListener};

// Checks
pub use visual::are_visual_effects_stable;

// Log relay
pub use relay::LogRelay;
