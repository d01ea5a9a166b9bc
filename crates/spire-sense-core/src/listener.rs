//! The listener facade driven by the host's per-tick update.
//!
//! # Example
//!
//! ```
//! use spire_sense_core::{GameFrame, GameStateListener, Screen};
//!
//! let mut listener = GameStateListener::new();
//! listener.reset();
//! listener.signal_turn_start();
//!
//! let frame = GameFrame::combat().with_screen(Screen::HandSelect, true);
//! let outcome = listener.update(&frame);
//!
//! assert!(outcome.state_changed);
//! assert!(listener.is_waiting_for_command());
//! ```

use crate::clock::{Clock, SystemClock};
use crate::config::ListenerConfig;
use crate::host::GameHost;
use crate::state::{ListenerState, WaitCondition};

/// What one tick decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// The stability detector or menu check declared a boundary
    pub state_changed: bool,
    /// An armed wait condition resolved
    pub wait_condition_met: bool,
}

impl TickOutcome {
    /// Whether the boundary layer should send a state snapshot this tick.
    pub fn should_send(&self) -> bool {
        self.state_changed || self.wait_condition_met
    }
}

/// Owns the listener state and exposes the controller-facing operations.
#[derive(Debug)]
pub struct GameStateListener<C: Clock = SystemClock> {
    state: ListenerState,
    config: ListenerConfig,
    clock: C,
}

impl Default for GameStateListener<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStateListener<SystemClock> {
    pub fn new() -> Self {
        Self::with_config(ListenerConfig::default())
    }

    pub fn with_config(config: ListenerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> GameStateListener<C> {
    pub fn with_clock(config: ListenerConfig, clock: C) -> Self {
        Self {
            state: ListenerState::new(config.initial_gold),
            config,
            clock,
        }
    }

    pub fn state(&self) -> &ListenerState {
        &self.state
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Run one tick: the dungeon detector or the menu check, then the armed
    /// wait condition if there is one.
    pub fn update(&mut self, host: &impl GameHost) -> TickOutcome {
        let state_changed = if host.in_dungeon() {
            self.check_for_dungeon_state_change(host)
        } else {
            self.state.my_turn = false;
            self.check_for_menu_state_change(host)
        };

        let wait_condition_met = self.is_waiting_for_condition() && self.check_wait_condition_met(host);

        TickOutcome {
            state_changed,
            wait_condition_met,
        }
    }

    /// Something in game logic, not a controller command, changed the game.
    ///
    /// The next stable tick will be reported as a boundary.
    pub fn register_state_change(&mut self) {
        self.state.external_change = true;
        self.state.waiting_for_command = false;
    }

    /// Force a boundary after `ticks` more quiet ticks.
    pub fn set_timeout(&mut self, ticks: u32) {
        self.state.timeout = ticks;
    }

    /// A controller command has been executed.
    pub fn register_command_execution(&mut self) {
        self.state.waiting_for_command = false;
    }

    /// Suspend detection until [`resume_state_update`](Self::resume_state_update).
    pub fn block_state_update(&mut self) {
        self.state.blocked = true;
    }

    pub fn resume_state_update(&mut self) {
        self.state.blocked = false;
    }

    pub fn signal_turn_start(&mut self) {
        self.state.my_turn = true;
    }

    /// End of the player's turn, or of combat.
    pub fn signal_turn_end(&mut self) {
        self.state.my_turn = false;
    }

    /// Report ready on the next read even if nothing changed.
    ///
    /// Unlike the ordinary ready flag this survives
    /// [`register_command_execution`](Self::register_command_execution) and is
    /// only consumed by [`is_waiting_for_command`](Self::is_waiting_for_command).
    pub fn signal_ready_for_command(&mut self) {
        self.state.force_ready_on_next_send = true;
    }

    /// Reset every flag for the start of a new run.
    pub fn reset(&mut self) {
        self.state = ListenerState::new(self.config.initial_gold);
    }

    pub fn set_wait_condition(&mut self, condition: WaitCondition, target: bool) {
        let now = self.clock.now();
        self.state.set_wait_condition(condition, target, now);
    }

    pub fn clear_wait_condition(&mut self) {
        self.state.clear_wait_condition();
    }

    pub fn is_waiting_for_condition(&self) -> bool {
        self.state.is_waiting_for_condition()
    }

    pub fn check_wait_condition_met(&mut self, host: &impl GameHost) -> bool {
        let now = self.clock.now();
        self.state.check_wait_condition_met(host, &self.config, now)
    }

    pub fn check_for_dungeon_state_change(&mut self, host: &impl GameHost) -> bool {
        self.state.check_for_dungeon_state_change(host)
    }

    pub fn check_for_menu_state_change(&mut self, host: &impl GameHost) -> bool {
        self.state.check_for_menu_state_change(host)
    }

    /// Read side of readiness; consumes a pending forced ready.
    pub fn is_waiting_for_command(&mut self) -> bool {
        if self.state.force_ready_on_next_send {
            self.state.force_ready_on_next_send = false;
            return true;
        }
        self.state.waiting_for_command
    }

    /// Record an error for the next response, replacing any unread one.
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.state.last_error = Some(error.into());
    }

    pub fn get_and_clear_error(&mut self) -> Option<String> {
        self.state.last_error.take()
    }

    pub fn has_error(&self) -> bool {
        self.state.last_error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::host::{GameFrame, RoomKind, RoomPhase, Screen};
    use crate::state::Snapshot;
    use std::time::Duration;

    fn manual() -> (GameStateListener<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let listener = GameStateListener::with_clock(ListenerConfig::default(), clock.clone());
        (listener, clock)
    }

    #[test]
    fn test_force_ready_survives_command_execution_once() {
        let mut listener = GameStateListener::new();
        listener.signal_ready_for_command();
        listener.register_command_execution();

        assert!(listener.is_waiting_for_command());
        assert!(!listener.is_waiting_for_command());
    }

    #[test]
    fn test_register_state_change_clears_readiness() {
        let mut listener = GameStateListener::new();
        listener.update(&GameFrame::main_menu());
        assert!(listener.is_waiting_for_command());

        listener.register_state_change();
        assert!(!listener.is_waiting_for_command());
        assert!(listener.state().external_change);
    }

    #[test]
    fn test_error_channel_overwrites_and_reads_once() {
        let mut listener = GameStateListener::new();
        assert!(!listener.has_error());

        listener.set_error("first");
        listener.set_error("second");
        assert!(listener.has_error());
        assert_eq!(listener.get_and_clear_error().as_deref(), Some("second"));
        assert_eq!(listener.get_and_clear_error(), None);
        assert!(!listener.has_error());
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let mut listener = GameStateListener::new();
        let mut frame = GameFrame::combat().with_screen(Screen::CardReward, true);
        frame.gold = 300;
        listener.signal_turn_start();
        listener.update(&frame);
        listener.block_state_update();
        listener.set_timeout(5);
        listener.register_state_change();
        listener.signal_ready_for_command();
        listener.set_wait_condition(WaitCondition::InCombat, true);
        listener.set_error("boom");

        listener.reset();

        let state = listener.state();
        assert_eq!(state.snapshot, Snapshot::default());
        assert_eq!(state.snapshot.gold, 99);
        assert!(!state.external_change);
        assert!(!state.my_turn);
        assert!(!state.blocked);
        assert!(!state.waiting_for_command);
        assert!(!state.wait_one_update);
        assert!(!state.force_ready_on_next_send);
        assert_eq!(state.timeout, 0);
        assert_eq!(state.wait.condition(), WaitCondition::None);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_reset_uses_configured_gold() {
        let config = ListenerConfig {
            initial_gold: 0,
            ..ListenerConfig::default()
        };
        let mut listener = GameStateListener::with_config(config);
        listener.reset();
        assert_eq!(listener.state().snapshot.gold, 0);
    }

    #[test]
    fn test_update_outside_run_reports_menu_and_clears_turn() {
        let mut listener = GameStateListener::new();
        listener.signal_turn_start();

        let outcome = listener.update(&GameFrame::main_menu());
        assert!(outcome.state_changed);
        assert!(!outcome.wait_condition_met);
        assert!(!listener.state().my_turn);

        let outcome = listener.update(&GameFrame::main_menu());
        assert!(!outcome.should_send());
    }

    #[test]
    fn test_arm_then_check_before_condition_holds() {
        let mut listener = GameStateListener::new();
        listener.set_wait_condition(WaitCondition::InGame, true);

        assert!(!listener.check_wait_condition_met(&GameFrame::main_menu()));
        assert!(!listener.is_waiting_for_command());
        assert!(listener.is_waiting_for_condition());
    }

    #[test]
    fn test_update_resolves_wait_condition() {
        let mut listener = GameStateListener::new();
        // Menu already reported.
        listener.update(&GameFrame::main_menu());
        listener.register_command_execution();
        listener.set_wait_condition(WaitCondition::MainMenu, false);

        let outcome = listener.update(&GameFrame::main_menu());
        assert!(!outcome.state_changed);
        assert!(outcome.wait_condition_met);
        assert!(outcome.should_send());
        assert!(listener.is_waiting_for_command());
    }

    #[test]
    fn test_visual_timeout_uses_listener_clock() {
        let (mut listener, clock) = manual();
        let mut frame = GameFrame::in_room(RoomKind::Other, RoomPhase::Complete);
        frame.room_wait_timer = 0.5;

        listener.set_wait_condition(WaitCondition::VisualStable, false);
        for _ in 0..60 {
            clock.advance(Duration::from_millis(500));
            assert!(!listener.check_wait_condition_met(&frame));
        }

        clock.advance(Duration::from_millis(500));
        assert!(listener.check_wait_condition_met(&frame));
        assert!(listener.has_error());
        assert!(listener.is_waiting_for_command());
    }
}
