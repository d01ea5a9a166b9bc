//! One-shot wait conditions.
//!
//! The controller arms a condition ("in a run", "in combat", "at the main
//! menu", "visuals settled") and the listener reports ready once it holds.
//! Only one condition is armed at a time; arming replaces the previous one.

use std::time::Instant;

use tracing::{info, warn};

use crate::config::ListenerConfig;
use crate::host::{GameHost, GameMode};
use crate::state::{ArmedWait, ListenerState, WaitCondition};
use crate::visual::are_visual_effects_stable;

impl ListenerState {
    /// Arms `condition` with `target`, clearing readiness until it resolves.
    ///
    /// `target` is ignored for [`WaitCondition::MainMenu`] and
    /// [`WaitCondition::VisualStable`]. Arming [`WaitCondition::None`] clears
    /// any armed condition.
    pub fn set_wait_condition(&mut self, condition: WaitCondition, target: bool, now: Instant) {
        self.wait = match condition {
            WaitCondition::None => ArmedWait::None,
            WaitCondition::InGame => ArmedWait::InGame { target },
            WaitCondition::InCombat => ArmedWait::InCombat { target },
            WaitCondition::MainMenu => ArmedWait::MainMenu,
            WaitCondition::VisualStable => ArmedWait::VisualStable { started_at: now },
        };
        self.waiting_for_command = false;
        info!(%condition, target, "Wait condition armed");
    }

    pub fn clear_wait_condition(&mut self) {
        self.wait = ArmedWait::None;
    }

    pub fn is_waiting_for_condition(&self) -> bool {
        self.wait.is_armed()
    }

    /// Whether the armed condition now holds.
    ///
    /// On success the condition is disarmed and readiness is set. Returns
    /// `false` without touching anything when nothing is armed.
    pub fn check_wait_condition_met(
        &mut self,
        host: &impl GameHost,
        config: &ListenerConfig,
        now: Instant,
    ) -> bool {
        let condition_met = match self.wait {
            ArmedWait::None => return false,
            ArmedWait::InGame { target } => host.in_dungeon() == target,
            ArmedWait::InCombat { target } => {
                if host.in_dungeon() {
                    host.in_combat() == target
                } else {
                    // Leaving the run also leaves combat.
                    !target
                }
            }
            ArmedWait::MainMenu => {
                // Splash counts so a return to the menu is seen mid-transition.
                let at_char_select =
                    host.game_mode() == Some(GameMode::CharSelect) && host.main_menu_present();
                let at_splash = host.game_mode() == Some(GameMode::Splash);
                !host.in_dungeon() && (at_char_select || at_splash)
            }
            ArmedWait::VisualStable { started_at } => {
                let timeout = config.visual_stable_timeout();
                if now.saturating_duration_since(started_at) > timeout {
                    let message = format!(
                        "Timeout waiting for visual stability after {} seconds",
                        timeout.as_secs()
                    );
                    warn!("{}", message);
                    self.last_error = Some(message);
                    true
                } else {
                    are_visual_effects_stable(host, config.wait_timer_epsilon)
                }
            }
        };

        if condition_met {
            info!(condition = %self.wait.condition(), "Wait condition met");
            self.wait = ArmedWait::None;
            self.waiting_for_command = true;
        }
        condition_met
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{GameFrame, RoomKind, RoomPhase};
    use std::time::Duration;

    fn armed(condition: WaitCondition, target: bool) -> (ListenerState, Instant) {
        let now = Instant::now();
        let mut state = ListenerState::default();
        state.waiting_for_command = true;
        state.set_wait_condition(condition, target, now);
        (state, now)
    }

    #[test]
    fn test_arming_clears_readiness() {
        let (state, _) = armed(WaitCondition::InGame, true);
        assert!(state.is_waiting_for_condition());
        assert!(!state.waiting_for_command);
    }

    #[test]
    fn test_nothing_armed_is_a_no_op() {
        let mut state = ListenerState::default();
        let before = state.clone();
        let config = ListenerConfig::default();

        for _ in 0..3 {
            assert!(!state.check_wait_condition_met(&GameFrame::combat(), &config, Instant::now()));
        }
        assert_eq!(state, before);
    }

    #[test]
    fn test_in_game() {
        let config = ListenerConfig::default();
        let (mut state, now) = armed(WaitCondition::InGame, true);

        assert!(!state.check_wait_condition_met(&GameFrame::main_menu(), &config, now));
        assert!(!state.waiting_for_command);

        assert!(state.check_wait_condition_met(&GameFrame::combat(), &config, now));
        assert!(state.waiting_for_command);
        assert!(!state.is_waiting_for_condition());

        // Disarmed after success.
        assert!(!state.check_wait_condition_met(&GameFrame::combat(), &config, now));
    }

    #[test]
    fn test_in_combat() {
        let config = ListenerConfig::default();
        let (mut state, now) = armed(WaitCondition::InCombat, true);
        let event = GameFrame::in_room(RoomKind::Event, RoomPhase::Event);

        assert!(!state.check_wait_condition_met(&event, &config, now));
        assert!(state.check_wait_condition_met(&GameFrame::combat(), &config, now));
    }

    #[test]
    fn test_out_of_combat_satisfied_by_leaving_run() {
        let config = ListenerConfig::default();

        let (mut state, now) = armed(WaitCondition::InCombat, false);
        assert!(state.check_wait_condition_met(&GameFrame::main_menu(), &config, now));

        let (mut state, now) = armed(WaitCondition::InCombat, true);
        assert!(!state.check_wait_condition_met(&GameFrame::main_menu(), &config, now));
    }

    #[test]
    fn test_main_menu() {
        let config = ListenerConfig::default();
        let (mut state, now) = armed(WaitCondition::MainMenu, false);

        assert!(!state.check_wait_condition_met(&GameFrame::combat(), &config, now));

        let mut loading = GameFrame::main_menu();
        loading.main_menu_present = false;
        assert!(!state.check_wait_condition_met(&loading, &config, now));

        assert!(state.check_wait_condition_met(&GameFrame::main_menu(), &config, now));
    }

    #[test]
    fn test_main_menu_accepts_splash_transition() {
        let config = ListenerConfig::default();
        let (mut state, now) = armed(WaitCondition::MainMenu, false);
        let splash = GameFrame {
            game_mode: Some(GameMode::Splash),
            ..GameFrame::default()
        };
        assert!(state.check_wait_condition_met(&splash, &config, now));
    }

    #[test]
    fn test_visual_stable_times_out_with_error() {
        let config = ListenerConfig::default();
        let (mut state, start) = armed(WaitCondition::VisualStable, false);
        let mut frame = GameFrame::in_room(RoomKind::Other, RoomPhase::Complete);
        frame.room_wait_timer = 0.5;

        assert!(!state.check_wait_condition_met(&frame, &config, start + Duration::from_secs(10)));
        assert!(!state.check_wait_condition_met(&frame, &config, start + Duration::from_secs(30)));
        assert!(state.last_error.is_none());

        assert!(state.check_wait_condition_met(&frame, &config, start + Duration::from_millis(30_001)));
        assert!(state.waiting_for_command);
        assert_eq!(
            state.last_error.as_deref(),
            Some("Timeout waiting for visual stability after 30 seconds")
        );
    }

    #[test]
    fn test_visual_stable_residual_timer_passes() {
        let config = ListenerConfig::default();
        let (mut state, start) = armed(WaitCondition::VisualStable, false);
        let mut frame = GameFrame::in_room(RoomKind::Other, RoomPhase::Complete);
        frame.room_wait_timer = 0.05;
        frame.fading_in = true;

        assert!(!state.check_wait_condition_met(&frame, &config, start));

        frame.fading_in = false;
        assert!(state.check_wait_condition_met(&frame, &config, start));
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_rearming_replaces_condition() {
        let config = ListenerConfig::default();
        let (mut state, now) = armed(WaitCondition::InGame, true);
        state.set_wait_condition(WaitCondition::MainMenu, false, now);

        assert!(!state.check_wait_condition_met(&GameFrame::combat(), &config, now));
        assert!(state.check_wait_condition_met(&GameFrame::main_menu(), &config, now));
    }

    #[test]
    fn test_clear_wait_condition() {
        let (mut state, _) = armed(WaitCondition::VisualStable, false);
        state.clear_wait_condition();
        assert!(!state.is_waiting_for_condition());
    }
}
