//! Main menu state check, used while no run is in progress.

use tracing::info;

use crate::host::{GameHost, GameMode};
use crate::state::ListenerState;

impl ListenerState {
    /// Reports entering the main menu, once per visit.
    ///
    /// Fires after the game first boots and after each run ends. The flag that
    /// suppresses repeats is cleared by the dungeon detector.
    pub fn check_for_menu_state_change(&mut self, host: &impl GameHost) -> bool {
        let at_menu = host.game_mode() == Some(GameMode::CharSelect) && host.main_menu_present();
        if self.presented_out_of_game_state || !at_menu {
            return false;
        }

        self.presented_out_of_game_state = true;
        self.external_change = false;
        self.waiting_for_command = true;
        info!("Main menu reached");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::GameFrame;

    #[test]
    fn test_reports_menu_once() {
        let mut state = ListenerState::default();
        state.external_change = true;
        let menu = GameFrame::main_menu();

        assert!(state.check_for_menu_state_change(&menu));
        assert!(state.waiting_for_command);
        assert!(!state.external_change);

        assert!(!state.check_for_menu_state_change(&menu));
    }

    #[test]
    fn test_requires_menu_object() {
        let mut state = ListenerState::default();
        let mut menu = GameFrame::main_menu();
        menu.main_menu_present = false;

        assert!(!state.check_for_menu_state_change(&menu));
        assert!(!state.waiting_for_command);
    }

    #[test]
    fn test_splash_is_not_menu() {
        let mut state = ListenerState::default();
        let splash = GameFrame {
            game_mode: Some(GameMode::Splash),
            main_menu_present: true,
            ..GameFrame::default()
        };
        assert!(!state.check_for_menu_state_change(&splash));
    }

    #[test]
    fn test_rearms_after_a_run() {
        let mut state = ListenerState::default();
        let menu = GameFrame::main_menu();
        assert!(state.check_for_menu_state_change(&menu));

        state.my_turn = true;
        state.check_for_dungeon_state_change(&GameFrame::combat());
        assert!(!state.presented_out_of_game_state);

        assert!(state.check_for_menu_state_change(&menu));
    }
}
