//! Dungeon state-stability detection.
//!
//! Polled once per tick while a run is in progress. A tick that returns
//! `true` is a command boundary: the game has settled since the last command
//! and the controller may be sent a snapshot and asked for the next one.
//!
//! Most ticks are noise. Fades, queued actions, screens that open in two
//! waves and event rooms still running their timers all change what the
//! game looks like without it being ready for input, so the checks below
//! run in a fixed order and the first one that decides wins.

use tracing::{debug, info};

use crate::host::{GameHost, Screen};
use crate::state::{ListenerState, Snapshot};

impl ListenerState {
    /// Whether the dungeon has settled into a new state since the last boundary.
    ///
    /// Does not declare the boundary itself; see
    /// [`check_for_dungeon_state_change`](Self::check_for_dungeon_state_change).
    pub fn has_dungeon_state_changed(&mut self, host: &impl GameHost) -> bool {
        if self.blocked {
            return false;
        }
        self.presented_out_of_game_state = false;

        let new_screen = host.screen();
        let new_screen_up = host.is_screen_up();
        let room = host.room();
        let new_phase = room.map(|room| room.phase);
        let in_combat = room.is_some_and(|room| room.in_combat());

        // Nothing that needs input happens mid-fade.
        if host.is_fading() {
            return false;
        }

        // Death can happen in combat while every other busy check is true.
        if new_screen == Screen::Death && self.snapshot.screen != Some(Screen::Death) {
            return true;
        }

        if new_screen.is_non_interactive() {
            return false;
        }

        // Outside our turn only a raised screen can need us.
        if in_combat && (!self.my_turn || host.monsters_basically_dead()) && !new_screen_up {
            return false;
        }

        // Event state cannot be read until its wait timer has run out.
        if let Some(room) = room {
            if room.kind.runs_event() && room.event_wait_timer.unwrap_or(0.0) != 0.0 {
                return false;
            }
        }

        if self.snapshot.screen_differs(new_screen, new_screen_up, new_phase) {
            if in_combat {
                if new_screen_up {
                    return true;
                }
                if host.action_manager().is_waiting_on_user() {
                    return true;
                }
            } else {
                // Screen transitions out of combat often trigger a second
                // round of changes on the next tick.
                debug!(?new_screen, new_screen_up, ?new_phase, "Screen changed, waiting one update");
                self.wait_one_update = true;
                self.snapshot.screen = Some(new_screen);
                self.snapshot.screen_up = new_screen_up;
                self.snapshot.phase = new_phase;
                return false;
            }
        } else if self.wait_one_update {
            self.wait_one_update = false;
            return true;
        }

        // Between an end turn command and the turn actually ending.
        if in_combat && host.end_turn_queued() {
            return false;
        }

        if (self.external_change || self.snapshot.gold != host.player_gold())
            && host.action_manager().is_idle()
        {
            return true;
        }

        // The grid confirm overlay changes the options without touching any other field.
        if new_screen == Screen::Grid
            && self.snapshot.screen == Some(Screen::Grid)
            && host.grid_confirm_up() != self.snapshot.grid_confirm_up
        {
            return true;
        }

        // An external change mid-resolution that raises a screen without changing it.
        if self.external_change && in_combat && new_screen_up {
            return true;
        }

        if self.timeout > 0 {
            self.timeout -= 1;
            if self.timeout == 0 {
                debug!("State change timeout elapsed");
                return true;
            }
        }

        false
    }

    /// Runs the detector and, on a boundary, records it.
    ///
    /// Outside a run this only clears turn ownership and returns `false`.
    pub fn check_for_dungeon_state_change(&mut self, host: &impl GameHost) -> bool {
        if !host.in_dungeon() {
            self.my_turn = false;
            return false;
        }

        let changed = self.has_dungeon_state_changed(host);
        if changed {
            self.declare_boundary(host);
        }
        changed
    }

    fn declare_boundary(&mut self, host: &impl GameHost) {
        self.external_change = false;
        self.waiting_for_command = true;
        self.snapshot = Snapshot::capture(host);
        self.timeout = 0;
        info!(
            screen = ?self.snapshot.screen,
            screen_up = self.snapshot.screen_up,
            phase = ?self.snapshot.phase,
            gold = self.snapshot.gold,
            "Dungeon state settled"
        );
    }
}
