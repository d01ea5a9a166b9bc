//! Visual stability check.
//!
//! Looks only at transition indicators: boot mode, save loading, fades,
//! screen swaps and wait timers. Effect lists are not inspected since ambient
//! particles play for as long as a room is open.

use tracing::debug;

use crate::host::{GameHost, GameMode};

/// Whether fades, transitions and wait timers have all settled.
///
/// Room and event wait timers at or below `epsilon` count as settled; in some
/// rooms they hover at a small residual value instead of reaching zero.
pub fn are_visual_effects_stable(host: &impl GameHost, epsilon: f32) -> bool {
    // Character select is the normal menu state and does not block.
    if host.game_mode() == Some(GameMode::Splash) {
        debug!("Visual stability blocked: game mode is SPLASH");
        return false;
    }

    if host.loading_save() {
        debug!("Visual stability blocked: loading save");
        return false;
    }

    if host.in_dungeon() {
        if host.is_fading() {
            debug!(
                fading_in = host.is_fading_in(),
                fading_out = host.is_fading_out(),
                "Visual stability blocked: dungeon fading"
            );
            return false;
        }

        match host.fade_timer() {
            Ok(fade_timer) if fade_timer > 0.0 => {
                debug!(fade_timer, "Visual stability blocked: fade timer running");
                return false;
            }
            Ok(_) => {}
            Err(e) => debug!("Visual stability: skipping fade timer check: {}", e),
        }

        if host.screen_swap() {
            debug!("Visual stability blocked: screen swap in progress");
            return false;
        }

        let room_wait_timer = host.room_wait_timer();
        if room_wait_timer > epsilon {
            debug!(room_wait_timer, "Visual stability blocked: room wait timer");
            return false;
        }

        if let Some(room) = host.room() {
            if room.kind.is_event_like() {
                if let Some(event_wait_timer) = room.event_wait_timer {
                    if event_wait_timer > epsilon {
                        debug!(event_wait_timer, "Visual stability blocked: event wait timer");
                        return false;
                    }
                }
            }
        }
    }

    let screen_timer = host.screen_timer();
    if screen_timer > 0.0 {
        debug!(screen_timer, "Visual stability blocked: screen timer");
        return false;
    }

    true
}
