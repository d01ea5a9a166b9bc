//! Recorded scenarios: sequences of game frames and controller signals
//! replayed against a listener on a simulated clock.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use spire_sense_core::{GameFrame, GameStateListener, ListenerConfig, ManualClock, WaitCondition};

/// Default simulated tick length (60 ticks per second)
const DEFAULT_TICK_MS: u64 = 17;

/// A scenario file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    /// Simulated duration of one tick in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Listener configuration; defaults apply when absent
    #[serde(default)]
    pub config: Option<ListenerConfig>,
    pub steps: Vec<Step>,
}

fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}

/// One or more ticks sharing a frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Step {
    /// Frame for these ticks; the previous step's frame when absent
    #[serde(default)]
    pub frame: Option<GameFrame>,
    /// Signals applied before the first of these ticks
    #[serde(default)]
    pub signals: Vec<Signal>,
    /// Number of ticks to run with this frame
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

fn default_repeat() -> u32 {
    1
}

/// Controller or game-side notification delivered between ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    TurnStart,
    TurnEnd,
    StateChange,
    CommandExecuted,
    Block,
    Resume,
    Timeout(u32),
    Wait {
        condition: WaitCondition,
        #[serde(default)]
        target: bool,
    },
    ClearWait,
    ForceReady,
    Reset,
    Error(String),
}

impl Signal {
    fn apply(&self, listener: &mut GameStateListener<ManualClock>) {
        match self {
            Signal::TurnStart => listener.signal_turn_start(),
            Signal::TurnEnd => listener.signal_turn_end(),
            Signal::StateChange => listener.register_state_change(),
            Signal::CommandExecuted => listener.register_command_execution(),
            Signal::Block => listener.block_state_update(),
            Signal::Resume => listener.resume_state_update(),
            Signal::Timeout(ticks) => listener.set_timeout(*ticks),
            Signal::Wait { condition, target } => listener.set_wait_condition(*condition, *target),
            Signal::ClearWait => listener.clear_wait_condition(),
            Signal::ForceReady => listener.signal_ready_for_command(),
            Signal::Reset => listener.reset(),
            Signal::Error(message) => listener.set_error(message.clone()),
        }
    }
}

/// What the boundary layer would have sent on one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub elapsed_ms: u64,
    pub state_changed: bool,
    pub wait_condition_met: bool,
    pub ready_for_command: bool,
    pub error: Option<String>,
}

impl std::fmt::Display for TickReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cause = match (self.state_changed, self.wait_condition_met) {
            (true, true) => "state change + wait condition",
            (true, false) => "state change",
            (false, true) => "wait condition",
            (false, false) => "forced",
        };
        write!(
            f,
            "tick {:>5} ({:>6} ms): {} ready={}",
            self.tick, self.elapsed_ms, cause, self.ready_for_command
        )?;
        if let Some(error) = &self.error {
            write!(f, " error=\"{}\"", error)?;
        }
        Ok(())
    }
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid scenario {}", path.display()))
    }

    /// Replay every step and collect the ticks on which a state would be sent.
    pub fn replay(&self) -> anyhow::Result<Vec<TickReport>> {
        let clock = ManualClock::new();
        let config = self.config.clone().unwrap_or_default();
        let mut listener = GameStateListener::with_clock(config, clock.clone());
        let tick_length = Duration::from_millis(self.tick_ms);

        let mut frame: Option<GameFrame> = None;
        let mut reports = Vec::new();
        let mut tick = 0u64;

        for (index, step) in self.steps.iter().enumerate() {
            if let Some(next) = &step.frame {
                frame = Some(next.clone());
            }
            let current = frame
                .as_ref()
                .with_context(|| format!("Step {} has no frame and none came before it", index))?;

            for signal in &step.signals {
                signal.apply(&mut listener);
            }

            for _ in 0..step.repeat {
                tick += 1;
                clock.advance(tick_length);

                let outcome = listener.update(current);
                // A forced ready is sent even without a detected change.
                let forced = listener.state().force_ready_on_next_send;
                if outcome.should_send() || forced {
                    reports.push(TickReport {
                        tick,
                        elapsed_ms: tick * self.tick_ms,
                        state_changed: outcome.state_changed,
                        wait_condition_met: outcome.wait_condition_met,
                        ready_for_command: listener.is_waiting_for_command(),
                        error: listener.get_and_clear_error(),
                    });
                }
            }
        }

        tracing::info!(ticks = tick, sent = reports.len(), "Scenario replay finished");
        Ok(reports)
    }
}
