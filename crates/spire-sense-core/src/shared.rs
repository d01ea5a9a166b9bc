//! Cross-thread access to a listener.
//!
//! Readiness, the pending error and the armed wait condition are read and
//! cleared together, so they sit behind a single lock rather than one per
//! field.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::host::GameHost;
use crate::listener::{GameStateListener, TickOutcome};

/// Readiness and error as of one read, taken atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub ready_for_command: bool,
    pub error: Option<String>,
}

/// A listener shared between the game tick and a controller thread.
#[derive(Debug)]
pub struct SharedListener<C: Clock = SystemClock> {
    inner: Arc<Mutex<GameStateListener<C>>>,
}

impl<C: Clock> Clone for SharedListener<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clock> SharedListener<C> {
    pub fn new(listener: GameStateListener<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(listener)),
        }
    }

    /// Lock the listener. A poisoned lock is recovered; the state is plain flags.
    pub fn lock(&self) -> MutexGuard<'_, GameStateListener<C>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` with exclusive access to the listener.
    pub fn with<R>(&self, f: impl FnOnce(&mut GameStateListener<C>) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn update(&self, host: &impl GameHost) -> TickOutcome {
        self.lock().update(host)
    }

    /// Consume readiness (including a forced ready) and the pending error.
    pub fn take_report(&self) -> ReadinessReport {
        let mut listener = self.lock();
        ReadinessReport {
            ready_for_command: listener.is_waiting_for_command(),
            error: listener.get_and_clear_error(),
        }
    }
}
