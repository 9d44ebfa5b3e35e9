//! services/mobile_client/src/interaction/progress.rs
//!
//! Simulated "thinking" feedback shown while a conversation turn is
//! outstanding. The backend reports no progress, so the phases advance on a
//! fixed clock and stop at the last one.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Labels shown in order while waiting for the assistant.
pub const THINKING_PHASES: [&str; 4] = [
    "Evaluating logged activity...",
    "Brainstorming personalized advice...",
    "Performing safety audit...",
    "Finalizing guidance...",
];

/// Snapshot published to observers on every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    pub phase: usize,
    pub running: bool,
}

impl ProgressState {
    const IDLE: Self = Self {
        phase: 0,
        running: false,
    };
}

pub struct ProgressDriver {
    interval: Duration,
    state: Arc<watch::Sender<ProgressState>>,
    // Retained so `stop` can cancel the ticker deterministically.
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl ProgressDriver {
    pub fn new(interval: Duration) -> Self {
        let (state, _) = watch::channel(ProgressState::IDLE);
        Self {
            interval,
            state: Arc::new(state),
            ticker: Mutex::new(None),
        }
    }

    /// Begins at phase 0. A no-op while already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if self.state.borrow().running {
            return;
        }
        self.state.send_replace(ProgressState {
            phase: 0,
            running: true,
        });

        let state = Arc::clone(&self.state);
        let interval = self.interval;
        let last = THINKING_PHASES.len() - 1;
        *ticker = Some(tokio::spawn(async move {
            for _ in 0..last {
                tokio::time::sleep(interval).await;
                state.send_modify(|s| {
                    if s.running && s.phase < last {
                        s.phase += 1;
                    }
                });
                debug!(phase = state.borrow().phase, "Progress advanced.");
            }
        }));
    }

    /// Halts advancement and resets to phase 0.
    pub fn stop(&self) {
        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = ticker.take() {
            handle.abort();
        }
        self.state.send_replace(ProgressState::IDLE);
    }

    pub fn current(&self) -> ProgressState {
        *self.state.borrow()
    }

    /// The label for the current phase.
    pub fn label(&self) -> &'static str {
        THINKING_PHASES[self.current().phase]
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.state.subscribe()
    }

    /// Starts the driver and returns a guard that stops it when dropped.
    pub fn run(&self) -> ProgressGuard<'_> {
        self.start();
        ProgressGuard { driver: self }
    }
}

impl Drop for ProgressDriver {
    fn drop(&mut self) {
        let ticker = self.ticker.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = ticker.take() {
            handle.abort();
        }
    }
}

/// Stops the driver on every exit path of a turn.
pub struct ProgressGuard<'a> {
    driver: &'a ProgressDriver,
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        self.driver.stop();
    }
}
