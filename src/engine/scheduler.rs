//! Recurring tick schedule for continuous play.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Whether the engine's run loop is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No ticks are scheduled.
    Idle,
    /// A tick fires every `delay`.
    Running,
}

/// Shared flag that stops a run from any thread.
///
/// Every call to [`SimulationEngine::start`](crate::SimulationEngine::start)
/// creates a fresh token, so cancelling a token only ever stops the run it
/// was taken from.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the run this token belongs to at its next poll.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct ActiveRun {
    delay: Duration,
    next_due: Instant,
    token: CancelToken,
}

/// Next-due bookkeeping for the engine's run loop.
///
/// Ticks themselves are synchronous, so the schedule only ever has to
/// answer "is a tick due" and "when is the next one".
#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    run: Option<ActiveRun>,
}

impl Scheduler {
    /// Begin a run. The first tick is due `delay` after `now`.
    ///
    /// Returns `false` if a run is already active.
    pub(crate) fn start(&mut self, delay: Duration, now: Instant) -> bool {
        if self.is_running() {
            return false;
        }
        self.run = Some(ActiveRun {
            delay,
            next_due: now + delay,
            token: CancelToken::new(),
        });
        true
    }

    /// End the current run. Returns `false` if nothing was running.
    pub(crate) fn stop(&mut self) -> bool {
        let was_running = self.is_running();
        if let Some(run) = self.run.take() {
            run.token.cancel();
        }
        was_running
    }

    pub(crate) fn is_running(&self) -> bool {
        self.active().is_some()
    }

    /// When the next tick is due, or `None` when idle or cancelled.
    pub(crate) fn next_due(&self) -> Option<Instant> {
        self.active().map(|run| run.next_due)
    }

    /// Whether a tick should fire at `now`. Drops a cancelled run.
    pub(crate) fn is_due(&mut self, now: Instant) -> bool {
        if self.run.as_ref().is_some_and(|run| run.token.is_cancelled()) {
            self.run = None;
            log::info!("run cancelled");
        }
        self.next_due().is_some_and(|due| now >= due)
    }

    /// Schedule the next tick `delay` after the last one completed.
    pub(crate) fn reschedule(&mut self, completed_at: Instant) {
        if let Some(run) = self.run.as_mut() {
            run.next_due = completed_at + run.delay;
        }
    }

    pub(crate) fn delay(&self) -> Option<Duration> {
        self.active().map(|run| run.delay)
    }

    pub(crate) fn token(&self) -> Option<CancelToken> {
        self.active().map(|run| run.token.clone())
    }

    /// The current run, unless it was cancelled.
    fn active(&self) -> Option<&ActiveRun> {
        self.run.as_ref().filter(|run| !run.token.is_cancelled())
    }
}
