//! The state-change waiter.
//!
//! [`Waiter::wait_for`] drives a refresh function until it reports a target
//! status, fails, or runs out of time. It is the only place in the provider
//! that observes time.

use crate::clock::{CancelToken, Clock, SystemClock};
use crate::defaults;
use crate::error::{Result, WaitError};
use crate::status::StatusSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

const INITIAL_BACKOFF: Duration = Duration::from_millis(100);
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Outcome of one refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refresh<T> {
    pub payload: Option<T>,
    pub status: &'static str,
}

impl<T> Refresh<T> {
    pub fn new(payload: T, status: &'static str) -> Self {
        Self {
            payload: Some(payload),
            status,
        }
    }

    /// An outcome that carries only a status.
    pub fn tag(status: &'static str) -> Self {
        Self {
            payload: None,
            status,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Refresh<U> {
        Refresh {
            payload: self.payload.map(f),
            status: self.status,
        }
    }
}

/// Result of a refresh function.
pub type RefreshResult<T> = Result<Refresh<T>>;

/// Parameters of one driven poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSpec {
    pub pending: StatusSet,
    pub target: StatusSet,
    /// Overall deadline, measured from the start of the wait.
    pub timeout: Duration,
    /// Sleep before the first refresh.
    pub delay: Duration,
    /// Lower bound on every sleep between refreshes.
    pub min_timeout: Duration,
    /// Fixed interval between refreshes. Zero selects exponential back-off.
    pub poll_interval: Duration,
}

impl WaitSpec {
    pub fn new(pending: StatusSet, target: StatusSet, timeout: Duration) -> Self {
        Self {
            pending,
            target,
            timeout,
            delay: Duration::ZERO,
            min_timeout: defaults::MIN_TIMEOUT,
            poll_interval: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn min_timeout(mut self, min_timeout: Duration) -> Self {
        self.min_timeout = min_timeout;
        self
    }

    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Observer of waiter progress.
pub trait WaitCallback: Send + Sync {
    /// Called whenever the observed status changes (`previous` is `""` on
    /// the first refresh).
    fn on_state(&self, previous: &str, current: &str);

    /// Called before sleeping on a pending status.
    fn on_wait(&self, _state: &str, _pause: Duration) {}
}

/// Discards all notifications.
pub struct NoCallback;

impl WaitCallback for NoCallback {
    fn on_state(&self, _previous: &str, _current: &str) {}
}

/// Logs transitions at info and sleeps at debug.
pub struct LogCallback;

impl WaitCallback for LogCallback {
    fn on_state(&self, previous: &str, current: &str) {
        if previous.is_empty() {
            log::info!("waiting for state: '{current}'");
        } else {
            log::info!("state changed: '{previous}' -> '{current}'");
        }
    }

    fn on_wait(&self, state: &str, pause: Duration) {
        log::debug!("state '{state}' is pending, retrying in {pause:?}");
    }
}

/// Records every transition; handy for asserting on a wait's history.
#[derive(Debug, Default)]
pub struct RecordingCallback {
    states: Mutex<Vec<String>>,
}

impl RecordingCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every status observed, in order, without repeats.
    pub fn states(&self) -> Vec<String> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// How many times `state` was entered.
    pub fn count(&self, state: &str) -> usize {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| *s == state)
            .count()
    }
}

impl WaitCallback for RecordingCallback {
    fn on_state(&self, _previous: &str, current: &str) {
        self.states.lock().unwrap_or_else(PoisonError::into_inner).push(current.to_string());
    }
}

/// Drives refresh functions over a clock.
#[derive(Clone)]
pub struct Waiter {
    clock: Arc<dyn Clock>,
    cancel: CancelToken,
    callback: Arc<dyn WaitCallback>,
}

impl Default for Waiter {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl Waiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            cancel: CancelToken::new(),
            callback: Arc::new(LogCallback),
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_callback(mut self, callback: Arc<dyn WaitCallback>) -> Self {
        self.callback = callback;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Run `refresh` until it reports a status in `spec.target`.
    ///
    /// # Errors
    ///
    /// Refresh errors are returned unchanged. A status outside
    /// pending∪target yields [`WaitError::UnexpectedState`]; running past
    /// the deadline yields [`WaitError::Timeout`] and cancellation yields
    /// [`WaitError::Cancelled`], both carrying the last observed status.
    pub fn wait_for<T, F>(&self, spec: &WaitSpec, mut refresh: F) -> Result<T>
    where
        F: FnMut() -> RefreshResult<T>,
    {
        let deadline = self.clock.now() + spec.timeout;
        let mut state: &'static str = "";
        let mut backoff = INITIAL_BACKOFF;

        let cancelled = |state| WaitError::Cancelled {
            state,
            expected: spec.target,
        };

        if !spec.delay.is_zero() {
            let pause = spec.delay.min(spec.timeout);
            if !self.clock.sleep(pause, &self.cancel) {
                return Err(cancelled(state));
            }
        }

        loop {
            if self.cancel.is_cancelled() {
                return Err(cancelled(state));
            }

            let outcome = refresh()?;
            if outcome.status != state {
                self.callback.on_state(state, outcome.status);
                state = outcome.status;
            }

            if spec.target.contains(state) {
                return outcome.payload.ok_or(WaitError::MissingPayload { state });
            }
            if !spec.pending.contains(state) {
                return Err(WaitError::UnexpectedState {
                    state,
                    expected: spec.target,
                    last_error: String::new(),
                });
            }

            let now = self.clock.now();
            if now >= deadline {
                return Err(WaitError::Timeout {
                    state,
                    expected: spec.target,
                    timeout: spec.timeout,
                });
            }

            let interval = if spec.poll_interval.is_zero() {
                let next = backoff.max(spec.min_timeout);
                backoff = (backoff * 2).min(MAX_BACKOFF);
                next
            } else {
                spec.poll_interval.max(spec.min_timeout)
            };
            let pause = interval.min(deadline - now);

            self.callback.on_wait(state, pause);
            if !self.clock.sleep(pause, &self.cancel) {
                return Err(cancelled(state));
            }
        }
    }
}
