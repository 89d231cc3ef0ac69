//! Time source and cancellation for waits.
//!
//! The waiter never calls `thread::sleep` directly. It asks a [`Clock`],
//! which lets tests drive a wait through minutes of virtual time instantly
//! with [`ManualClock`].

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Cooperative cancellation signal shared between a caller and its waits.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation and wake every sleeper.
    pub fn cancel(&self) {
        let (flag, cvar) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for up to `duration`. Returns `false` if cancelled first.
    fn park(&self, duration: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = cvar
            .wait_timeout_while(guard, duration, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        !*guard
    }
}

/// Source of time for the waiter.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    /// Sleep for `duration`, returning `false` if `cancel` fired meanwhile.
    fn sleep(&self, duration: Duration, cancel: &CancelToken) -> bool;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration, cancel: &CancelToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }
        cancel.park(duration)
    }
}

/// Virtual clock: sleeping advances time without blocking.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        *self.elapsed.lock().unwrap_or_else(PoisonError::into_inner) += by;
    }

    /// Total virtual time slept so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, duration: Duration, cancel: &CancelToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }
        self.advance(duration);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_manual_clock_advances_on_sleep() {
        let clock = ManualClock::new();
        let start = clock.now();
        assert!(clock.sleep(Duration::from_secs(90), &CancelToken::new()));
        assert_eq!(clock.now() - start, Duration::from_secs(90));
        assert_eq!(clock.elapsed(), Duration::from_secs(90));
    }

    #[test]
    fn test_manual_clock_respects_cancel() {
        let clock = ManualClock::new();
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(!clock.sleep(Duration::from_secs(1), &cancel));
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_system_clock_short_sleep() {
        let start = Instant::now();
        assert!(SystemClock.sleep(Duration::from_millis(10), &CancelToken::new()));
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_system_clock_wakes_on_cancel() {
        let cancel = CancelToken::new();
        let remote = cancel.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        let start = Instant::now();
        let completed = SystemClock.sleep(Duration::from_secs(30), &cancel);
        handle.join().unwrap();

        assert!(!completed);
        assert!(start.elapsed() < Duration::from_secs(30));
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_cancel_after_holder_panicked() {
        let cancel = CancelToken::new();
        let inner = cancel.inner.clone();
        let joined = thread::spawn(move || {
            let _guard = inner.0.lock().unwrap();
            panic!("holder died");
        })
        .join();
        assert!(joined.is_err());
        assert!(cancel.inner.0.is_poisoned());

        assert!(!cancel.is_cancelled());
        cancel.cancel();
        assert!(cancel.is_cancelled());
        assert!(!SystemClock.sleep(Duration::from_secs(30), &cancel));
    }
}
