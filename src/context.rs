//! Shared context handed to every resource operation.

use acs::Client;
use reconcile::status::{PENDING_CRUD, PENDING_WRITE, TARGET_EXISTS};
use reconcile::{Phase, StatusSet, WaitSpec, Waiter, defaults};
use std::time::Duration;

/// Per-phase deadlines for whole waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::uniform(defaults::TIMEOUT)
    }
}

impl Timeouts {
    /// The same deadline for every phase.
    pub const fn uniform(timeout: Duration) -> Self {
        Self {
            create: timeout,
            read: timeout,
            update: timeout,
            delete: timeout,
        }
    }

    pub const fn get(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Create => self.create,
            Phase::Read => self.read,
            Phase::Update => self.update,
            Phase::Delete => self.delete,
        }
    }
}

/// Client, stack and wait policy for one provider session.
#[derive(Clone)]
pub struct AcsContext {
    pub client: Client,
    pub stack: String,
    pub waiter: Waiter,
    pub timeouts: Timeouts,
}

impl AcsContext {
    pub fn new(client: Client, stack: impl Into<String>, waiter: Waiter, timeouts: Timeouts) -> Self {
        Self {
            client,
            stack: stack.into(),
            waiter,
            timeouts,
        }
    }

    /// Wait on a mutation: retried only while rate limited.
    pub fn write_wait(&self, phase: Phase, target: StatusSet) -> WaitSpec {
        WaitSpec::new(PENDING_WRITE, target, self.timeouts.get(phase)).delay(defaults::WRITE_DELAY)
    }

    /// Wait for a mutation to become visible in reads.
    pub fn poll_wait(&self, phase: Phase, pending: StatusSet, target: StatusSet) -> WaitSpec {
        WaitSpec::new(pending, target, self.timeouts.get(phase)).delay(defaults::POLL_DELAY)
    }

    pub fn read_wait(&self) -> WaitSpec {
        WaitSpec::new(PENDING_CRUD, TARGET_EXISTS, self.timeouts.read)
    }
}
