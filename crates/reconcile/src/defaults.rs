//! Polling constants shared by every orchestration.

use std::time::Duration;

/// Overall deadline of a lifecycle phase unless configured otherwise.
pub const TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Initial delay before the first mutation attempt.
pub const WRITE_DELAY: Duration = Duration::from_secs(1);

/// Initial delay before the first poll.
pub const POLL_DELAY: Duration = Duration::from_secs(2);

/// Minimum sleep between refreshes.
pub const MIN_TIMEOUT: Duration = Duration::from_secs(3);

/// Interval between polls of long-running allowlist operations.
pub const ALLOWLIST_POLL_INTERVAL: Duration = Duration::from_secs(60);
