//! # reconcile
//!
//! The reconciliation engine behind every ACS resource lifecycle.
//!
//! This crate provides:
//! - [`status`]: status tags (HTTP reason phrases plus `UPDATED`) and the
//!   named pending/target sets
//! - [`classify`]: the single judgement of an HTTP outcome against a
//!   (target, pending) pair
//! - [`Waiter`]: the poll loop with initial delay, back-off, deadline and
//!   cancellation
//! - [`WaitError`] and [`ErrorKind`]: the error record that flows through
//!   waits and its classification per lifecycle [`Phase`]
//!
//! ## Example
//!
//! ```
//! use reconcile::{classify, status, ManualClock, WaitSpec, Waiter};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let waiter = Waiter::new(Arc::new(ManualClock::new()));
//! let spec = WaitSpec::new(status::PENDING_CRUD, status::TARGET_EXISTS, Duration::from_secs(60));
//!
//! let response = waiter
//!     .wait_for(&spec, || {
//!         classify(Ok(acs::Response::new(200, "{}")), spec.target, spec.pending)
//!     })
//!     .unwrap();
//! assert_eq!(response.status, 200);
//! ```

#![warn(clippy::all)]

mod classify;
mod clock;
pub mod defaults;
mod error;
pub mod lexicon;
pub mod sets;
pub mod status;
mod wait;

pub use classify::classify;
pub use clock::{CancelToken, Clock, ManualClock, SystemClock};
pub use error::{ErrorKind, Phase, Result, WaitError};
pub use status::StatusSet;
pub use wait::{
    LogCallback, NoCallback, RecordingCallback, Refresh, RefreshResult, WaitCallback, WaitSpec,
    Waiter,
};
