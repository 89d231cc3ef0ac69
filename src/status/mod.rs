//! Refresh functions, one per (resource kind, lifecycle phase).
//!
//! Each function performs exactly one ACS call and hands the outcome to
//! [`reconcile::classify`] with the status sets of its phase. Read and
//! verify-update functions also decode the body of a target response.
//! None of them observe time; the waiter drives them.

pub mod allowlist;
pub mod hec_token;
pub mod index;
pub mod role;
pub mod user;

use acs::Response;
use reconcile::{Refresh, RefreshResult, StatusSet, WaitError, status};
use serde::de::DeserializeOwned;

/// Log the request id of a mutation for server-side correlation.
pub(crate) fn log_mutation(action: &str, what: &str, result: &acs::Result<Response>) {
    if let Ok(response) = result {
        log::info!(
            "{action} {what}: {} {} (X-REQUEST-ID: {})",
            response.status,
            response.reason_phrase(),
            response.request_id.as_deref().unwrap_or("-")
        );
    }
}

/// Decode the body of a target response; pending responses keep only their
/// status.
pub(crate) fn decode<T: DeserializeOwned>(
    refresh: Refresh<Response>,
    target: StatusSet,
) -> RefreshResult<T> {
    let state = refresh.status;
    match refresh.payload {
        Some(response) if target.contains(state) => response
            .json::<T>()
            .map(|value| Refresh::new(value, state))
            .map_err(|e| WaitError::Decode {
                state,
                message: e.to_string(),
            }),
        _ => Ok(Refresh::tag(state)),
    }
}

/// Turn a decoded read into a verify-update outcome: `UPDATED` when
/// `verified` holds, otherwise the read's own status as pending.
pub(crate) fn verified<T>(read: Refresh<T>, verified: impl FnOnce(&T) -> bool) -> Refresh<T> {
    match read.payload {
        Some(server) if verified(&server) => Refresh::new(server, status::UPDATED),
        _ => Refresh::tag(read.status),
    }
}
