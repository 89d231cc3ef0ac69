//! Response classification.
//!
//! Every refresh function routes its HTTP outcome through [`classify`], the
//! single place where a status code is judged against a (target, pending)
//! pair.

use crate::error::WaitError;
use crate::status::StatusSet;
use crate::wait::{Refresh, RefreshResult};
use acs::Response;

/// Judge one HTTP outcome.
///
/// A transport failure is fatal with an empty status. A reason phrase in
/// `target` or `pending` is passed through with the response as payload,
/// body untouched. Anything else is [`WaitError::UnexpectedState`] carrying
/// the raw body.
pub fn classify(
    result: acs::Result<Response>,
    target: StatusSet,
    pending: StatusSet,
) -> RefreshResult<Response> {
    let response = result?;
    let state = response.reason_phrase();

    if target.contains(state) || pending.contains(state) {
        return Ok(Refresh::new(response, state));
    }

    Err(WaitError::UnexpectedState {
        state,
        expected: target,
        last_error: response.text(),
    })
}
