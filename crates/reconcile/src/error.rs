//! Wait errors and the error taxonomy built on top of them.
//!
//! Every failure that leaves a waiter is a [`WaitError`] carrying the last
//! observed status tag and, when the server sent one, its message. Higher
//! layers refine it into an [`ErrorKind`] for the lifecycle [`Phase`] they
//! are in.

use crate::lexicon;
use crate::status::{self, StatusSet};
use std::fmt;
use std::time::Duration;

/// Result type for waits.
pub type Result<T> = std::result::Result<T, WaitError>;

/// Errors surfaced by refresh functions and the waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WaitError {
    /// The HTTP call produced no response.
    #[error("request failed: {message}")]
    Transport { message: String },

    /// The status was neither pending nor target.
    #[error("unexpected state '{state}', wanted target '{expected}'. last error: {last_error}")]
    UnexpectedState {
        state: &'static str,
        expected: StatusSet,
        /// Raw body of the last response.
        last_error: String,
    },

    /// The overall deadline elapsed while still pending.
    #[error("timeout while waiting for state to become '{expected}' (last state: '{state}', timeout: {timeout:?})")]
    Timeout {
        state: &'static str,
        expected: StatusSet,
        timeout: Duration,
    },

    /// The caller cancelled between attempts or during a sleep.
    #[error("cancelled while waiting for state to become '{expected}' (last state: '{state}')")]
    Cancelled {
        state: &'static str,
        expected: StatusSet,
    },

    /// A target response could not be decoded.
    #[error("failed to decode response (state '{state}'): {message}")]
    Decode {
        state: &'static str,
        message: String,
    },

    /// A refresh reported a target state without a payload.
    #[error("state '{state}' reached without a payload")]
    MissingPayload { state: &'static str },
}

impl WaitError {
    /// Last observed status tag (`""` when no response was seen).
    #[must_use]
    pub fn state(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "",
            Self::UnexpectedState { state, .. }
            | Self::Timeout { state, .. }
            | Self::Cancelled { state, .. }
            | Self::Decode { state, .. }
            | Self::MissingPayload { state } => state,
        }
    }

    /// Last message sent by the server, if any.
    #[must_use]
    pub fn last_error_message(&self) -> Option<&str> {
        match self {
            Self::UnexpectedState { last_error, .. } => Some(last_error),
            _ => None,
        }
    }

    /// Classify this error for the given lifecycle phase.
    #[must_use]
    pub fn kind(&self, phase: Phase) -> ErrorKind {
        let Self::UnexpectedState {
            state, last_error, ..
        } = self
        else {
            return ErrorKind::Fatal;
        };

        if lexicon::is_unknown_feature(last_error) {
            ErrorKind::UnknownFeature
        } else if lexicon::is_not_found(last_error) || *state == status::NOT_FOUND {
            ErrorKind::NotFound
        } else if *state == status::CONFLICT && phase == Phase::Create {
            ErrorKind::AlreadyExists
        } else {
            ErrorKind::Fatal
        }
    }
}

/// Lifecycle phase an error was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Categories of wait failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Create hit an existing object (HTTP 409).
    AlreadyExists,
    /// The named object does not exist.
    NotFound,
    /// The allowlist feature does not exist on the stack.
    UnknownFeature,
    /// Anything else.
    Fatal,
}

impl ErrorKind {
    /// Whether the remote object is gone and should be dropped from state.
    #[must_use]
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::NotFound | Self::UnknownFeature)
    }

    /// Get a user-friendly description of this error kind.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::AlreadyExists => "Resource already exists",
            Self::NotFound => "Resource not found",
            Self::UnknownFeature => "Unknown access feature",
            Self::Fatal => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error kind.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::AlreadyExists => {
                "Import the existing resource into state or choose a different name"
            }
            Self::NotFound => "The resource was removed outside of this provider",
            Self::UnknownFeature => "Check the feature name against the features enabled on the stack",
            Self::Fatal => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl From<acs::Error> for WaitError {
    fn from(err: acs::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{TARGET_CHANGE_ASYNC, TARGET_EXISTS};

    fn unexpected(state: &'static str, body: &str) -> WaitError {
        WaitError::UnexpectedState {
            state,
            expected: TARGET_EXISTS,
            last_error: body.to_string(),
        }
    }

    #[test]
    fn test_conflict_only_at_create() {
        let err = unexpected(status::CONFLICT, r#"{"code":"Conflict","message":"HEC token h1 exists"}"#);
        assert_eq!(err.kind(Phase::Create), ErrorKind::AlreadyExists);
        assert_eq!(err.kind(Phase::Update), ErrorKind::Fatal);
    }

    #[test]
    fn test_not_found_by_lexicon_and_status() {
        let by_body = unexpected("Bad Request", r#"{"code":"404-index-not-found"}"#);
        assert_eq!(by_body.kind(Phase::Read), ErrorKind::NotFound);

        let by_status = unexpected(status::NOT_FOUND, "");
        assert_eq!(by_status.kind(Phase::Delete), ErrorKind::NotFound);
        assert!(by_status.kind(Phase::Delete).is_gone());
    }

    #[test]
    fn test_unknown_feature_wins_over_not_found() {
        let err = unexpected(status::NOT_FOUND, "unknown access feature: nope");
        assert_eq!(err.kind(Phase::Read), ErrorKind::UnknownFeature);
        assert!(err.kind(Phase::Read).is_gone());
    }

    #[test]
    fn test_non_server_errors_are_fatal() {
        let transport = WaitError::Transport {
            message: "connection refused".to_string(),
        };
        assert_eq!(transport.kind(Phase::Create), ErrorKind::Fatal);
        assert_eq!(transport.state(), "");
        assert_eq!(transport.last_error_message(), None);

        let timeout = WaitError::Timeout {
            state: status::TOO_MANY_REQUESTS,
            expected: TARGET_CHANGE_ASYNC,
            timeout: Duration::from_secs(60),
        };
        assert_eq!(timeout.kind(Phase::Delete), ErrorKind::Fatal);
        assert_eq!(timeout.state(), status::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_display_carries_state_and_body() {
        let err = unexpected("Bad Request", "invalid datatype");
        let display = err.to_string();
        assert!(display.contains("Bad Request"));
        assert!(display.contains("invalid datatype"));
        assert!(display.contains("OK"));
    }

    #[test]
    fn test_kind_advice() {
        assert!(ErrorKind::AlreadyExists.advice().contains("Import"));
        assert!(!ErrorKind::Fatal.is_gone());
    }

    #[test]
    fn test_from_acs_error() {
        let err: WaitError = acs::Error::transport("dns failure").into();
        assert!(matches!(err, WaitError::Transport { .. }));
        assert!(err.to_string().contains("dns failure"));
    }
}
