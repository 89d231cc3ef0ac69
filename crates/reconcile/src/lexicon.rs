//! ACS contract lexicon.
//!
//! Substrings of ACS error bodies that carry meaning for the provider. These
//! are matched against the last server message of a failed wait; keeping them
//! in one place means a change on the server side is a one-line fix here.

/// An allowlist feature name the stack does not know.
pub const UNKNOWN_FEATURE: &str = "unknown access feature";

/// Bodies of 404 responses for named objects.
pub const NOT_FOUND_MARKERS: &[&str] = &[
    "404-index-not-found",
    "404-role-not-found",
    "404-user-not-found",
    "404-hec-token-not-found",
    "hec token not found",
];

/// Whether a server message reports an unknown allowlist feature.
#[must_use]
pub fn is_unknown_feature(message: &str) -> bool {
    message.to_lowercase().contains(UNKNOWN_FEATURE)
}

/// Whether a server message reports a missing named object.
#[must_use]
pub fn is_not_found(message: &str) -> bool {
    let message = message.to_lowercase();
    NOT_FOUND_MARKERS.iter().any(|m| message.contains(m))
}
