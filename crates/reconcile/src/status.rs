//! Status tags and the named status sets used by every refresh function.
//!
//! A tag is the canonical HTTP reason phrase of a response ("OK",
//! "Accepted", ...) or the synthetic [`UPDATED`] produced by update
//! verification.

use std::fmt;

pub const OK: &str = "OK";
pub const ACCEPTED: &str = "Accepted";
pub const NOT_FOUND: &str = "Not Found";
pub const CONFLICT: &str = "Conflict";
pub const FAILED_DEPENDENCY: &str = "Failed Dependency";
pub const TOO_MANY_REQUESTS: &str = "Too Many Requests";

/// Synthetic tag: the server representation reflects every patched field.
pub const UPDATED: &str = "UPDATED";

/// A closed set of status tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSet(&'static [&'static str]);

impl StatusSet {
    #[must_use]
    pub const fn new(tags: &'static [&'static str]) -> Self {
        Self(tags)
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| *t == tag)
    }

    #[must_use]
    pub fn tags(&self) -> &'static [&'static str] {
        self.0
    }

    /// Whether this set shares a tag with another.
    #[must_use]
    pub fn intersects(&self, other: StatusSet) -> bool {
        self.0.iter().any(|t| other.contains(t))
    }
}

impl fmt::Display for StatusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// Transient conditions on reads.
pub const PENDING_CRUD: StatusSet = StatusSet::new(&[TOO_MANY_REQUESTS, FAILED_DEPENDENCY]);

/// Transient conditions on mutations. POST/PATCH/DELETE are only retried on
/// rate limiting.
pub const PENDING_WRITE: StatusSet = StatusSet::new(&[TOO_MANY_REQUESTS]);

/// Polling for a freshly created resource to become readable.
pub const PENDING_VERIFY_CREATED: StatusSet =
    StatusSet::new(&[TOO_MANY_REQUESTS, FAILED_DEPENDENCY, NOT_FOUND]);

/// Polling for a deleted resource to disappear.
pub const PENDING_VERIFY_DELETED: StatusSet = StatusSet::new(&[OK, TOO_MANY_REQUESTS]);

/// Polling for a patch to show up in reads.
pub const PENDING_VERIFY_UPDATED: StatusSet =
    StatusSet::new(&[OK, TOO_MANY_REQUESTS, FAILED_DEPENDENCY]);

/// Mutation accepted for out-of-band completion (indexes, HEC tokens).
pub const TARGET_CHANGE_ASYNC: StatusSet = StatusSet::new(&[ACCEPTED]);

/// Mutation completed in-band (allowlists, roles, users).
pub const TARGET_CHANGE_SYNC: StatusSet = StatusSet::new(&[OK]);

pub const TARGET_EXISTS: StatusSet = StatusSet::new(&[OK]);

pub const TARGET_DELETED_ASYNC: StatusSet = StatusSet::new(&[NOT_FOUND]);

pub const TARGET_DELETED_SYNC: StatusSet = StatusSet::new(&[OK]);

pub const TARGET_UPDATED: StatusSet = StatusSet::new(&[UPDATED]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_and_target_sets_are_disjoint() {
        let pairs = [
            (PENDING_CRUD, TARGET_EXISTS),
            (PENDING_WRITE, TARGET_CHANGE_ASYNC),
            (PENDING_WRITE, TARGET_CHANGE_SYNC),
            (PENDING_VERIFY_CREATED, TARGET_EXISTS),
            (PENDING_VERIFY_DELETED, TARGET_DELETED_ASYNC),
            (PENDING_VERIFY_UPDATED, TARGET_UPDATED),
        ];
        for (pending, target) in pairs {
            assert!(!pending.intersects(target), "{pending} overlaps {target}");
        }
    }

    #[test]
    fn test_verify_created_extends_crud() {
        for tag in PENDING_CRUD.tags() {
            assert!(PENDING_VERIFY_CREATED.contains(tag));
        }
        assert!(PENDING_VERIFY_CREATED.contains(NOT_FOUND));
    }

    #[test]
    fn test_tags_match_reason_phrases() {
        assert_eq!(acs::transport::reason_phrase(200), OK);
        assert_eq!(acs::transport::reason_phrase(202), ACCEPTED);
        assert_eq!(acs::transport::reason_phrase(404), NOT_FOUND);
        assert_eq!(acs::transport::reason_phrase(409), CONFLICT);
        assert_eq!(acs::transport::reason_phrase(424), FAILED_DEPENDENCY);
        assert_eq!(acs::transport::reason_phrase(429), TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_display() {
        assert_eq!(PENDING_CRUD.to_string(), "Too Many Requests, Failed Dependency");
    }
}
