//! Plans - ordered batches of requested changes

use crate::types::Change;
use serde::{Deserialize, Serialize};

/// A batch of changes to execute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub changes: Vec<Change>,
}

impl Plan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Filter plan to only include changes matching a target pattern
    ///
    /// Target format: "type" or "type.name"
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (resource_type, name) = parse_target(t);
                Self {
                    changes: self
                        .changes
                        .into_iter()
                        .filter(|c| matches_filter(c, resource_type.as_deref(), name.as_deref()))
                        .collect(),
                }
            }
        }
    }

    /// Total number of changes in the plan
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Parse a target string like "type.name" into (type, name)
fn parse_target(target: &str) -> (Option<String>, Option<String>) {
    match target.split_once('.') {
        None => (Some(target.to_string()), None),
        Some((resource_type, name)) => (Some(resource_type.to_string()), Some(name.to_string())),
    }
}

/// Check if a change matches the filter criteria
fn matches_filter(change: &Change, resource_type: Option<&str>, name: Option<&str>) -> bool {
    if let Some(rt) = resource_type {
        // Allow the short form without the provider prefix
        let matches_type =
            change.resource_type == rt || change.resource_type == format!("scp_{rt}");
        if !matches_type {
            return false;
        }
    }

    if let Some(n) = name
        && !change
            .label()
            .split_once('.')
            .is_some_and(|(_, id)| id == n)
    {
        return false;
    }

    true
}
