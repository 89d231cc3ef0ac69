//! Core types for plans and their execution

use crate::data::{Attributes, State};
use crate::diagnostics::Diagnostics;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle operation requested for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Import => "import",
        };
        f.write_str(s)
    }
}

/// One requested change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub resource_type: String,
    pub action: Action,
    /// Recorded state, for read/update/delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior: Option<State>,
    /// Desired attributes, for create/update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Attributes>,
    /// Remote id, for import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_id: Option<String>,
}

impl Change {
    pub fn create(resource_type: impl Into<String>, config: Attributes) -> Self {
        Self {
            resource_type: resource_type.into(),
            action: Action::Create,
            prior: None,
            config: Some(config),
            import_id: None,
        }
    }

    pub fn read(resource_type: impl Into<String>, prior: State) -> Self {
        Self {
            action: Action::Read,
            prior: Some(prior),
            config: None,
            ..Self::create(resource_type, Attributes::new())
        }
    }

    pub fn update(resource_type: impl Into<String>, prior: State, config: Attributes) -> Self {
        Self {
            action: Action::Update,
            prior: Some(prior),
            ..Self::create(resource_type, config)
        }
    }

    pub fn delete(resource_type: impl Into<String>, prior: State) -> Self {
        Self {
            action: Action::Delete,
            ..Self::read(resource_type, prior)
        }
    }

    pub fn import(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            action: Action::Import,
            config: None,
            import_id: Some(id.into()),
            ..Self::create(resource_type, Attributes::new())
        }
    }

    /// Identifier used in progress output: `type.id` or `type.name`.
    pub fn label(&self) -> String {
        let id = self
            .prior
            .as_ref()
            .map(|s| s.id.clone())
            .or_else(|| self.import_id.clone())
            .or_else(|| {
                self.config
                    .as_ref()
                    .and_then(|c| c.get("name").or_else(|| c.get("feature")))
                    .and_then(|v| v.as_str())
                    .map(ToString::to_string)
            })
            .unwrap_or_else(|| "(new)".to_string());
        format!("{}.{id}", self.resource_type)
    }
}

/// Result of applying a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Created,
    Read,
    Updated,
    /// Destroyed and re-created because a force-new attribute changed.
    Replaced,
    Deleted,
    Imported,
    /// The remote object no longer exists; drop it from state.
    Gone,
    Failed { error: String },
    Skipped { reason: String },
}

impl Outcome {
    /// Check if the outcome represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Check if the outcome represents a remote change
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Self::Created | Self::Updated | Self::Replaced | Self::Deleted
        )
    }
}

/// Outcome of one change with the resulting state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeResult {
    pub label: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    /// State after the change; `None` when the resource is gone or deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
    #[serde(default, skip_serializing_if = "Diagnostics::is_empty")]
    pub diagnostics: Diagnostics,
}

/// Summary of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub updated: usize,
    pub replaced: usize,
    pub deleted: usize,
    pub read: usize,
    pub gone: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ExecuteSummary {
    /// Total number of remote changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.updated + self.replaced + self.deleted
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of changes processed
    pub fn total(&self) -> usize {
        self.total_changes() + self.read + self.gone + self.skipped + self.failed
    }

    /// Add an outcome to the summary
    pub fn add(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Replaced => self.replaced += 1,
            Outcome::Deleted => self.deleted += 1,
            Outcome::Read | Outcome::Imported => self.read += 1,
            Outcome::Gone => self.gone += 1,
            Outcome::Failed { .. } => self.failed += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Options for execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Number of parallel jobs
    pub jobs: usize,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_change_from_json() {
        let change: Change = serde_json::from_value(json!({
            "resource_type": "scp_indexes",
            "action": "update",
            "prior": {"id": "telemetry", "attributes": {"searchable_days": 90}},
            "config": {"name": "telemetry", "searchable_days": 180}
        }))
        .unwrap();
        assert_eq!(change.action, Action::Update);
        assert_eq!(change.label(), "scp_indexes.telemetry");
    }

    #[test]
    fn test_label_for_new_resource() {
        let config = json!({"feature": "search-api"}).as_object().cloned().unwrap();
        assert_eq!(
            Change::create("scp_ip_allowlists", config).label(),
            "scp_ip_allowlists.search-api"
        );
        assert_eq!(Change::import("scp_roles", "ops").label(), "scp_roles.ops");
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = ExecuteSummary::default();
        summary.add(&Outcome::Created);
        summary.add(&Outcome::Gone);
        summary.add(&Outcome::Failed {
            error: "boom".into(),
        });
        assert_eq!(summary.total_changes(), 1);
        assert_eq!(summary.total(), 3);
        assert!(!summary.is_success());
    }
}
