//! # Declarative
//!
//! Host-runtime adapters for declaratively managed remote resources.
//!
//! This crate provides the pieces a provider plugs its resource types into:
//! declaring their schemas, handing each lifecycle operation a data bag, and
//! reporting outcomes as diagnostics instead of errors.
//!
//! ## Core Concepts
//!
//! - **Resource**: A remote object type with create/read/update/delete
//! - **ResourceData**: The attribute bag one lifecycle operation works on
//! - **Schema**: Attribute declarations (required, computed, force-new, ...)
//! - **Provider**: A registry of resource types sharing provider metadata
//! - **Plan / execute**: A batch of changes applied in parallel
//!
//! ## Progress Reporting
//!
//! [`ProgressCallback`] receives per-change outcomes, which keeps the crate
//! free of any particular terminal UI.

pub mod context;
pub mod data;
pub mod diagnostics;
pub mod executor;
pub mod planner;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod types;

// Re-export main types at crate root
pub use context::{NoProgress, ProgressCallback};
pub use data::{Attributes, ResourceData, State};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use executor::{ExecuteReport, execute};
pub use planner::Plan;
pub use provider::Provider;
pub use resource::{BoxedResource, Resource};
pub use schema::{AttrType, Attribute, Schema};
pub use types::{Action, Change, ChangeResult, ExecuteOptions, ExecuteSummary, Outcome};

/// Result type for registry lookups.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),
}
