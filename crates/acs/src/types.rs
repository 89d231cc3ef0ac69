//! Wire models for the ACS v2 API.
//!
//! Request bodies are sparse: every optional field is an `Option` that is
//! omitted from the JSON when `None`, so "unset" and "set to zero/false/empty"
//! stay distinguishable all the way to the wire. String collections with set
//! semantics are `BTreeSet`s and serialise as JSON arrays.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// Indexes
// =============================================================================

/// Body of `POST /indexes` and the representation returned by
/// `GET /indexes/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "maxDataSizeMB", skip_serializing_if = "Option::is_none")]
    pub max_data_size_mb: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searchable_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splunk_archival_retention_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_storage_bucket_path: Option<String>,
    /// Server-computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_event_count: Option<String>,
    /// Server-computed.
    #[serde(rename = "totalRawSizeMB", skip_serializing_if = "Option::is_none")]
    pub total_raw_size_mb: Option<String>,
}

/// Body of `PATCH /indexes/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexPatch {
    #[serde(rename = "maxDataSizeMB", skip_serializing_if = "Option::is_none")]
    pub max_data_size_mb: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searchable_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splunk_archival_retention_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_storage_bucket_path: Option<String>,
}

impl IndexPatch {
    /// Whether the patch carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================================
// HEC tokens
// =============================================================================

/// HEC token settings. Used as the body of `POST` (with `name`) and as the
/// `spec` object of the `GET` representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HecTokenSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_indexes: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_index: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_sourcetype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_ack: Option<bool>,
}

/// Body of `PATCH /inputs/http-event-collectors/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HecTokenPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_indexes: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_index: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_sourcetype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_ack: Option<bool>,
}

impl HecTokenPatch {
    /// Whether the patch carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// `GET` representation of a HEC token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HecToken {
    pub spec: HecTokenSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Envelope returned by `GET /inputs/http-event-collectors/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HecTokenEnvelope {
    #[serde(rename = "http-event-collector")]
    pub http_event_collector: HecToken,
}

// =============================================================================
// IP allowlists
// =============================================================================

/// IP family of an allowlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Path segment of the allowlist endpoint.
    #[must_use]
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::V4 => "ipallowlists",
            Self::V6 => "ipallowlists-v6",
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => write!(f, "IPv4"),
            Self::V6 => write!(f, "IPv6"),
        }
    }
}

/// Body of allowlist add/remove calls, and the `GET` representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnets {
    #[serde(default)]
    pub subnets: BTreeSet<String>,
}

impl Subnets {
    /// Build a body from any string collection.
    pub fn new<I, S>(subnets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subnets: subnets.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Roles
// =============================================================================

/// Role settings shared by create, patch and read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<BTreeSet<String>>,
    #[serde(
        rename = "cumulativeRTSrchJobsQuota",
        skip_serializing_if = "Option::is_none"
    )]
    pub cumulative_rt_srch_jobs_quota: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cumulative_srch_jobs_quota: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_app: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_roles: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rt_srch_jobs_quota: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srch_disk_quota: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srch_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srch_indexes_allowed: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srch_indexes_default: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srch_jobs_quota: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srch_time_earliest: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srch_time_win: Option<i64>,
}

impl RoleSpec {
    /// Whether the patch carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Body of `POST /roles` and the representation returned by
/// `GET /roles/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(flatten)]
    pub spec: RoleSpec,
}

// =============================================================================
// Users
// =============================================================================

/// Body of `POST /users`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_change_pass: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_app: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<BTreeSet<String>>,
}

/// Body of `PATCH /users/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_change_pass: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_app: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<BTreeSet<String>>,
}

impl UserPatch {
    /// Whether the patch carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Representation returned by `GET /users/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub default_app: Option<String>,
    #[serde(default)]
    pub default_app_source: Option<String>,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub roles: Option<BTreeSet<String>>,
    #[serde(default)]
    pub last_successful_login: Option<i64>,
    #[serde(default)]
    pub locked_out: Option<bool>,
}

// =============================================================================
// Tokens and errors
// =============================================================================

/// Body of `POST /tokens`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewToken {
    pub user: String,
    pub audience: String,
    #[serde(rename = "type")]
    pub token_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<String>,
}

/// Response of `POST /tokens`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

/// Error body returned by the ACS on failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
