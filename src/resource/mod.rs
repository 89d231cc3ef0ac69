//! ACS resource types.
//!
//! Each submodule implements [`declarative::Resource`] for one kind of ACS
//! object: its schema, cross-field validation, request bodies, and the
//! sequence of waits behind create, read, update and delete.

mod hec_token;
mod index;
mod ip_allowlist;
mod role;
mod user;

pub use hec_token::HecTokenResource;
pub use index::IndexResource;
pub use ip_allowlist::AllowlistResource;
pub use role::RoleResource;
pub use user::UserResource;

use crate::context::AcsContext;
use declarative::{Diagnostic, Diagnostics, Provider, ResourceData};
use reconcile::{ErrorKind, Phase, WaitError};
use std::collections::BTreeSet;

/// Every resource type this provider manages.
pub fn provider() -> Provider<AcsContext> {
    Provider::new()
        .register(IndexResource)
        .register(HecTokenResource)
        .register(AllowlistResource::ipv4())
        .register(AllowlistResource::ipv6())
        .register(RoleResource)
        .register(UserResource)
}

/// Diagnostics for a wait that failed during `phase`.
pub(crate) fn wait_failed(kind: &str, name: &str, phase: Phase, err: &WaitError) -> Diagnostics {
    let diag = match err.kind(phase) {
        ErrorKind::AlreadyExists => Diagnostic::error(format!("{kind} ({name}) already exists"))
            .with_detail(ErrorKind::AlreadyExists.advice()),
        _ => Diagnostic::error(format!("Error {} {kind} ({name})", gerund(phase)))
            .with_detail(err.to_string()),
    };
    log::error!("{kind} ({name}) {phase} failed: {err}");
    diag.into()
}

/// Record that the remote object no longer exists.
pub(crate) fn mark_gone(kind: &str, data: &mut ResourceData, err: &WaitError) {
    log::warn!("{kind} ({}) not found, removing from state: {err}", data.id());
    data.set_id("");
}

fn gerund(phase: Phase) -> &'static str {
    match phase {
        Phase::Create => "creating",
        Phase::Read => "reading",
        Phase::Update => "updating",
        Phase::Delete => "deleting",
    }
}

/// The configured value of an attribute if it differs from prior state.
pub(crate) fn changed_str(data: &ResourceData, key: &str) -> Option<String> {
    data.has_change(key)
        .then(|| data.get_str(key).map(ToString::to_string))
        .flatten()
}

pub(crate) fn changed_i64(data: &ResourceData, key: &str) -> Option<i64> {
    data.has_change(key).then(|| data.get_i64(key)).flatten()
}

pub(crate) fn changed_bool(data: &ResourceData, key: &str) -> Option<bool> {
    data.has_change(key).then(|| data.get_bool(key)).flatten()
}

/// A changed string set. Unsetting a set sends it empty.
pub(crate) fn changed_set(data: &ResourceData, key: &str) -> Option<BTreeSet<String>> {
    data.has_change(key)
        .then(|| data.get_set(key).unwrap_or_default())
}
